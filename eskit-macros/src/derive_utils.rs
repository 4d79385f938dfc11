use syn::{Attribute, Path, Result, Token, punctuated::Punctuated};

/// 合并宏要求的 derive 与用户已写的 derive
///
/// 所有 `#[derive(...)]` 被合并为一个并置于属性最前；同名 trait
/// （如 `Serialize` 与 `serde::Serialize`、`Debug` 与 `std::fmt::Debug`）只保留一次，
/// 以宏要求的写法为准。
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<Path>) -> Result<()> {
    let mut retained = Vec::new();
    let mut existing = Vec::new();
    for attr in attrs.drain(..) {
        if attr.path().is_ident("derive") {
            let list = attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?;
            existing.extend(list);
        } else {
            retained.push(attr);
        }
    }

    let mut seen = std::collections::HashSet::<String>::new();
    let merged: Vec<Path> = required
        .into_iter()
        .chain(existing)
        .filter(|p| seen.insert(derive_key(p)))
        .collect();

    attrs.push(syn::parse_quote!(#[derive(#(#merged),*)]));
    attrs.extend(retained);
    Ok(())
}

// 以路径最后一段作为去重键
fn derive_key(p: &Path) -> String {
    p.segments
        .last()
        .map(|s| s.ident.to_string())
        .unwrap_or_default()
}

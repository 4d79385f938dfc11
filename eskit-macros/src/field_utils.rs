use syn::{Field, FieldsNamed, Token, punctuated::Punctuated};

fn field_is(field: &Field, name: &syn::Ident) -> bool {
    field.ident.as_ref().map(|i| i == name).unwrap_or(false)
}

/// 确保具名字段结构体包含所需字段，并按给定顺序置于最前
/// - 已存在的同名字段复用用户的定义（含属性）
/// - 其余字段保持原始顺序
pub(crate) fn ensure_required_fields(fields_named: &mut FieldsNamed, required: Vec<Field>) {
    let old_named = fields_named.named.clone();
    let mut new_named: Punctuated<Field, Token![,]> = Punctuated::new();

    for field in required.iter() {
        let Some(name) = field.ident.as_ref() else {
            continue;
        };
        match old_named.iter().find(|f| field_is(f, name)) {
            Some(existing) => new_named.push(existing.clone()),
            None => new_named.push(field.clone()),
        }
    }

    for f in old_named.into_iter() {
        let is_required = required
            .iter()
            .filter_map(|r| r.ident.as_ref())
            .any(|name| field_is(&f, name));
        if !is_required {
            new_named.push(f);
        }
    }

    fields_named.named = new_named;
}

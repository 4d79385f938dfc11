use crate::derive_utils::apply_derives;
use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, Ident, Item, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[domain_event] 宏实现
/// - 枚举：任意变体形态；事件类型默认 `Enum.Variant`，变体可用
///   `#[event(event_type = "...", event_version = N)]` 覆写
/// - 结构体：事件类型默认为结构体名，可用 `event_type = "..."` 指定
/// - 合并 derive：Debug, Clone, PartialEq, Serialize, Deserialize
/// - 生成 `::eskit_domain::domain_event::DomainEvent` 实现
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as EventAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    let required: Vec<syn::Path> = vec![
        syn::parse_quote!(Debug),
        syn::parse_quote!(Clone),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ];

    let version_lit = cfg
        .version
        .clone()
        .unwrap_or_else(|| syn::parse_quote! { 1 });

    let result = match &mut input {
        Item::Enum(enum_item) => {
            if let Some(lit) = &cfg.event_type {
                return syn::Error::new(
                    lit.span(),
                    "'event_type' on an enum is not supported; use #[event(event_type = ...)] on variants",
                )
                .to_compile_error()
                .into();
            }
            apply_derives(&mut enum_item.attrs, required)
                .and_then(|_| expand_enum(enum_item, &version_lit))
        }
        Item::Struct(struct_item) => apply_derives(&mut struct_item.attrs, required).map(|_| {
            let ident = &struct_item.ident;
            let type_lit = cfg
                .event_type
                .clone()
                .unwrap_or_else(|| syn::LitStr::new(&ident.to_string(), ident.span()));
            let (impl_generics, ty_generics, where_clause) = struct_item.generics.split_for_impl();
            quote! {
                impl #impl_generics ::eskit_domain::domain_event::DomainEvent for #ident #ty_generics #where_clause {
                    fn event_type(&self) -> &str { #type_lit }
                    fn event_version(&self) -> usize { #version_lit }
                }
            }
        }),
        other => Err(syn::Error::new(
            other.span(),
            "#[domain_event] can only be used on enum or struct types",
        )),
    };

    match result {
        Ok(event_impl) => TokenStream::from(quote! {
            #input

            #event_impl
        }),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_enum(
    enum_item: &mut syn::ItemEnum,
    version_lit: &syn::LitInt,
) -> Result<proc_macro2::TokenStream> {
    if enum_item.variants.is_empty() {
        return Err(syn::Error::new(
            enum_item.span(),
            "#[domain_event] requires at least one variant",
        ));
    }

    let mut variant_types: HashMap<String, syn::LitStr> = HashMap::new();
    let mut variant_versions: HashMap<String, syn::LitInt> = HashMap::new();

    for v in &mut enum_item.variants {
        let mut retained_attrs = Vec::new();
        for attr in v.attrs.drain(..) {
            if !attr.path().is_ident("event") {
                retained_attrs.push(attr);
                continue;
            }
            let vc = parse_variant_event_attr(&attr)?;
            let key = v.ident.to_string();
            let duplicate_type = vc
                .ty
                .is_some_and(|lit| variant_types.insert(key.clone(), lit).is_some());
            if duplicate_type {
                return Err(syn::Error::new(
                    attr.span(),
                    "duplicate 'event_type' specified for this variant",
                ));
            }
            let duplicate_version = vc
                .version
                .is_some_and(|lit| variant_versions.insert(key, lit).is_some());
            if duplicate_version {
                return Err(syn::Error::new(
                    attr.span(),
                    "duplicate 'event_version' specified for this variant",
                ));
            }
        }
        v.attrs = retained_attrs;
    }

    let enum_ident = &enum_item.ident;
    let enum_name_string = enum_ident.to_string();

    let type_match_arms = enum_item.variants.iter().map(|v| {
        let v_ident = &v.ident;
        let key = v_ident.to_string();
        if let Some(lit) = variant_types.get(&key) {
            quote! { Self::#v_ident { .. } => #lit }
        } else {
            let combined = format!("{}.{}", enum_name_string, key);
            let lit = syn::LitStr::new(&combined, v_ident.span());
            quote! { Self::#v_ident { .. } => #lit }
        }
    });

    let ver_match_arms = enum_item.variants.iter().map(|v| {
        let v_ident = &v.ident;
        match variant_versions.get(&v_ident.to_string()) {
            Some(lit) => quote! { Self::#v_ident { .. } => #lit },
            None => quote! { Self::#v_ident { .. } => #version_lit },
        }
    });

    let (impl_generics, ty_generics, where_clause) = enum_item.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::eskit_domain::domain_event::DomainEvent for #enum_ident #ty_generics #where_clause {
            fn event_type(&self) -> &str { match self { #( #type_match_arms, )* } }
            fn event_version(&self) -> usize { match self { #( #ver_match_arms, )* } }
        }
    })
}

// -------- parsing --------

struct VariantEventAttrConfig {
    ty: Option<syn::LitStr>,
    version: Option<syn::LitInt>,
}

fn parse_variant_event_attr(attr: &syn::Attribute) -> Result<VariantEventAttrConfig> {
    let pairs = attr.parse_args_with(Punctuated::<EventAttrKv, Token![,]>::parse_terminated)?;

    let mut ty: Option<syn::LitStr> = None;
    let mut version: Option<syn::LitInt> = None;
    for kv in pairs {
        match kv.key.to_string().as_str() {
            "event_type" => {
                if ty.replace(kv.str_lit()?).is_some() {
                    return Err(kv.duplicate());
                }
            }
            "event_version" => {
                if version.replace(kv.int_lit()?).is_some() {
                    return Err(kv.duplicate());
                }
            }
            _ => {
                return Err(syn::Error::new(
                    kv.key.span(),
                    "unknown key; expected 'event_type' | 'event_version'",
                ));
            }
        }
    }

    Ok(VariantEventAttrConfig { ty, version })
}

struct EventAttrKv {
    key: Ident,
    value: Expr,
}

impl EventAttrKv {
    fn str_lit(&self) -> Result<syn::LitStr> {
        match &self.value {
            Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            }) => Ok(lit.clone()),
            other => Err(syn::Error::new(
                other.span(),
                format!("expected string literal for '{}'", self.key),
            )),
        }
    }

    fn int_lit(&self) -> Result<syn::LitInt> {
        match &self.value {
            Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Int(lit),
                ..
            }) => Ok(lit.clone()),
            other => Err(syn::Error::new(
                other.span(),
                format!("expected integer literal for '{}'", self.key),
            )),
        }
    }

    fn duplicate(&self) -> syn::Error {
        syn::Error::new(
            self.key.span(),
            format!("duplicate key '{}' in attribute", self.key),
        )
    }
}

impl Parse for EventAttrKv {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        let value: Expr = input.parse()?;
        Ok(Self { key, value })
    }
}

// 顶层配置：默认版本号；结构体事件的类型名
struct EventAttrConfig {
    event_type: Option<syn::LitStr>,
    version: Option<syn::LitInt>,
}

impl Parse for EventAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let pairs = Punctuated::<EventAttrKv, Token![,]>::parse_terminated(input)?;

        let mut event_type: Option<syn::LitStr> = None;
        let mut version: Option<syn::LitInt> = None;
        for kv in pairs {
            match kv.key.to_string().as_str() {
                "version" => {
                    if version.replace(kv.int_lit()?).is_some() {
                        return Err(kv.duplicate());
                    }
                }
                "event_type" => {
                    if event_type.replace(kv.str_lit()?).is_some() {
                        return Err(kv.duplicate());
                    }
                }
                _ => {
                    return Err(syn::Error::new(
                        kv.key.span(),
                        "unknown key; expected 'version' | 'event_type'",
                    ));
                }
            }
        }

        Ok(Self {
            event_type,
            version,
        })
    }
}

use crate::derive_utils::apply_derives;
use crate::field_utils::ensure_required_fields;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Item, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Entity,
    Aggregate,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::Entity => "#[entity]",
            Kind::Aggregate => "#[aggregate]",
        }
    }
}

/// #[entity] / #[aggregate] 宏实现
/// - 追加 `id`/`version`/`class_id`（聚合另有 `changes`）字段并置于最前
/// - 合并 derive：Default、Clone、Debug、Serialize、Deserialize
/// - 生成持久化所需的能力实现
pub(crate) fn expand(kind: Kind, attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as EntityAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), format!("{} only on struct", kind.name()))
                .to_compile_error()
                .into();
        }
    };

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.span(), "only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let with_class_id = cfg.class_id.unwrap_or(true);

    let mut required: Vec<syn::Field> = vec![
        syn::parse_quote! { id: ::eskit_domain::Uuid },
        syn::parse_quote! { version: usize },
    ];
    if with_class_id {
        required.push(syn::parse_quote! {
            #[serde(default, deserialize_with = "::eskit_domain::class_id::deserialize_optional")]
            class_id: ::core::option::Option<::eskit_domain::class_id::ClassId>
        });
    }
    if kind == Kind::Aggregate {
        required.push(syn::parse_quote! {
            #[serde(skip)]
            changes: ::eskit_domain::aggregate_root::AggregateChanges
        });
    }
    ensure_required_fields(fields_named, required);

    let mut derives: Vec<syn::Path> = vec![
        syn::parse_quote!(Default),
        syn::parse_quote!(Clone),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ];
    if cfg.derive_debug.unwrap_or(true) {
        derives.insert(0, syn::parse_quote!(Debug));
    }
    if let Err(err) = apply_derives(&mut st.attrs, derives) {
        return err.to_compile_error().into();
    }

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();
    let table = cfg
        .table
        .unwrap_or_else(|| syn::LitStr::new(&ident.to_string(), ident.span()));

    let class_id_impl = with_class_id.then(|| {
        quote! {
            impl #impl_generics ::eskit_domain::class_id::ClassIdEntity for #ident #ty_generics #where_clause {
                fn class_id(&self) -> ::core::option::Option<::eskit_domain::class_id::ClassId> {
                    self.class_id
                }

                fn set_class_id(&mut self, class_id: ::eskit_domain::class_id::ClassId) {
                    self.class_id = ::core::option::Option::Some(class_id);
                }
            }
        }
    });

    let class_id_views = with_class_id.then(|| {
        quote! {
            fn as_class_id_entity(&self) -> ::core::option::Option<&dyn ::eskit_domain::class_id::ClassIdEntity> {
                ::core::option::Option::Some(self)
            }

            fn as_class_id_entity_mut(&mut self) -> ::core::option::Option<&mut dyn ::eskit_domain::class_id::ClassIdEntity> {
                ::core::option::Option::Some(self)
            }
        }
    });

    let (aggregate_root_impl, aggregate_root_views) = if kind == Kind::Aggregate {
        (
            Some(quote! {
                impl #impl_generics ::eskit_domain::aggregate_root::AggregateRoot for #ident #ty_generics #where_clause {
                    fn changes(&self) -> &::eskit_domain::aggregate_root::AggregateChanges {
                        &self.changes
                    }

                    fn changes_mut(&mut self) -> &mut ::eskit_domain::aggregate_root::AggregateChanges {
                        &mut self.changes
                    }

                    fn set_version(&mut self, version: usize) {
                        self.version = version;
                    }
                }
            }),
            Some(quote! {
                fn as_aggregate_root(&self) -> ::core::option::Option<&dyn ::eskit_domain::aggregate_root::AggregateRoot> {
                    ::core::option::Option::Some(self)
                }

                fn as_aggregate_root_mut(&mut self) -> ::core::option::Option<&mut dyn ::eskit_domain::aggregate_root::AggregateRoot> {
                    ::core::option::Option::Some(self)
                }
            }),
        )
    } else {
        (None, None)
    };

    let expanded = quote! {
        #st

        impl #impl_generics ::eskit_domain::entity::Entity for #ident #ty_generics #where_clause {
            fn new(id: ::eskit_domain::Uuid, version: usize) -> Self {
                Self { id, version, ..::core::default::Default::default() }
            }

            fn id(&self) -> ::eskit_domain::Uuid { self.id }

            fn version(&self) -> usize { self.version }
        }

        #class_id_impl

        #aggregate_root_impl

        impl #impl_generics ::eskit_domain::persist::PersistentEntity for #ident #ty_generics #where_clause {
            const TABLE: &'static str = #table;

            #class_id_views

            #aggregate_root_views
        }
    };

    TokenStream::from(expanded)
}

// -------- parsing --------

struct EntityAttrConfig {
    table: Option<syn::LitStr>,
    class_id: Option<bool>,
    derive_debug: Option<bool>,
}

impl Parse for EntityAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = Self {
            table: None,
            class_id: None,
            derive_debug: None,
        };

        let elems: Punctuated<EntityAttrElem, Token![,]> =
            Punctuated::<EntityAttrElem, Token![,]>::parse_terminated(input)?;

        for elem in elems.into_iter() {
            match elem {
                EntityAttrElem::Table(key, lit) => {
                    if cfg.table.replace(lit).is_some() {
                        return Err(duplicate(&key));
                    }
                }
                EntityAttrElem::ClassId(key, b) => {
                    if cfg.class_id.replace(b).is_some() {
                        return Err(duplicate(&key));
                    }
                }
                EntityAttrElem::Debug(key, b) => {
                    if cfg.derive_debug.replace(b).is_some() {
                        return Err(duplicate(&key));
                    }
                }
            }
        }

        Ok(cfg)
    }
}

fn duplicate(key: &syn::Ident) -> syn::Error {
    syn::Error::new(key.span(), format!("duplicate key '{key}' in attribute"))
}

enum EntityAttrElem {
    Table(syn::Ident, syn::LitStr),
    ClassId(syn::Ident, bool),
    Debug(syn::Ident, bool),
}

impl Parse for EntityAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        if key == "table" {
            let lit: syn::LitStr = input.parse()?;
            Ok(EntityAttrElem::Table(key, lit))
        } else if key == "class_id" {
            let lit: syn::LitBool = input.parse()?;
            Ok(EntityAttrElem::ClassId(key, lit.value()))
        } else if key == "debug" {
            let lit: syn::LitBool = input.parse()?;
            Ok(EntityAttrElem::Debug(key, lit.value()))
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'table', 'class_id' or 'debug'",
            ))
        }
    }
}

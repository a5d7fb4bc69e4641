//! Derive macro exposing domain-model metadata to `oxide-query-core`.
//!
//! `#[derive(Domain)]` implements `oxide_query_core::domain::Domain` so that
//! alias sessions can navigate the type.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta};

/// Derives `Domain` for a struct with named fields or a fieldless enum.
///
/// # Attributes
///
/// - `#[domain(name = "Name")]` - The entity or enum name used in root paths
///   and error messages (optional, defaults to the type name)
///
/// # Field and Variant Attributes
///
/// - `#[domain(rename = "name")]` - The property or member name (optional,
///   defaults to the field or variant name)
/// - `#[domain(skip)]` - Leaves a field out of the metadata. Skipped fields
///   cannot be navigated.
///
/// Structs produce an entity descriptor whose properties appear in field
/// order. Enums produce an enum descriptor whose members appear in variant
/// order.
#[proc_macro_derive(Domain, attributes(domain))]
pub fn derive_domain(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_domain_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_domain_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Domain derive does not support generic types",
        ));
    }

    let type_name = &input.ident;
    let container = parse_domain_attrs(&input.attrs, false)?;
    let name = container.name.unwrap_or_else(|| type_name.to_string());

    let descriptor = match &input.data {
        Data::Struct(data) => {
            let Fields::Named(fields) = &data.fields else {
                return Err(syn::Error::new_spanned(
                    input,
                    "Domain derive only supports structs with named fields",
                ));
            };
            let mut properties = Vec::new();
            for field in &fields.named {
                let attrs = parse_domain_attrs(&field.attrs, true)?;
                if attrs.skip {
                    continue;
                }
                let Some(ident) = &field.ident else {
                    continue;
                };
                let property = attrs.rename.unwrap_or_else(|| unraw(ident));
                let ty = &field.ty;
                properties.push(quote! {
                    ::oxide_query_core::domain::PropertyDescriptor {
                        name: #property,
                        ty: <#ty as ::oxide_query_core::domain::Domain>::type_info,
                    }
                });
            }
            quote! {
                static DESCRIPTOR: ::oxide_query_core::domain::EntityDescriptor =
                    ::oxide_query_core::domain::EntityDescriptor {
                        name: #name,
                        properties: &[#(#properties),*],
                    };
                ::oxide_query_core::domain::TypeInfo::Entity(&DESCRIPTOR)
            }
        }
        Data::Enum(data) => {
            let mut members = Vec::new();
            for variant in &data.variants {
                if !matches!(variant.fields, Fields::Unit) {
                    return Err(syn::Error::new_spanned(
                        variant,
                        "Domain derive only supports enums without fields",
                    ));
                }
                let attrs = parse_domain_attrs(&variant.attrs, true)?;
                if attrs.skip {
                    continue;
                }
                members.push(attrs.rename.unwrap_or_else(|| unraw(&variant.ident)));
            }
            quote! {
                static DESCRIPTOR: ::oxide_query_core::domain::EnumDescriptor =
                    ::oxide_query_core::domain::EnumDescriptor {
                        name: #name,
                        members: &[#(#members),*],
                    };
                ::oxide_query_core::domain::TypeInfo::Enum(&DESCRIPTOR)
            }
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Domain derive only supports structs and enums",
            ));
        }
    };

    Ok(quote! {
        impl ::oxide_query_core::domain::Domain for #type_name {
            fn type_info() -> ::oxide_query_core::domain::TypeInfo {
                #descriptor
            }
        }
    })
}

#[derive(Default)]
struct DomainAttrs {
    name: Option<String>,
    rename: Option<String>,
    skip: bool,
}

/// Parses `#[domain(...)]` attributes. `name` is accepted on containers,
/// `rename` and `skip` on fields and variants.
fn parse_domain_attrs(attrs: &[Attribute], member: bool) -> syn::Result<DomainAttrs> {
    let mut result = DomainAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("domain") {
            continue;
        }
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if !member && meta.path.is_ident("name") {
                result.name = Some(string_value(&meta.value()?.parse()?, &meta.path)?);
            } else if member && meta.path.is_ident("rename") {
                result.rename = Some(string_value(&meta.value()?.parse()?, &meta.path)?);
            } else if member && meta.path.is_ident("skip") {
                result.skip = true;
            } else {
                return Err(meta.error("unsupported domain attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

fn string_value(value: &Expr, path: &syn::Path) -> syn::Result<String> {
    if let Expr::Lit(lit) = value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(path, "expected a string literal"))
}

fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map_or(name.clone(), str::to_string)
}

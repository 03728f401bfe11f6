//! Implementation of the `#[derive(Signals)]` macro.
//!
//! This macro generates an implementation of the `SignalSet` trait and
//! signal name constants for typed contract access.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result, Type};

use super::attrs::{parse_container_attrs, parse_signal_attrs};

/// Information about one toggle field.
struct FieldInfo {
    /// The contract key read by this field (may be renamed).
    key: String,
    /// The actual field identifier.
    field_ident: syn::Ident,
    /// Name of the generated key constant.
    const_ident: syn::Ident,
}

/// Main implementation of the Signals derive macro.
pub fn signals_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Signals can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Signals can only be derived for structs",
            ))
        }
    };

    let container = parse_container_attrs(&input.attrs)?;

    let mut field_infos: Vec<FieldInfo> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_signal_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        if !is_bool(&field.ty) {
            return Err(Error::new(
                field.ty.span(),
                "signal fields must be `bool`; mark other fields with #[signal(skip)]",
            ));
        }

        let key = attrs
            .rename
            .unwrap_or_else(|| to_lower_camel_case(&field_name.to_string()));

        if field_infos.iter().any(|info| info.key == key) {
            return Err(Error::new(
                field.span(),
                format!("duplicate signal name `{}`", key),
            ));
        }

        let const_ident = syn::parse_str::<syn::Ident>(&to_screaming_snake_case(&key))
            .map_err(|_| {
                Error::new(
                    field.span(),
                    format!(
                        "signal name `{}` does not form a valid constant name; \
                         rename it to start with a letter",
                        key
                    ),
                )
            })?;

        field_infos.push(FieldInfo {
            key,
            field_ident: field_name.clone(),
            const_ident,
        });
    }

    let constants: Vec<TokenStream> = field_infos
        .iter()
        .map(|info| {
            let const_name = &info.const_ident;
            let key = &info.key;
            quote! {
                /// Contract key of this signal.
                pub const #const_name: &'static str = #key;
            }
        })
        .collect();

    let set_arms: Vec<TokenStream> = field_infos
        .iter()
        .map(|info| {
            let key = &info.key;
            let field_ident = &info.field_ident;
            quote! {
                #key => {
                    self.#field_ident = on;
                    true
                }
            }
        })
        .collect();

    let names: Vec<&str> = field_infos.iter().map(|info| info.key.as_str()).collect();
    let data: Vec<&str> = container.data.iter().map(String::as_str).collect();

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#constants)*
        }

        impl #impl_generics ::signal_layers::SignalSet for #struct_name #ty_generics #where_clause {
            const NAMES: &'static [&'static str] = &[#(#names),*];
            const DATA: &'static [&'static str] = &[#(#data),*];

            fn set_signal(&mut self, name: &str, on: bool) -> bool {
                match name {
                    #(#set_arms)*
                    _ => false,
                }
            }
        }
    };

    Ok(expanded)
}

fn is_bool(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path.qself.is_none() && path.path.is_ident("bool"),
        _ => false,
    }
}

/// Convert a snake_case identifier to lowerCamelCase.
fn to_lower_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = false;

    for c in s.trim_start_matches("r#").chars() {
        if c == '_' {
            upper_next = !result.is_empty();
        } else if upper_next {
            result.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert a signal key to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        } else {
            result.push('_');
            prev_was_lower = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_camel_case() {
        assert_eq!(to_lower_camel_case("primary"), "primary");
        assert_eq!(to_lower_camel_case("hover_glow"), "hoverGlow");
        assert_eq!(to_lower_camel_case("label_hidden"), "labelHidden");
        assert_eq!(to_lower_camel_case("r#type"), "type");
        assert_eq!(to_lower_camel_case("_private"), "private");
    }

    #[test]
    fn test_screaming_snake_case() {
        assert_eq!(to_screaming_snake_case("lg"), "LG");
        assert_eq!(to_screaming_snake_case("hoverGlow"), "HOVER_GLOW");
        assert_eq!(to_screaming_snake_case("aria-busy"), "ARIA_BUSY");
        assert_eq!(to_screaming_snake_case("activeNone"), "ACTIVE_NONE");
    }

    #[test]
    fn test_rejects_non_bool_field() {
        let input: DeriveInput = syn::parse_quote! {
            struct Bad {
                label: String,
            }
        };
        assert!(signals_derive_impl(input).is_err());
    }

    #[test]
    fn test_rejects_enum() {
        let input: DeriveInput = syn::parse_quote! {
            enum Bad { A }
        };
        assert!(signals_derive_impl(input).is_err());
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let input: DeriveInput = syn::parse_quote! {
            struct Dup {
                hover_glow: bool,
                #[signal(rename = "hoverGlow")]
                glow: bool,
            }
        };
        let err = signals_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("hoverGlow"));
    }

    #[test]
    fn test_rejects_key_without_constant_name() {
        let input: DeriveInput = syn::parse_quote! {
            struct Sizes {
                #[signal(rename = "2xl")]
                xxl: bool,
            }
        };
        let err = signals_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("2xl"));

        let input: DeriveInput = syn::parse_quote! {
            struct Blank {
                #[signal(rename = "")]
                blank: bool,
            }
        };
        assert!(signals_derive_impl(input).is_err());
    }

    #[test]
    fn test_expands_names() {
        let input: DeriveInput = syn::parse_quote! {
            #[signals(data = "children")]
            struct Ok {
                primary: bool,
                #[signal(skip)]
                extra: u8,
            }
        };
        let out = signals_derive_impl(input).unwrap().to_string();
        assert!(out.contains("\"primary\""));
        assert!(out.contains("\"children\""));
        assert!(out.contains("PRIMARY"));
        assert!(!out.contains("\"extra\""));
    }
}

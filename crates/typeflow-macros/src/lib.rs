//! Macros for typeflow records.

use proc_macro::TokenStream;
use syn::parse::Parser;
use syn::{parse_macro_input, Attribute, DeriveInput, Expr, Lit, Meta};

mod record;

/// Derives `Typed`, `IntoValue` and `FromValue` for a struct with named
/// fields, mapping it to a record value.
///
/// The record name defaults to the struct name and can be overridden with
/// `#[record(name = "...")]`. Fields accept `#[record(rename = "...")]` and
/// `#[record(skip)]`; skipped fields are filled with `Default::default()`.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand_derive(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn get_attribute<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident(name))
}

fn nested_metas(attr: &Attribute) -> Vec<Meta> {
    if let Meta::List(meta_list) = &attr.meta {
        let parser = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated;
        if let Ok(nested) = parser.parse2(meta_list.tokens.clone()) {
            return nested.into_iter().collect();
        }
    }
    Vec::new()
}

fn parse_attribute_flag(attr: &Attribute, key: &str) -> bool {
    nested_metas(attr)
        .iter()
        .any(|meta| matches!(meta, Meta::Path(path) if path.is_ident(key)))
}

fn parse_attribute_string(attr: &Attribute, key: &str) -> Option<String> {
    for meta in nested_metas(attr) {
        if let Meta::NameValue(nv) = meta {
            if nv.path.is_ident(key) {
                if let Expr::Lit(expr_lit) = &nv.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value());
                    }
                }
            }
        }
    }
    None
}

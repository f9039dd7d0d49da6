// #[derive(Record)] implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields};

use crate::{get_attribute, parse_attribute_flag, parse_attribute_string};

pub fn expand_derive(input: DeriveInput) -> Result<TokenStream, Error> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new_spanned(
                    &input,
                    "#[derive(Record)] requires named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new_spanned(
                &input,
                "#[derive(Record)] only works on structs",
            ))
        }
    };

    let record_name = get_attribute(&input.attrs, "record")
        .and_then(|attr| parse_attribute_string(attr, "name"))
        .unwrap_or_else(|| name.to_string());

    let mut builder_calls = Vec::new();
    let mut field_inits = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return Err(Error::new_spanned(field, "expected a named field"));
        };
        let attr = get_attribute(&field.attrs, "record");

        if attr.is_some_and(|attr| parse_attribute_flag(attr, "skip")) {
            field_inits.push(quote! {
                #ident: ::core::default::Default::default()
            });
            continue;
        }

        let key = attr
            .and_then(|attr| parse_attribute_string(attr, "rename"))
            .unwrap_or_else(|| ident.to_string());
        let ty = &field.ty;

        builder_calls.push(quote! {
            .field(#key, self.#ident)
        });
        field_inits.push(quote! {
            #ident: <#ty as ::typeflow::__internal::FromValue>::from_value(record.require(#key)?)?
        });
    }

    let expanded = quote! {
        impl #impl_generics ::typeflow::__internal::Typed for #name #ty_generics #where_clause {
            fn value_type() -> ::typeflow::__internal::ValueType {
                ::typeflow::__internal::ValueType::record(#record_name)
            }
        }

        impl #impl_generics ::typeflow::__internal::IntoValue for #name #ty_generics #where_clause {
            fn into_value(self) -> ::typeflow::__internal::Value {
                ::typeflow::__internal::Value::Record(
                    ::typeflow::__internal::Record::builder(#record_name)
                        #(#builder_calls)*
                        .build()
                )
            }
        }

        impl #impl_generics ::typeflow::__internal::FromValue for #name #ty_generics #where_clause {
            fn from_value(
                value: ::typeflow::__internal::Value,
            ) -> ::typeflow::__internal::Result<Self> {
                match value {
                    ::typeflow::__internal::Value::Record(record) if record.name() == #record_name => {
                        Ok(Self {
                            #(#field_inits,)*
                        })
                    }
                    other => Err(::typeflow::__internal::StreamError::Conversion {
                        expected: <Self as ::typeflow::__internal::Typed>::value_type(),
                        found: other.value_type(),
                    }),
                }
            }
        }
    };

    Ok(expanded)
}

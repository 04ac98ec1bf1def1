use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::{quote, quote_spanned};

use crate::parse::{ParsedStruct, parse_struct};

/// Entry point for `#[derive(JsonApi)]`.
///
/// Emits `Shaped`, `Reflect`, `Payload` and `Target` implementations, or a
/// `compile_error!` if the input is not a non-generic struct with named
/// fields.
pub fn derive_jsonapi(input: TokenStream2) -> TokenStream2 {
    match parse_struct(input) {
        Ok(parsed) => emit(&parsed),
        Err(e) => {
            let message = e.message;
            quote_spanned! { e.span =>
                compile_error!(#message);
            }
        }
    }
}

fn emit(parsed: &ParsedStruct) -> TokenStream2 {
    let name = &parsed.name;
    let type_name = name.to_string();

    let field_shapes = parsed.fields.iter().map(|field| {
        let field_name = field.name();
        let embedded = field.embedded;
        let tags = field.tags.iter().map(|(key, value)| {
            quote! { ::jsonapi::Tag { key: #key, value: #value } }
        });
        quote! {
            ::jsonapi::FieldShape {
                name: #field_name,
                tags: &[#(#tags),*],
                embedded: #embedded,
            }
        }
    });

    let indices: Vec<_> = (0..parsed.fields.len())
        .map(Literal::usize_unsuffixed)
        .collect();
    let idents: Vec<_> = parsed.fields.iter().map(|f| &f.ident).collect();

    quote! {
        #[automatically_derived]
        impl ::jsonapi::Shaped for #name {
            fn shape(&self) -> &'static ::jsonapi::StructShape {
                static SHAPE: ::jsonapi::StructShape = ::jsonapi::StructShape {
                    type_name: #type_name,
                    fields: &[#(#field_shapes),*],
                };
                &SHAPE
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn ::jsonapi::Reflect> {
                match index {
                    #(#indices => ::core::option::Option::Some(&self.#idents as &dyn ::jsonapi::Reflect),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn ::jsonapi::Reflect> {
                match index {
                    #(#indices => ::core::option::Option::Some(&mut self.#idents as &mut dyn ::jsonapi::Reflect),)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        #[automatically_derived]
        impl ::jsonapi::Reflect for #name {
            fn peek(&self) -> ::jsonapi::Peek<'_> {
                ::jsonapi::Peek::Struct(self)
            }

            fn poke(&mut self) -> ::jsonapi::Poke<'_> {
                ::jsonapi::Poke::Struct(self)
            }
        }

        #[automatically_derived]
        impl ::jsonapi::Payload for #name {
            fn root(&self) -> ::jsonapi::Root<'_> {
                ::jsonapi::Root::One(self)
            }
        }

        #[automatically_derived]
        impl ::jsonapi::Target for #name {
            fn root_mut(&mut self) -> ::jsonapi::RootMut<'_> {
                ::jsonapi::RootMut::One(self)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_the_member_table() {
        let out = derive_jsonapi(quote! {
            struct Book {
                #[jsonapi("primary,books")]
                id: String,
                #[jsonapi("attribute,title")]
                title: String,
                cached: bool,
            }
        })
        .to_string();

        assert!(out.contains("Shaped for Book"));
        assert!(out.contains("Target for Book"));
        assert!(out.contains("\"primary,books\""));
        assert!(out.contains("\"attribute,title\""));
        assert!(out.contains("self . title"));
        assert!(!out.contains("cached"));
    }

    #[test]
    fn errors_become_compile_errors() {
        let out = derive_jsonapi(quote! { struct Pair(u8, u8); }).to_string();
        assert!(out.contains("compile_error"));
        assert!(out.contains("named fields"));
    }
}

//! The `#[jsonapi_testhelpers::test]` attribute.

use unsynn::*;

unsynn! {
    /// A test function: everything up to the body, then the body.
    struct TestFn {
        signature: Vec<Cons<Except<BraceGroup>, TokenTree>>,
        body: BraceGroup,
    }
}

impl TestFn {
    fn is_async(&self) -> bool {
        self.signature
            .iter()
            .any(|token| matches!(&token.second, TokenTree::Ident(ident) if ident == "async"))
    }
}

/// Runs `jsonapi_testhelpers::setup()` before the test body.
///
/// ```ignore
/// #[jsonapi_testhelpers::test]
/// fn marshals_books() {
///     // a tracing subscriber is installed here
/// }
/// ```
#[proc_macro_attribute]
pub fn test(
    _attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let mut iter = item.to_token_iter();
    let test_fn = match iter.parse::<TestFn>() {
        Ok(test_fn) => test_fn,
        Err(e) => {
            let message = format!("expected a test function: {e}");
            return quote::quote! { compile_error!(#message); }.into();
        }
    };
    if test_fn.is_async() {
        return quote::quote! {
            compile_error!("#[jsonapi_testhelpers::test] does not support async functions");
        }
        .into();
    }

    let signature = test_fn.signature.iter().map(|token| &token.second);
    let body = test_fn.body.0.stream();
    quote::quote! {
        #[::core::prelude::rust_2024::test]
        #(#signature)* {
            ::jsonapi_testhelpers::setup();

            #body
        }
    }
    .into()
}

//! `#[derive(JsonApi)]`, re-exported by the `jsonapi` crate.

/// Derives the JSON:API member table of a struct.
///
/// Annotate fields with `#[jsonapi("<kind>,<name>")]`, where kind is one of
/// `primary`, `attribute`, `meta`, `links` or `relationship`. Tags meant for
/// another configured key are written `#[jsonapi(key = "<kind>,<name>")]`,
/// and `#[jsonapi(embed)]` flattens a nested record into its parent.
#[proc_macro_derive(JsonApi, attributes(jsonapi))]
pub fn jsonapi_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    jsonapi_macros_impl::derive_jsonapi(input.into()).into()
}

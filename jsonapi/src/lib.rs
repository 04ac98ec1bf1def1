#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate self as jsonapi;

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Debug-level logging macro that forwards to `tracing::debug!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Debug-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use debug;
#[allow(unused_imports)]
pub(crate) use trace;

mod config;
mod document;
mod error;
mod error_object;
mod information;
mod links;
mod marshal;
mod member;
mod number;
mod reflect;
mod registry;
mod relationship;
mod resource;
mod shape;
mod unmarshal;
pub mod walk;

#[cfg(feature = "http")]
mod respond;

use config::current;

pub use config::{
    Config, DEFAULT_TAG_KEY, config, register_marshaler, register_unmarshaler, replace_config,
    set_json_indent, set_json_prefix, set_tag_key,
};
pub use document::{CompoundDocument, Document, MarshalParams};
pub use error::{CodecError, ErrorKind, JsonApiError};
pub use error_object::ErrorObject;
pub use information::Information;
pub use links::{Link, Links};
pub use marshal::{Payload, Root};
pub use member::{Member, MemberKind};
pub use reflect::{ListSlot, OptionSlot, Peek, Poke, Reflect, Scalar, ScalarMut};
pub use registry::Registry;
pub use relationship::{Relationship, RelationshipData, RelationshipLinks, ResourceIdentifier};
pub use resource::Resource;
pub use shape::{FieldShape, Shaped, StructShape, Tag};
pub use unmarshal::{RootMut, Target};

#[cfg(feature = "http")]
pub use respond::{respond, respond_errors, respond_failure};

pub use jsonapi_macros::JsonApi;

/// JSON:API media type.
pub const CONTENT_TYPE: &str = "application/vnd.api+json";

/// A `meta` object.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// A resource's `attributes` object.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Marshal a record, or a list of records, with the process-wide [`Config`].
///
/// ```
/// use jsonapi::JsonApi;
///
/// #[derive(JsonApi, Default)]
/// struct Book {
///     #[jsonapi("primary,books")]
///     id: String,
///     #[jsonapi("attribute,title")]
///     title: String,
/// }
///
/// let book = Book { id: "0-394-50294-9".into(), title: "Cosmos".into() };
/// let json = jsonapi::Config::new().with_indent(None).marshal(&book).unwrap();
/// assert_eq!(
///     String::from_utf8(json).unwrap(),
///     r#"{"data":{"id":"0-394-50294-9","type":"books","attributes":{"title":"Cosmos"}},"jsonapi":{"version":"1.0"}}"#
/// );
/// ```
pub fn marshal<P: Payload + ?Sized>(payload: &P) -> Result<Vec<u8>, JsonApiError> {
    current().marshal(payload)
}

/// Like [`marshal`], with top-level links and meta.
pub fn marshal_with_params<P: Payload + ?Sized>(
    payload: &P,
    params: &MarshalParams,
) -> Result<Vec<u8>, JsonApiError> {
    current().marshal_with_params(payload, params)
}

/// Marshal an errors-only document.
pub fn marshal_errors(
    params: &MarshalParams,
    errors: &[ErrorObject],
) -> Result<Vec<u8>, JsonApiError> {
    current().marshal_errors(params, errors)
}

/// Unmarshal a document into an existing value.
///
/// Fields without a counterpart in the document keep their current value.
pub fn unmarshal<T: Target + ?Sized>(input: &[u8], target: &mut T) -> Result<(), JsonApiError> {
    current().unmarshal(input, target)
}

/// Unmarshal a document into a fresh `T::default()`.
pub fn from_slice<T: Target + Default>(input: &[u8]) -> Result<T, JsonApiError> {
    let mut target = T::default();
    unmarshal(input, &mut target)?;
    Ok(target)
}

/// Unmarshal a document from a string.
pub fn from_str<T: Target + Default>(input: &str) -> Result<T, JsonApiError> {
    from_slice(input.as_bytes())
}

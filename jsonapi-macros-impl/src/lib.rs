#![warn(missing_docs)]
//! Implementation of `#[derive(JsonApi)]`.
//!
//! Parsing uses `unsynn`; the output is built with `quote`. The derive emits
//! a static member table plus index-based field accessors, so the mapping
//! engines never need runtime type introspection.

mod derive;
mod parse;

pub use derive::derive_jsonapi;

//! Output format, tag key and codec registry.
//!
//! A process-wide [`Config`] backs the free functions ([`crate::marshal`],
//! [`crate::unmarshal`], ...). It sits behind a reader-writer lock. Each
//! call clones it under a short read guard and runs on the copy, so codecs
//! may call the setters or the free functions themselves. The setters take
//! the write guard. Code that needs isolated settings can build its own
//! `Config` and call its methods instead.

use core::any::Any;
use std::sync::LazyLock;

use parking_lot::{RwLock, RwLockReadGuard};
use serde_json::Value;

use crate::{
    CodecError, ErrorObject, JsonApiError, MarshalParams, Payload, Registry, Target, marshal,
    unmarshal,
};

/// Default annotation key.
pub const DEFAULT_TAG_KEY: &str = "jsonapi";

/// Formatting and codec settings for marshal and unmarshal.
#[derive(Debug, Clone)]
pub struct Config {
    /// Written at the start of every output line but the first
    pub json_prefix: String,
    /// One indentation level; `None` writes compact JSON
    pub json_indent: Option<String>,
    /// Annotation key that field tags are read from
    pub tag_key: String,
    pub registry: Registry,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            json_prefix: String::new(),
            json_indent: Some("\t".to_string()),
            tag_key: DEFAULT_TAG_KEY.to_string(),
            registry: Registry::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.json_prefix = prefix.into();
        self
    }

    pub fn with_indent(mut self, indent: Option<&str>) -> Self {
        self.json_indent = indent.map(str::to_string);
        self
    }

    pub fn with_tag_key(mut self, tag_key: impl Into<String>) -> Self {
        self.tag_key = tag_key.into();
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// See [`Registry::register_marshaler`].
    pub fn register_marshaler<T, F>(&mut self, codec: F)
    where
        T: Any,
        F: Fn(&T) -> Result<Value, CodecError> + Send + Sync + 'static,
    {
        self.registry.register_marshaler(codec);
    }

    /// See [`Registry::register_unmarshaler`].
    pub fn register_unmarshaler<T, F>(&mut self, codec: F)
    where
        T: Any,
        F: Fn(&Value) -> Result<T, CodecError> + Send + Sync + 'static,
    {
        self.registry.register_unmarshaler(codec);
    }

    /// Marshal `payload` into a JSON:API document.
    pub fn marshal<P: Payload + ?Sized>(&self, payload: &P) -> Result<Vec<u8>, JsonApiError> {
        self.marshal_with_params(payload, &MarshalParams::default())
    }

    /// Marshal `payload` with top-level links and meta.
    pub fn marshal_with_params<P: Payload + ?Sized>(
        &self,
        payload: &P,
        params: &MarshalParams,
    ) -> Result<Vec<u8>, JsonApiError> {
        marshal::marshal_root(self, payload.root(), params)
    }

    /// Marshal an errors-only document.
    pub fn marshal_errors(
        &self,
        params: &MarshalParams,
        errors: &[ErrorObject],
    ) -> Result<Vec<u8>, JsonApiError> {
        marshal::marshal_errors(self, params, errors)
    }

    /// Unmarshal a document into `target`, field by field.
    pub fn unmarshal<T: Target + ?Sized>(
        &self,
        input: &[u8],
        target: &mut T,
    ) -> Result<(), JsonApiError> {
        unmarshal::unmarshal_root(self, input, target.root_mut())
    }
}

static GLOBAL: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::default()));

/// Read access to the process-wide configuration.
///
/// Do not hold the guard across calls to the setters; they would wait on it
/// forever.
pub fn config() -> RwLockReadGuard<'static, Config> {
    GLOBAL.read()
}

/// A copy of the process-wide configuration; codecs are shared, not cloned.
pub(crate) fn current() -> Config {
    GLOBAL.read().clone()
}

/// Replaces the process-wide configuration, returning the previous one.
pub fn replace_config(config: Config) -> Config {
    core::mem::replace(&mut *GLOBAL.write(), config)
}

pub fn set_json_prefix(prefix: impl Into<String>) {
    GLOBAL.write().json_prefix = prefix.into();
}

/// `None` switches to compact output.
pub fn set_json_indent(indent: Option<&str>) {
    GLOBAL.write().json_indent = indent.map(str::to_string);
}

pub fn set_tag_key(tag_key: impl Into<String>) {
    GLOBAL.write().tag_key = tag_key.into();
}

/// Registers a marshal codec in the process-wide registry.
///
/// Calls already in progress keep the codecs they started with.
pub fn register_marshaler<T, F>(codec: F)
where
    T: Any,
    F: Fn(&T) -> Result<Value, CodecError> + Send + Sync + 'static,
{
    GLOBAL.write().register_marshaler(codec);
}

/// Registers an unmarshal codec in the process-wide registry.
///
/// Calls already in progress keep the codecs they started with.
pub fn register_unmarshaler<T, F>(codec: F)
where
    T: Any,
    F: Fn(&Value) -> Result<T, CodecError> + Send + Sync + 'static,
{
    GLOBAL.write().register_unmarshaler(codec);
}

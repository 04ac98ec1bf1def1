//! User-supplied codecs for field types the engines cannot handle.
//!
//! Codecs are registered with their concrete type and stored type-erased,
//! keyed by [`TypeId`]. A later registration for the same type replaces
//! the earlier one.

use core::any::{Any, TypeId};
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::CodecError;

type MarshalFn = Arc<dyn Fn(&dyn Any) -> Result<Value, CodecError> + Send + Sync>;
type UnmarshalFn = Arc<dyn Fn(&Value, &mut dyn Any) -> Result<(), CodecError> + Send + Sync>;

#[derive(Clone, Default)]
struct Entry {
    type_name: &'static str,
    marshal: Option<MarshalFn>,
    unmarshal: Option<UnmarshalFn>,
}

/// Table of codecs keyed by field type.
#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<TypeId, Entry>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for entry in self.entries.values() {
            list.entry(&format_args!(
                "{} (marshal: {}, unmarshal: {})",
                entry.type_name,
                entry.marshal.is_some(),
                entry.unmarshal.is_some()
            ));
        }
        list.finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Registers how values of type `T` are written into a document.
    ///
    /// The codec may return `Value::Null`; it is written as `null`.
    pub fn register_marshaler<T, F>(&mut self, codec: F)
    where
        T: Any,
        F: Fn(&T) -> Result<Value, CodecError> + Send + Sync + 'static,
    {
        let erased: MarshalFn = Arc::new(move |value: &dyn Any| match value.downcast_ref::<T>() {
            Some(value) => codec(value),
            None => Err(mismatch::<T>()),
        });
        self.entry::<T>().marshal = Some(erased);
    }

    /// Registers how values of type `T` are read from a document.
    ///
    /// The codec is also called for JSON `null`.
    pub fn register_unmarshaler<T, F>(&mut self, codec: F)
    where
        T: Any,
        F: Fn(&Value) -> Result<T, CodecError> + Send + Sync + 'static,
    {
        let erased: UnmarshalFn = Arc::new(move |value: &Value, slot: &mut dyn Any| {
            let decoded = codec(value)?;
            match slot.downcast_mut::<T>() {
                Some(slot) => {
                    *slot = decoded;
                    Ok(())
                }
                None => Err(mismatch::<T>()),
            }
        });
        self.entry::<T>().unmarshal = Some(erased);
    }

    pub fn has_marshaler(&self, type_id: TypeId) -> bool {
        self.entries.get(&type_id).is_some_and(|e| e.marshal.is_some())
    }

    pub fn has_unmarshaler(&self, type_id: TypeId) -> bool {
        self.entries.get(&type_id).is_some_and(|e| e.unmarshal.is_some())
    }

    /// Runs the marshal codec for the concrete type of `value`, if any.
    pub(crate) fn marshal(&self, value: &dyn Any) -> Option<Result<Value, CodecError>> {
        let codec = self.entries.get(&value.type_id())?.marshal.as_ref()?;
        Some(codec(value))
    }

    /// Runs the unmarshal codec for the concrete type of `slot`, if any.
    pub(crate) fn unmarshal(
        &self,
        value: &Value,
        slot: &mut dyn Any,
    ) -> Option<Result<(), CodecError>> {
        let type_id = (*slot).type_id();
        let codec = self.entries.get(&type_id)?.unmarshal.as_ref()?;
        Some(codec(value, slot))
    }

    fn entry<T: Any>(&mut self) -> &mut Entry {
        self.entries.entry(TypeId::of::<T>()).or_insert_with(|| Entry {
            type_name: core::any::type_name::<T>(),
            ..Entry::default()
        })
    }
}

fn mismatch<T>() -> CodecError {
    CodecError::new(format!(
        "codec for {} called with another type",
        core::any::type_name::<T>()
    ))
}

//! Static per-type tables emitted by `#[derive(JsonApi)]`.

use core::any::Any;

use crate::Reflect;

/// One `#[jsonapi(...)]` annotation on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    /// The annotation key, `jsonapi` unless written as `key = "..."`
    pub key: &'static str,
    /// The raw `<kind>,<name>` text
    pub value: &'static str,
}

/// A field that takes part in the JSON:API mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldShape {
    /// The Rust field name
    pub name: &'static str,
    /// All annotations on the field, in declaration order
    pub tags: &'static [Tag],
    /// Whether the field's members are flattened into the parent
    pub embedded: bool,
}

impl FieldShape {
    /// The annotation under `key`, if any.
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags.iter().find(|t| t.key == key).map(|t| t.value)
    }
}

/// The mapped fields of a record type, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructShape {
    /// The Rust type name
    pub type_name: &'static str,
    /// Mapped fields; unannotated fields are absent
    pub fields: &'static [FieldShape],
}

/// A record type with a derived [`StructShape`].
///
/// `field(i)` and `field_mut(i)` give access to the field described by
/// `shape().fields[i]`.
pub trait Shaped: Any {
    /// The static shape of this type.
    fn shape(&self) -> &'static StructShape;

    /// Read access to the field at `index`.
    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    /// Write access to the field at `index`.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

impl<T: Shaped> Shaped for Box<T> {
    fn shape(&self) -> &'static StructShape {
        (**self).shape()
    }

    fn field(&self, index: usize) -> Option<&dyn Reflect> {
        (**self).field(index)
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        (**self).field_mut(index)
    }
}

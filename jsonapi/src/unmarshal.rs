//! JSON:API documents back into records.

use core::any::Any;
use core::str::FromStr;
use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::number::{to_f32, to_f64, to_integer};
use crate::walk::{FieldPath, walk_mut};
use crate::{
    CompoundDocument, Config, Document, ErrorKind, JsonApiError, Links, ListSlot, MemberKind,
    Poke, Reflect, RelationshipData, Resource, ResourceIdentifier, ScalarMut, Shaped,
};

/// The top-level shape of an unmarshal destination.
pub enum RootMut<'a> {
    /// A single record, filled from a document with one resource
    One(&'a mut dyn Shaped),
    /// A list of records, appended to from a compound document
    Many(&'a mut dyn ListSlot),
}

/// Anything a document can be unmarshaled into.
pub trait Target {
    fn root_mut(&mut self) -> RootMut<'_>;
}

impl<T: Shaped + Default> Target for Vec<T> {
    fn root_mut(&mut self) -> RootMut<'_> {
        RootMut::Many(self)
    }
}

impl<T: Target + ?Sized> Target for Box<T> {
    fn root_mut(&mut self) -> RootMut<'_> {
        (**self).root_mut()
    }
}

impl<T: Target + Default> Target for Option<T> {
    fn root_mut(&mut self) -> RootMut<'_> {
        self.get_or_insert_with(T::default).root_mut()
    }
}

pub(crate) fn unmarshal_root(
    config: &Config,
    input: &[u8],
    root: RootMut<'_>,
) -> Result<(), JsonApiError> {
    match root {
        RootMut::One(target) => {
            let document: Document = serde_json::from_slice(input).map_err(ErrorKind::Decode)?;
            let data = document.check()?;
            debug!(
                "unmarshaling {}/{} into {}",
                data.kind,
                data.id,
                target.shape().type_name
            );
            Unmarshaler::new(config, &document.included).resource_into(data, target)
        }
        RootMut::Many(list) => {
            let document: CompoundDocument =
                serde_json::from_slice(input).map_err(ErrorKind::Decode)?;
            let data = document.check()?;
            debug!("unmarshaling {} resources", data.len());
            let mut unmarshaler = Unmarshaler::new(config, &document.included);
            for (index, resource) in data.iter().enumerate() {
                unmarshaler
                    .resource_into(resource, list.push_default())
                    .map_err(|e| e.in_element(index))?;
            }
            Ok(())
        }
    }
}

struct Unmarshaler<'c, 'd> {
    config: &'c Config,
    /// Included resources by identity, first occurrence wins
    included: HashMap<ResourceIdentifier, &'d Resource>,
    /// Identities whose full resource is being written right now
    resolving: HashSet<ResourceIdentifier>,
}

impl<'c, 'd> Unmarshaler<'c, 'd> {
    fn new(config: &'c Config, included: &'d [Resource]) -> Self {
        let mut by_identity = HashMap::with_capacity(included.len());
        for resource in included {
            by_identity.entry(resource.identifier()).or_insert(resource);
        }
        Unmarshaler {
            config,
            included: by_identity,
            resolving: HashSet::new(),
        }
    }

    fn resource_into(
        &mut self,
        resource: &Resource,
        target: &mut dyn Shaped,
    ) -> Result<(), JsonApiError> {
        let config = self.config;
        walk_mut(target, &config.tag_key, &mut |path, _, field| {
            self.member(resource, path, field)
                .map_err(|e| e.at_member(path))
        })
    }

    fn member(
        &mut self,
        resource: &Resource,
        path: &FieldPath,
        field: &mut dyn Reflect,
    ) -> Result<(), JsonApiError> {
        trace!("{} `{}`", path.kind, path.dotted());
        match path.kind {
            MemberKind::Primary => {
                if resource.id.is_empty() {
                    return Ok(());
                }
                assign_id(field, &resource.id)
            }
            MemberKind::Attribute => match lookup(&resource.attributes, &path.segments) {
                Some(value) => self.assign(field, value),
                None => Ok(()),
            },
            MemberKind::Meta => match lookup(&resource.meta, &path.segments) {
                Some(value) => self.assign(field, value),
                None => Ok(()),
            },
            MemberKind::Links => assign_links(field, &resource.links),
            MemberKind::Relationship => {
                let data = resource
                    .relationships
                    .get(path.name())
                    .and_then(|relationship| relationship.data.as_ref());
                match data {
                    Some(data) => self.relationship(field, data),
                    None => Ok(()),
                }
            }
        }
    }

    /// Write an attribute or meta value into `field`.
    fn assign(&self, field: &mut dyn Reflect, value: &Value) -> Result<(), JsonApiError> {
        let any: &mut dyn Any = &mut *field;
        if let Some(result) = self.config.registry.unmarshal(value, any) {
            return result.map_err(Into::into);
        }
        if value.is_null() {
            return Ok(());
        }

        let type_name = field.type_name();
        match field.poke() {
            Poke::Option(slot) => self.assign(slot.insert(), value),
            Poke::Scalar(scalar) => assign_scalar(scalar, value),
            _ => Err(ErrorKind::UnsupportedType { type_name }.into()),
        }
    }

    fn relationship(
        &mut self,
        field: &mut dyn Reflect,
        data: &RelationshipData,
    ) -> Result<(), JsonApiError> {
        let type_name = field.type_name();
        match (field.poke(), data) {
            (Poke::Option(slot), RelationshipData::One(None)) => {
                slot.clear();
                Ok(())
            }
            (Poke::Option(slot), data) => self.relationship(slot.insert(), data),
            (Poke::Struct(_), RelationshipData::One(None)) => Ok(()),
            (Poke::Struct(target), RelationshipData::One(Some(identifier))) => {
                self.resolve(identifier, target)
            }
            (Poke::List(list), RelationshipData::Many(identifiers)) => {
                list.clear();
                for identifier in identifiers {
                    self.resolve(identifier, list.push_default())?;
                }
                Ok(())
            }
            (Poke::List(_), RelationshipData::One(_)) => Err(ErrorKind::TypeMismatch {
                expected: "array of resource identifiers",
                got: "single resource identifier",
            }
            .into()),
            (Poke::Struct(_), RelationshipData::Many(_)) => Err(ErrorKind::TypeMismatch {
                expected: "single resource identifier",
                got: "array of resource identifiers",
            }
            .into()),
            _ => Err(ErrorKind::InvalidRelationshipType { type_name }.into()),
        }
    }

    /// Fill `target` from the included resource named by `identifier`, or
    /// with the identity alone when it is not included or already being
    /// resolved further up.
    fn resolve(
        &mut self,
        identifier: &ResourceIdentifier,
        target: &mut dyn Shaped,
    ) -> Result<(), JsonApiError> {
        let included = self.included.get(identifier).copied();
        match included {
            Some(resource) if self.resolving.insert(identifier.clone()) => {
                trace!("resolving {}/{}", identifier.kind, identifier.id);
                let result = self.resource_into(resource, target);
                self.resolving.remove(identifier);
                result
            }
            _ => self.resource_into(&Resource::from_identifier(identifier), target),
        }
    }
}

fn assign_id(field: &mut dyn Reflect, id: &str) -> Result<(), JsonApiError> {
    let type_name = field.type_name();
    match field.poke() {
        Poke::Scalar(ScalarMut::String(slot)) => {
            id.clone_into(slot);
            Ok(())
        }
        Poke::Scalar(scalar) => assign_integer_id(scalar, id, type_name),
        Poke::Option(slot) => assign_id(slot.insert(), id),
        _ => Err(ErrorKind::InvalidPrimaryType { type_name }.into()),
    }
}

fn assign_integer_id(
    scalar: ScalarMut<'_>,
    id: &str,
    type_name: &'static str,
) -> Result<(), JsonApiError> {
    fn parse<T: FromStr>(id: &str, target_type: &'static str) -> Result<T, JsonApiError> {
        id.parse().map_err(|_| {
            ErrorKind::InvalidId {
                id: id.to_string(),
                target_type,
            }
            .into()
        })
    }

    match scalar {
        ScalarMut::U8(n) => *n = parse(id, "u8")?,
        ScalarMut::U16(n) => *n = parse(id, "u16")?,
        ScalarMut::U32(n) => *n = parse(id, "u32")?,
        ScalarMut::U64(n) => *n = parse(id, "u64")?,
        ScalarMut::U128(n) => *n = parse(id, "u128")?,
        ScalarMut::Usize(n) => *n = parse(id, "usize")?,
        ScalarMut::I8(n) => *n = parse(id, "i8")?,
        ScalarMut::I16(n) => *n = parse(id, "i16")?,
        ScalarMut::I32(n) => *n = parse(id, "i32")?,
        ScalarMut::I64(n) => *n = parse(id, "i64")?,
        ScalarMut::I128(n) => *n = parse(id, "i128")?,
        ScalarMut::Isize(n) => *n = parse(id, "isize")?,
        _ => return Err(ErrorKind::InvalidPrimaryType { type_name }.into()),
    }
    Ok(())
}

fn assign_scalar(scalar: ScalarMut<'_>, value: &Value) -> Result<(), JsonApiError> {
    match (scalar, value) {
        (ScalarMut::Bool(slot), Value::Bool(b)) => *slot = *b,
        (ScalarMut::String(slot), Value::String(s)) => slot.clone_from(s),
        (ScalarMut::U8(slot), Value::Number(n)) => *slot = to_integer(n, "u8")?,
        (ScalarMut::U16(slot), Value::Number(n)) => *slot = to_integer(n, "u16")?,
        (ScalarMut::U32(slot), Value::Number(n)) => *slot = to_integer(n, "u32")?,
        (ScalarMut::U64(slot), Value::Number(n)) => *slot = to_integer(n, "u64")?,
        (ScalarMut::U128(slot), Value::Number(n)) => *slot = to_integer(n, "u128")?,
        (ScalarMut::Usize(slot), Value::Number(n)) => *slot = to_integer(n, "usize")?,
        (ScalarMut::I8(slot), Value::Number(n)) => *slot = to_integer(n, "i8")?,
        (ScalarMut::I16(slot), Value::Number(n)) => *slot = to_integer(n, "i16")?,
        (ScalarMut::I32(slot), Value::Number(n)) => *slot = to_integer(n, "i32")?,
        (ScalarMut::I64(slot), Value::Number(n)) => *slot = to_integer(n, "i64")?,
        (ScalarMut::I128(slot), Value::Number(n)) => *slot = to_integer(n, "i128")?,
        (ScalarMut::Isize(slot), Value::Number(n)) => *slot = to_integer(n, "isize")?,
        (ScalarMut::F32(slot), Value::Number(n)) => *slot = to_f32(n)?,
        (ScalarMut::F64(slot), Value::Number(n)) => *slot = to_f64(n)?,
        (scalar, value) => {
            return Err(ErrorKind::TypeMismatch {
                expected: scalar.type_name(),
                got: json_type(value),
            }
            .into());
        }
    }
    Ok(())
}

fn assign_links(field: &mut dyn Reflect, links: &Links) -> Result<(), JsonApiError> {
    let type_name = field.type_name();
    match field.poke() {
        Poke::Links(slot) => {
            slot.clone_from(links);
            Ok(())
        }
        Poke::Option(_) if links.is_empty() => Ok(()),
        Poke::Option(slot) => assign_links(slot.insert(), links),
        _ => Err(ErrorKind::InvalidLinksType { type_name }.into()),
    }
}

/// The value under a dotted path, if every segment exists.
fn lookup<'v>(map: &'v Map<String, Value>, segments: &[&str]) -> Option<&'v Value> {
    let mut keys = segments.iter().flat_map(|s| s.split('.'));
    let mut current = map.get(keys.next()?)?;
    for key in keys {
        current = current.as_object()?.get(key)?;
    }
    Some(current)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

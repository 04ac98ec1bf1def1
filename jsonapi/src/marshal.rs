//! Records to JSON:API documents.

use core::any::Any;
use std::collections::HashSet;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};

use crate::walk::{FieldPath, walk};
use crate::{
    CompoundDocument, Config, Document, ErrorKind, ErrorObject, JsonApiError, Links,
    MarshalParams, MemberKind, Peek, Reflect, Relationship, Resource, ResourceIdentifier, Scalar,
    Shaped,
};

/// The top-level shape of a marshal input.
pub enum Root<'a> {
    /// A single record, written as a document with one resource
    One(&'a dyn Shaped),
    /// A sequence of records, written as a compound document
    Many(Vec<&'a dyn Shaped>),
    /// An absent value; marshaling it is an error
    Nil,
}

/// Anything that can be marshaled as a document.
///
/// Implemented by `#[derive(JsonApi)]` types, slices and `Vec`s of them
/// (boxed or not), `Option`s and references of any of those.
pub trait Payload {
    fn root(&self) -> Root<'_>;
}

impl<T: Shaped> Payload for [T] {
    fn root(&self) -> Root<'_> {
        Root::Many(self.iter().map(|v| v as &dyn Shaped).collect())
    }
}

impl<T: Shaped> Payload for Vec<T> {
    fn root(&self) -> Root<'_> {
        self.as_slice().root()
    }
}

impl<P: Payload> Payload for Option<P> {
    fn root(&self) -> Root<'_> {
        match self {
            Some(payload) => payload.root(),
            None => Root::Nil,
        }
    }
}

impl<P: Payload + ?Sized> Payload for &P {
    fn root(&self) -> Root<'_> {
        (**self).root()
    }
}

impl<P: Payload + ?Sized> Payload for Box<P> {
    fn root(&self) -> Root<'_> {
        (**self).root()
    }
}

pub(crate) fn marshal_root(
    config: &Config,
    root: Root<'_>,
    params: &MarshalParams,
) -> Result<Vec<u8>, JsonApiError> {
    let mut marshaler = Marshaler::new(config);
    match root {
        Root::Nil => Err(ErrorKind::NilValue.into()),
        Root::One(value) => {
            debug!("marshaling one {}", value.shape().type_name);
            let identifier = marshaler.identify(value)?;
            marshaler.seen.insert(identifier);
            let data = marshaler.resource(value)?;

            let mut document = Document::new(params);
            document.data = Some(data);
            document.included = marshaler.included;
            encode(config, &document)
        }
        Root::Many(values) => {
            debug!("marshaling {} records", values.len());
            for (index, value) in values.iter().enumerate() {
                let identifier = marshaler
                    .identify(*value)
                    .map_err(|e| e.in_element(index))?;
                marshaler.seen.insert(identifier);
            }
            let mut data = Vec::with_capacity(values.len());
            for (index, value) in values.into_iter().enumerate() {
                data.push(marshaler.resource(value).map_err(|e| e.in_element(index))?);
            }

            let mut document = CompoundDocument::new(params);
            document.data = data;
            document.included = marshaler.included;
            encode(config, &document)
        }
    }
}

pub(crate) fn marshal_errors(
    config: &Config,
    params: &MarshalParams,
    errors: &[ErrorObject],
) -> Result<Vec<u8>, JsonApiError> {
    debug!("marshaling {} error objects", errors.len());
    let mut document = Document::new(params);
    document.errors = errors.to_vec();
    encode(config, &document)
}

/// Serialize with the configured indent, then apply the line prefix.
fn encode<T: Serialize>(config: &Config, value: &T) -> Result<Vec<u8>, JsonApiError> {
    let Some(indent) = &config.json_indent else {
        return serde_json::to_vec(value).map_err(|e| ErrorKind::Encode(e).into());
    };

    let mut out = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut serializer).map_err(ErrorKind::Encode)?;

    let prefix = config.json_prefix.as_bytes();
    if prefix.is_empty() {
        return Ok(out);
    }
    let lines = out.iter().filter(|&&b| b == b'\n').count();
    let mut prefixed = Vec::with_capacity(out.len() + lines * prefix.len());
    for byte in out {
        prefixed.push(byte);
        if byte == b'\n' {
            prefixed.extend_from_slice(prefix);
        }
    }
    Ok(prefixed)
}

struct Marshaler<'c> {
    config: &'c Config,
    included: Vec<Resource>,
    /// Identities already present in `data` or `included`
    seen: HashSet<ResourceIdentifier>,
}

impl<'c> Marshaler<'c> {
    fn new(config: &'c Config) -> Self {
        Marshaler {
            config,
            included: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Identity of a record from its primary member alone.
    fn identify(&self, value: &dyn Shaped) -> Result<ResourceIdentifier, JsonApiError> {
        let mut found: Option<(ResourceIdentifier, &'static str)> = None;
        walk(value, &self.config.tag_key, &mut |path, _, field| {
            if path.kind != MemberKind::Primary {
                return Ok(());
            }
            if let Some((_, first)) = &found {
                return Err(ErrorKind::DuplicatePrimary {
                    resource_type: first.to_string(),
                }
                .into());
            }
            let id = primary_id(field).map_err(|e| e.at_member(path))?;
            let mut resource = Resource::default();
            resource
                .set_id_and_type(id, path.name())
                .map_err(|e| e.at_member(path))?;
            found = Some((resource.identifier(), path.name()));
            Ok(())
        })?;

        match found {
            Some((identifier, _)) => Ok(identifier),
            None => Err(ErrorKind::MissingPrimary {
                type_name: value.shape().type_name,
            }
            .into()),
        }
    }

    fn resource(&mut self, value: &dyn Shaped) -> Result<Resource, JsonApiError> {
        let config = self.config;
        let mut resource = Resource::default();
        let mut primary: Option<&'static str> = None;

        walk(value, &config.tag_key, &mut |path, _, field| {
            self.member(&mut resource, &mut primary, path, field)
                .map_err(|e| e.at_member(path))
        })?;

        if primary.is_none() {
            return Err(ErrorKind::MissingPrimary {
                type_name: value.shape().type_name,
            }
            .into());
        }
        Ok(resource)
    }

    fn member(
        &mut self,
        resource: &mut Resource,
        primary: &mut Option<&'static str>,
        path: &FieldPath,
        field: &dyn Reflect,
    ) -> Result<(), JsonApiError> {
        trace!("{} `{}`", path.kind, path.dotted());
        match path.kind {
            MemberKind::Primary => {
                if let Some(first) = *primary {
                    return Err(ErrorKind::DuplicatePrimary {
                        resource_type: first.to_string(),
                    }
                    .into());
                }
                resource.set_id_and_type(primary_id(field)?, path.name())?;
                *primary = Some(path.name());
            }
            MemberKind::Attribute => {
                if let Some(value) = self.value(field)? {
                    insert_at(&mut resource.attributes, &path.segments, value);
                }
            }
            MemberKind::Meta => {
                if let Some(value) = self.value(field)? {
                    insert_at(&mut resource.meta, &path.segments, value);
                }
            }
            MemberKind::Links => {
                if let Some(links) = links_of(field)? {
                    resource.links = links.clone();
                }
            }
            MemberKind::Relationship => {
                let relationship = self.relationship(field)?;
                resource
                    .relationships
                    .insert(path.name().to_string(), relationship);
            }
        }
        Ok(())
    }

    /// The JSON value of an attribute or meta field; `None` means omit.
    fn value(&self, field: &dyn Reflect) -> Result<Option<Value>, JsonApiError> {
        let registry = &self.config.registry;
        let any: &dyn Any = field;
        if let Some(encoded) = registry.marshal(any) {
            return Ok(Some(encoded?));
        }

        match field.peek() {
            Peek::Option(None) => Ok(None),
            Peek::Option(Some(inner)) => self.value(inner),
            Peek::Scalar(scalar) => scalar_value(scalar).map(Some),
            _ => Err(unsupported(field)),
        }
    }

    fn relationship(&mut self, field: &dyn Reflect) -> Result<Relationship, JsonApiError> {
        match field.peek() {
            Peek::Struct(target) => Ok(Relationship::one(Some(self.relate(target)?))),
            Peek::Option(None) => Ok(Relationship::one(None)),
            Peek::Option(Some(inner)) => self.relationship(inner),
            Peek::List(targets) => {
                let mut identifiers = Vec::with_capacity(targets.len());
                for target in targets {
                    identifiers.push(self.relate(target)?);
                }
                Ok(Relationship::many(identifiers))
            }
            _ => Err(ErrorKind::InvalidRelationshipType {
                type_name: field.type_name(),
            }
            .into()),
        }
    }

    /// Identify `target` and add it to `included` unless already present.
    fn relate(&mut self, target: &dyn Shaped) -> Result<ResourceIdentifier, JsonApiError> {
        let identifier = self.identify(target)?;
        if self.seen.insert(identifier.clone()) {
            trace!("including {}/{}", identifier.kind, identifier.id);
            // reserve the slot so a resource precedes the ones it pulls in
            let slot = self.included.len();
            self.included.push(Resource::default());
            self.included[slot] = self.resource(target)?;
        }
        Ok(identifier)
    }
}

fn primary_id(field: &dyn Reflect) -> Result<&str, JsonApiError> {
    match field.peek() {
        Peek::Scalar(Scalar::Str(id)) => Ok(id),
        Peek::Option(Some(inner)) => primary_id(inner),
        Peek::Option(None) => Err(ErrorKind::EmptyId.into()),
        _ => Err(ErrorKind::InvalidPrimaryType {
            type_name: field.type_name(),
        }
        .into()),
    }
}

/// `Some` for a non-empty links field; `None` for empty or absent links.
fn links_of(field: &dyn Reflect) -> Result<Option<&Links>, JsonApiError> {
    match field.peek() {
        Peek::Links(links) if links.is_empty() => Ok(None),
        Peek::Links(links) => Ok(Some(links)),
        Peek::Option(None) => Ok(None),
        Peek::Option(Some(inner)) => links_of(inner),
        _ => Err(ErrorKind::InvalidLinksType {
            type_name: field.type_name(),
        }
        .into()),
    }
}

fn scalar_value(scalar: Scalar<'_>) -> Result<Value, JsonApiError> {
    let value = match scalar {
        Scalar::Bool(b) => Value::Bool(b),
        Scalar::U8(n) => n.into(),
        Scalar::U16(n) => n.into(),
        Scalar::U32(n) => n.into(),
        Scalar::U64(n) => n.into(),
        Scalar::Usize(n) => n.into(),
        Scalar::I8(n) => n.into(),
        Scalar::I16(n) => n.into(),
        Scalar::I32(n) => n.into(),
        Scalar::I64(n) => n.into(),
        Scalar::Isize(n) => n.into(),
        Scalar::U128(n) => serde_json::to_value(n).map_err(ErrorKind::Encode)?,
        Scalar::I128(n) => serde_json::to_value(n).map_err(ErrorKind::Encode)?,
        Scalar::F32(n) if n.is_finite() => n.into(),
        Scalar::F64(n) if n.is_finite() => n.into(),
        Scalar::F32(_) | Scalar::F64(_) => return Err(ErrorKind::NonFiniteFloat.into()),
        Scalar::Str(s) => Value::String(s.to_string()),
    };
    Ok(value)
}

/// Store `value` under a dotted path, creating intermediate objects.
fn insert_at(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let mut keys: Vec<&str> = segments.iter().flat_map(|s| s.split('.')).collect();
    let Some(last) = keys.pop() else {
        return;
    };

    let mut current = map;
    for key in keys {
        let entry = current
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(last.to_string(), value);
}

fn unsupported(field: &dyn Reflect) -> JsonApiError {
    ErrorKind::UnsupportedType {
        type_name: field.type_name(),
    }
    .into()
}

//! Depth-first traversal of annotated records.
//!
//! Fields are visited in declaration order. Embedded fields are flattened
//! into their parent; annotated fields that hold a nested record (and are
//! not relationships) are descended into with the member name appended to
//! the path, which yields dotted paths such as `nested.nested_string`.

use crate::{FieldShape, JsonApiError, Member, MemberKind, Peek, Poke, Reflect, Shaped};

/// The member a leaf field maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    /// Member kind of the leaf
    pub kind: MemberKind,
    /// Member names from the outermost record down to the leaf
    pub segments: Vec<&'static str>,
}

impl FieldPath {
    /// The leaf member name.
    pub fn name(&self) -> &'static str {
        self.segments.last().copied().unwrap_or_default()
    }

    /// Segments joined with `.`.
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// JSON Pointer to the member inside a single-resource document.
    pub fn pointer(&self) -> String {
        match self.kind {
            MemberKind::Primary => "/data/id".to_string(),
            MemberKind::Links => "/data/links".to_string(),
            MemberKind::Relationship => {
                format!("/data/relationships/{}", escape(self.name()))
            }
            MemberKind::Attribute | MemberKind::Meta => {
                let mut pointer = match self.kind {
                    MemberKind::Meta => "/data/meta".to_string(),
                    _ => "/data/attributes".to_string(),
                };
                for key in self.segments.iter().flat_map(|s| s.split('.')) {
                    pointer.push('/');
                    pointer.push_str(&escape(key));
                }
                pointer
            }
        }
    }
}

/// RFC 6901 escaping of one reference token.
fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Visit every mapped leaf field of `value`.
///
/// Fields without an annotation under `tag_key` are skipped. A malformed
/// annotation, or any error returned by `visit`, stops the walk.
pub fn walk<'a>(
    value: &'a dyn Shaped,
    tag_key: &str,
    visit: &mut dyn FnMut(&FieldPath, &'static FieldShape, &'a dyn Reflect) -> Result<(), JsonApiError>,
) -> Result<(), JsonApiError> {
    let mut prefix = Vec::new();
    walk_inner(value, tag_key, &mut prefix, visit)
}

fn walk_inner<'a>(
    value: &'a dyn Shaped,
    tag_key: &str,
    prefix: &mut Vec<&'static str>,
    visit: &mut dyn FnMut(&FieldPath, &'static FieldShape, &'a dyn Reflect) -> Result<(), JsonApiError>,
) -> Result<(), JsonApiError> {
    let shape = value.shape();
    for (index, field) in shape.fields.iter().enumerate() {
        let Some(reflect) = value.field(index) else {
            continue;
        };

        if field.embedded {
            match reflect.peek() {
                Peek::Struct(inner) => walk_inner(inner, tag_key, prefix, visit)?,
                _ => return Err(embed_error(reflect.type_name())),
            }
            continue;
        }

        let Some(tag) = field.tag(tag_key) else {
            trace!("{}.{}: no `{}` tag, skipping", shape.type_name, field.name, tag_key);
            continue;
        };
        let member = Member::parse(tag).map_err(|e| e.at(joined(prefix, field.name)))?;

        if member.kind != MemberKind::Relationship {
            if let Peek::Struct(inner) = reflect.peek() {
                prefix.push(member.name);
                let result = walk_inner(inner, tag_key, prefix, visit);
                prefix.pop();
                result?;
                continue;
            }
        }

        let mut segments = prefix.clone();
        segments.push(member.name);
        let path = FieldPath {
            kind: member.kind,
            segments,
        };
        visit(&path, field, reflect)?;
    }
    Ok(())
}

/// Mutable counterpart of [`walk`], with identical traversal rules.
pub fn walk_mut(
    value: &mut dyn Shaped,
    tag_key: &str,
    visit: &mut dyn FnMut(&FieldPath, &'static FieldShape, &mut dyn Reflect) -> Result<(), JsonApiError>,
) -> Result<(), JsonApiError> {
    let mut prefix = Vec::new();
    walk_mut_inner(value, tag_key, &mut prefix, visit)
}

fn walk_mut_inner(
    value: &mut dyn Shaped,
    tag_key: &str,
    prefix: &mut Vec<&'static str>,
    visit: &mut dyn FnMut(&FieldPath, &'static FieldShape, &mut dyn Reflect) -> Result<(), JsonApiError>,
) -> Result<(), JsonApiError> {
    let shape = value.shape();
    for (index, field) in shape.fields.iter().enumerate() {
        let is_struct = match value.field(index) {
            Some(reflect) => matches!(reflect.peek(), Peek::Struct(_)),
            None => continue,
        };
        let Some(reflect) = value.field_mut(index) else {
            continue;
        };

        if field.embedded {
            let type_name = reflect.type_name();
            match reflect.poke() {
                Poke::Struct(inner) => walk_mut_inner(inner, tag_key, prefix, visit)?,
                _ => return Err(embed_error(type_name)),
            }
            continue;
        }

        let Some(tag) = field.tag(tag_key) else {
            trace!("{}.{}: no `{}` tag, skipping", shape.type_name, field.name, tag_key);
            continue;
        };
        let member = Member::parse(tag).map_err(|e| e.at(joined(prefix, field.name)))?;

        if member.kind != MemberKind::Relationship && is_struct {
            if let Poke::Struct(inner) = reflect.poke() {
                prefix.push(member.name);
                let result = walk_mut_inner(inner, tag_key, prefix, visit);
                prefix.pop();
                result?;
                continue;
            }
        }

        let mut segments = prefix.clone();
        segments.push(member.name);
        let path = FieldPath {
            kind: member.kind,
            segments,
        };
        visit(&path, field, reflect)?;
    }
    Ok(())
}

fn joined(prefix: &[&'static str], last: &str) -> String {
    let mut segments: Vec<&str> = prefix.to_vec();
    segments.push(last);
    segments.join(".")
}

fn embed_error(type_name: &'static str) -> JsonApiError {
    crate::ErrorKind::UnsupportedType { type_name }.into()
}

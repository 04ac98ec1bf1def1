//! Relationship objects.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::Meta;

/// A `{id, type}` pair naming another resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResourceIdentifier {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        ResourceIdentifier {
            id: id.into(),
            kind: kind.into(),
        }
    }
}

/// The `data` member of a relationship.
///
/// `One(None)` is written as `null`; `Many` is always an array, possibly
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipData {
    One(Option<ResourceIdentifier>),
    Many(Vec<ResourceIdentifier>),
}

impl Default for RelationshipData {
    fn default() -> Self {
        RelationshipData::One(None)
    }
}

impl RelationshipData {
    pub fn identifiers(&self) -> impl Iterator<Item = &ResourceIdentifier> {
        let (one, many): (Option<&ResourceIdentifier>, &[ResourceIdentifier]) = match self {
            RelationshipData::One(one) => (one.as_ref(), &[]),
            RelationshipData::Many(many) => (None, many),
        };
        one.into_iter().chain(many)
    }
}

impl Serialize for RelationshipData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RelationshipData::One(one) => one.serialize(serializer),
            RelationshipData::Many(many) => many.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RelationshipData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(RelationshipData::One(None)),
            value @ Value::Object(_) => serde_json::from_value(value)
                .map(|id| RelationshipData::One(Some(id)))
                .map_err(de::Error::custom),
            value @ Value::Array(_) => serde_json::from_value(value)
                .map(RelationshipData::Many)
                .map_err(de::Error::custom),
            _ => Err(de::Error::custom(
                "relationship data must be null, an object or an array",
            )),
        }
    }
}

/// The `self` and `related` links of a relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
}

/// A relationship object: `{"data": ..., "links": ..., "meta": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// `None` when the object carries only `links` or `meta`
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<RelationshipData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<RelationshipLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Relationship {
    /// A to-one relationship; `None` serializes as `{"data": null}`.
    pub fn one(target: Option<ResourceIdentifier>) -> Self {
        Relationship {
            data: Some(RelationshipData::One(target)),
            ..Relationship::default()
        }
    }

    /// A to-many relationship; empty serializes as `{"data": []}`.
    pub fn many(targets: Vec<ResourceIdentifier>) -> Self {
        Relationship {
            data: Some(RelationshipData::Many(targets)),
            ..Relationship::default()
        }
    }
}

/// A `data` member that is present, `null` included.
fn present<'de, D>(deserializer: D) -> Result<Option<RelationshipData>, D::Error>
where
    D: Deserializer<'de>,
{
    RelationshipData::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_empty_are_distinct() {
        assert_eq!(
            serde_json::to_value(Relationship::one(None)).unwrap(),
            json!({"data": null})
        );
        assert_eq!(
            serde_json::to_value(Relationship::many(vec![])).unwrap(),
            json!({"data": []})
        );
    }

    #[test]
    fn data_shape_is_detected_on_decode() {
        let one: Relationship =
            serde_json::from_value(json!({"data": {"id": "1", "type": "people"}})).unwrap();
        assert_eq!(
            one.data,
            Some(RelationshipData::One(Some(ResourceIdentifier::new("1", "people"))))
        );

        let null: Relationship = serde_json::from_value(json!({"data": null})).unwrap();
        assert_eq!(null.data, Some(RelationshipData::One(None)));

        let many: Relationship = serde_json::from_value(json!({"data": []})).unwrap();
        assert_eq!(many.data, Some(RelationshipData::Many(vec![])));

        let links_only: Relationship =
            serde_json::from_value(json!({"links": {"related": "/a"}})).unwrap();
        assert_eq!(links_only.data, None);
        assert_eq!(
            links_only.links.and_then(|l| l.related).as_deref(),
            Some("/a")
        );
    }

    #[test]
    fn scalar_data_is_rejected() {
        assert!(serde_json::from_value::<Relationship>(json!({"data": 3})).is_err());
    }
}

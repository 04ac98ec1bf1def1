//! JSON:API links objects.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Meta;

/// A single link: a bare URL or an object with `href` and `meta`.
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    Url(String),
    Object { href: String, meta: Option<Meta> },
}

impl Link {
    /// The target URL.
    pub fn href(&self) -> &str {
        match self {
            Link::Url(href) | Link::Object { href, .. } => href,
        }
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Link::Url(href) => serializer.serialize_str(href),
            Link::Object { href, meta } => {
                let len = if meta.is_some() { 2 } else { 1 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("href", href)?;
                if let Some(meta) = meta {
                    map.serialize_entry("meta", meta)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Link {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(href) => Ok(Link::Url(href)),
            Value::Object(mut object) => {
                let href = match object.remove("href") {
                    Some(Value::String(href)) => href,
                    _ => return Err(de::Error::missing_field("href")),
                };
                let meta = match object.remove("meta") {
                    Some(Value::Object(meta)) => Some(meta),
                    None | Some(Value::Null) => None,
                    Some(_) => return Err(de::Error::custom("link meta must be an object")),
                };
                Ok(Link::Object { href, meta })
            }
            _ => Err(de::Error::custom("link must be a string or an object")),
        }
    }
}

/// A links object, keyed by link name.
///
/// ```
/// use jsonapi::Links;
///
/// let mut links = Links::new();
/// links.add_link("self", "https://example.com/books/1");
/// assert_eq!(links.get("self").map(|l| l.href()), Some("https://example.com/books/1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<String, Link>);

impl Links {
    /// An empty links object.
    pub fn new() -> Self {
        Links::default()
    }

    /// Adds a URL-only link, replacing any link with the same name.
    pub fn add_link(&mut self, name: impl Into<String>, href: impl Into<String>) {
        self.0.insert(name.into(), Link::Url(href.into()));
    }

    /// Adds a link object with meta, replacing any link with the same name.
    pub fn add_link_with_meta(
        &mut self,
        name: impl Into<String>,
        href: impl Into<String>,
        meta: Meta,
    ) {
        self.0.insert(
            name.into(),
            Link::Object {
                href: href.into(),
                meta: Some(meta),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Link> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Link)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

//! Top-level document envelopes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{ErrorKind, ErrorObject, Information, JsonApiError, Links, Meta, Resource};

/// Top-level links and meta added by [`marshal_with_params`](crate::marshal_with_params).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarshalParams {
    pub links: Option<Links>,
    pub meta: Option<Meta>,
}

/// A document whose `data` is a single resource.
///
/// `data` and `errors` are mutually exclusive; [`Document::check`] enforces
/// it on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<Information>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorObject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Resource>,
}

impl Document {
    /// An empty document carrying the `jsonapi` version marker and `params`.
    pub fn new(params: &MarshalParams) -> Self {
        Document {
            jsonapi: Some(Information::default()),
            meta: params.meta.clone(),
            links: params.links.clone(),
            ..Document::default()
        }
    }

    /// Rejects `data` together with `errors`, and turns an errors-only
    /// document into [`ErrorKind::ErrorDocument`].
    pub fn check(&self) -> Result<&Resource, JsonApiError> {
        match (&self.data, self.errors.is_empty()) {
            (Some(_), false) => Err(ErrorKind::DataAndErrors.into()),
            (Some(data), true) => Ok(data),
            (None, false) => Err(ErrorKind::ErrorDocument(self.errors.clone()).into()),
            (None, true) => Err(ErrorKind::MissingData.into()),
        }
    }
}

/// A document whose `data` is an array of resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompoundDocument {
    /// A `null` array decodes as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<Information>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorObject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Resource>,
}

impl CompoundDocument {
    pub fn new(params: &MarshalParams) -> Self {
        CompoundDocument {
            jsonapi: Some(Information::default()),
            meta: params.meta.clone(),
            links: params.links.clone(),
            ..CompoundDocument::default()
        }
    }

    /// Same rules as [`Document::check`]; an empty `data` array is valid.
    pub fn check(&self) -> Result<&[Resource], JsonApiError> {
        match (self.data.is_empty(), self.errors.is_empty()) {
            (false, false) => Err(ErrorKind::DataAndErrors.into()),
            (true, false) => Err(ErrorKind::ErrorDocument(self.errors.clone()).into()),
            (_, true) => Ok(&self.data),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Resource>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<Resource>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

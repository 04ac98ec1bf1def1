use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Attributes, ErrorKind, JsonApiError, Links, Meta, Relationship, ResourceIdentifier};

/// A resource object.
///
/// Members other than `id` and `type` are omitted from the output when
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,
}

impl Resource {
    /// Sets the identity, rejecting an empty id or type.
    pub fn set_id_and_type(
        &mut self,
        id: impl Into<String>,
        kind: impl Into<String>,
    ) -> Result<(), JsonApiError> {
        let id = id.into();
        let kind = kind.into();
        if id.is_empty() {
            return Err(ErrorKind::EmptyId.into());
        }
        if kind.is_empty() {
            return Err(ErrorKind::EmptyType.into());
        }
        self.id = id;
        self.kind = kind;
        Ok(())
    }

    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.id.clone(), self.kind.clone())
    }

    /// A resource carrying nothing but an identity.
    pub(crate) fn from_identifier(identifier: &ResourceIdentifier) -> Self {
        Resource {
            id: identifier.id.clone(),
            kind: identifier.kind.clone(),
            ..Resource::default()
        }
    }
}

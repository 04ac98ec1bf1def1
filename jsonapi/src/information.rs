use serde::{Deserialize, Serialize};

use crate::Meta;

/// The top-level `jsonapi` member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Information {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Information {
    fn default() -> Self {
        Information {
            version: default_version(),
            meta: None,
        }
    }
}

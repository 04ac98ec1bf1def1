//! Error types for marshaling and unmarshaling.

use core::fmt::{self, Display};

use crate::ErrorObject;
use crate::walk::FieldPath;

/// Error returned by every fallible operation in this crate.
#[derive(Debug)]
pub struct JsonApiError {
    /// The specific kind of error
    pub kind: ErrorKind,
    /// Dotted member path where the error occurred, when known
    pub path: Option<String>,
    /// JSON Pointer into the document, e.g. `/data/attributes/title`
    pub pointer: Option<String>,
}

impl Display for JsonApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} (at `{path}`)", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for JsonApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Codec(e) => Some(e),
            ErrorKind::Decode(e) | ErrorKind::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl JsonApiError {
    /// Create an error without path information
    pub const fn new(kind: ErrorKind) -> Self {
        JsonApiError {
            kind,
            path: None,
            pointer: None,
        }
    }

    /// Attach the member path, keeping an innermost path that is already set.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        if self.path.is_none() {
            self.path = Some(path.into());
        }
        self
    }

    /// Attach the member a field maps to. The dotted path keeps the
    /// innermost member, the pointer the outermost one.
    pub fn at_member(mut self, member: &FieldPath) -> Self {
        if self.path.is_none() {
            self.path = Some(member.dotted());
        }
        self.pointer = Some(member.pointer());
        self
    }

    /// Point into element `index` of a compound document's `data`.
    pub(crate) fn in_element(mut self, index: usize) -> Self {
        if let Some(rest) = self.pointer.as_deref().and_then(|p| p.strip_prefix("/data")) {
            self.pointer = Some(format!("/data/{index}{rest}"));
        }
        self
    }

    /// Stable error code, see [`ErrorKind::code`].
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Render this error as a JSON:API error object with the given HTTP status.
    pub fn to_error_object(&self, status: u16) -> ErrorObject {
        let source = self.pointer.as_ref().map(|pointer| {
            let mut map = std::collections::BTreeMap::new();
            map.insert("pointer".to_string(), pointer.clone());
            map
        });
        ErrorObject {
            status: Some(status.to_string()),
            code: Some(self.code().to_string()),
            detail: Some(self.kind.to_string()),
            source,
            ..ErrorObject::default()
        }
    }
}

impl From<ErrorKind> for JsonApiError {
    fn from(kind: ErrorKind) -> Self {
        JsonApiError::new(kind)
    }
}

/// Specific error kinds.
///
/// Precondition errors reject the shape of the input, schema errors reject
/// the annotations or field types of a record, data errors reject a value,
/// and document errors come from the JSON layer.
#[derive(Debug)]
pub enum ErrorKind {
    /// The value handed to marshal was `None`
    NilValue,
    /// A field annotation was present but empty
    MissingTag,
    /// A field annotation did not have the `<kind>,<name>` form
    MalformedTag {
        /// The annotation as written
        tag: String,
    },
    /// A field annotation named a member kind that does not exist
    UnknownMemberKind {
        /// The kind token as written
        kind: String,
    },
    /// No built-in handling and no registered codec for this field type
    UnsupportedType {
        /// Rust type name of the field
        type_name: &'static str,
    },
    /// The primary member is not string (or, on unmarshal, integer) typed
    InvalidPrimaryType {
        /// Rust type name of the field
        type_name: &'static str,
    },
    /// A links member is not of type `Links`
    InvalidLinksType {
        /// Rust type name of the field
        type_name: &'static str,
    },
    /// A relationship member does not point at annotated records
    InvalidRelationshipType {
        /// Rust type name of the field
        type_name: &'static str,
    },
    /// A record has more than one primary member
    DuplicatePrimary {
        /// Resource type of the first primary member
        resource_type: String,
    },
    /// A relationship target has no primary member
    MissingPrimary {
        /// Rust type name of the target
        type_name: &'static str,
    },
    /// The primary member holds an empty id
    EmptyId,
    /// The primary member has an empty resource type
    EmptyType,
    /// The JSON value does not match the field type
    TypeMismatch {
        /// What the field can hold
        expected: &'static str,
        /// What the document contained
        got: &'static str,
    },
    /// A number does not fit the field's width
    NumberOutOfRange {
        /// The number as written in the document
        value: String,
        /// The target type that couldn't hold the value
        target_type: &'static str,
    },
    /// A number with a fractional part was assigned to an integer field
    NotAnInteger {
        /// The number as written in the document
        value: String,
        /// The integer type of the field
        target_type: &'static str,
    },
    /// NaN or an infinity cannot be represented in JSON
    NonFiniteFloat,
    /// A resource id could not be parsed into an integer primary field
    InvalidId {
        /// The id as written in the document
        id: String,
        /// The integer type of the field
        target_type: &'static str,
    },
    /// A registered codec failed
    Codec(CodecError),
    /// The input is not a well-formed document
    Decode(serde_json::Error),
    /// The document could not be written
    Encode(serde_json::Error),
    /// A document carries both `data` and `errors`
    DataAndErrors,
    /// A document has neither `data` nor `errors`
    MissingData,
    /// A document carries `errors` where `data` was expected
    ErrorDocument(Vec<ErrorObject>),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NilValue => write!(f, "value must not be nil"),
            ErrorKind::MissingTag => write!(f, "member type not specified"),
            ErrorKind::MalformedTag { tag } => {
                write!(f, "malformed member tag `{tag}`, expected `<kind>,<name>`")
            }
            ErrorKind::UnknownMemberKind { kind } => write!(f, "unknown member type `{kind}`"),
            ErrorKind::UnsupportedType { type_name } => {
                write!(f, "type not supported: {type_name}")
            }
            ErrorKind::InvalidPrimaryType { type_name } => {
                write!(f, "primary member must be a string, got {type_name}")
            }
            ErrorKind::InvalidLinksType { type_name } => {
                write!(f, "links member must be of type Links, got {type_name}")
            }
            ErrorKind::InvalidRelationshipType { type_name } => {
                write!(f, "relationship member must reference records, got {type_name}")
            }
            ErrorKind::DuplicatePrimary { resource_type } => {
                write!(f, "more than one primary member (first declared `{resource_type}`)")
            }
            ErrorKind::MissingPrimary { type_name } => {
                write!(f, "{type_name} has no primary member")
            }
            ErrorKind::EmptyId => write!(f, "resource id must not be empty"),
            ErrorKind::EmptyType => write!(f, "resource type must not be empty"),
            ErrorKind::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            ErrorKind::NumberOutOfRange { value, target_type } => {
                write!(f, "number `{value}` out of range for {target_type}")
            }
            ErrorKind::NotAnInteger { value, target_type } => {
                write!(f, "number `{value}` is not an integer, cannot assign to {target_type}")
            }
            ErrorKind::NonFiniteFloat => write!(f, "non-finite float cannot be encoded"),
            ErrorKind::InvalidId { id, target_type } => {
                write!(f, "resource id `{id}` is not a valid {target_type}")
            }
            ErrorKind::Codec(e) => write!(f, "codec error: {e}"),
            ErrorKind::Decode(e) => write!(f, "decode error: {e}"),
            ErrorKind::Encode(e) => write!(f, "encode error: {e}"),
            ErrorKind::DataAndErrors => {
                write!(f, "document must not contain both data and errors")
            }
            ErrorKind::MissingData => write!(f, "document has no data"),
            ErrorKind::ErrorDocument(errors) => {
                write!(f, "document contains {} error object(s)", errors.len())
            }
        }
    }
}

impl ErrorKind {
    /// Get an error code for this kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::NilValue => "jsonapi::nil_value",
            ErrorKind::MissingTag => "jsonapi::missing_tag",
            ErrorKind::MalformedTag { .. } => "jsonapi::malformed_tag",
            ErrorKind::UnknownMemberKind { .. } => "jsonapi::unknown_member_kind",
            ErrorKind::UnsupportedType { .. } => "jsonapi::unsupported_type",
            ErrorKind::InvalidPrimaryType { .. } => "jsonapi::invalid_primary_type",
            ErrorKind::InvalidLinksType { .. } => "jsonapi::invalid_links_type",
            ErrorKind::InvalidRelationshipType { .. } => "jsonapi::invalid_relationship_type",
            ErrorKind::DuplicatePrimary { .. } => "jsonapi::duplicate_primary",
            ErrorKind::MissingPrimary { .. } => "jsonapi::missing_primary",
            ErrorKind::EmptyId => "jsonapi::empty_id",
            ErrorKind::EmptyType => "jsonapi::empty_type",
            ErrorKind::TypeMismatch { .. } => "jsonapi::type_mismatch",
            ErrorKind::NumberOutOfRange { .. } => "jsonapi::number_out_of_range",
            ErrorKind::NotAnInteger { .. } => "jsonapi::not_an_integer",
            ErrorKind::NonFiniteFloat => "jsonapi::non_finite_float",
            ErrorKind::InvalidId { .. } => "jsonapi::invalid_id",
            ErrorKind::Codec(_) => "jsonapi::codec",
            ErrorKind::Decode(_) => "jsonapi::decode",
            ErrorKind::Encode(_) => "jsonapi::encode",
            ErrorKind::DataAndErrors => "jsonapi::data_and_errors",
            ErrorKind::MissingData => "jsonapi::missing_data",
            ErrorKind::ErrorDocument(_) => "jsonapi::error_document",
        }
    }
}

/// Failure reported by a user-registered codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecError {
    message: String,
}

impl CodecError {
    /// Create a codec error with a message
    pub fn new(message: impl Into<String>) -> Self {
        CodecError {
            message: message.into(),
        }
    }

    /// The message the codec reported
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CodecError {}

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        CodecError::new(e.to_string())
    }
}

impl From<CodecError> for JsonApiError {
    fn from(e: CodecError) -> Self {
        JsonApiError::new(ErrorKind::Codec(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemberKind;

    #[test]
    fn path_is_kept_from_the_innermost_site() {
        let err = JsonApiError::new(ErrorKind::EmptyId)
            .at("author.id")
            .at("author");
        assert_eq!(err.path.as_deref(), Some("author.id"));
        assert_eq!(err.to_string(), "resource id must not be empty (at `author.id`)");
    }

    #[test]
    fn error_object_carries_code_and_pointer() {
        let member = FieldPath {
            kind: MemberKind::Attribute,
            segments: vec!["stats", "page/views"],
        };
        let err = JsonApiError::new(ErrorKind::TypeMismatch {
            expected: "bool",
            got: "string",
        })
        .at_member(&member);
        assert_eq!(err.path.as_deref(), Some("stats.page/views"));

        let obj = err.to_error_object(400);
        assert_eq!(obj.status.as_deref(), Some("400"));
        assert_eq!(obj.code.as_deref(), Some("jsonapi::type_mismatch"));
        assert_eq!(
            obj.source.as_ref().and_then(|s| s.get("pointer")).map(String::as_str),
            Some("/data/attributes/stats/page~1views")
        );
    }

    #[test]
    fn pointer_follows_the_outermost_member() {
        let inner = FieldPath {
            kind: MemberKind::Attribute,
            segments: vec!["name"],
        };
        let outer = FieldPath {
            kind: MemberKind::Relationship,
            segments: vec!["author"],
        };
        let err = JsonApiError::new(ErrorKind::EmptyId)
            .at_member(&inner)
            .at_member(&outer)
            .in_element(2);
        assert_eq!(err.path.as_deref(), Some("name"));
        assert_eq!(err.pointer.as_deref(), Some("/data/2/relationships/author"));
    }

    #[test]
    fn errors_without_a_member_have_no_source() {
        let err = JsonApiError::new(ErrorKind::NilValue).at("broken");
        assert!(err.to_error_object(500).source.is_none());
    }
}

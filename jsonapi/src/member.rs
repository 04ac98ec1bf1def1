//! Parsing of `"<kind>,<name>"` member annotations.

use core::fmt;

use crate::{ErrorKind, JsonApiError};

/// Which part of a resource object a field maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// The field supplies the resource id; the member name is the resource type
    Primary,
    /// The field is serialized under `attributes`
    Attribute,
    /// The field is serialized under the resource's `meta`
    Meta,
    /// The field holds the resource's `links`
    Links,
    /// The field references other records
    Relationship,
}

impl MemberKind {
    /// The annotation token for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            MemberKind::Primary => "primary",
            MemberKind::Attribute => "attribute",
            MemberKind::Meta => "meta",
            MemberKind::Links => "links",
            MemberKind::Relationship => "relationship",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "primary" => MemberKind::Primary,
            "attribute" => MemberKind::Attribute,
            "meta" => MemberKind::Meta,
            "links" => MemberKind::Links,
            "relationship" => MemberKind::Relationship,
            _ => return None,
        })
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed member annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member<'a> {
    /// The member kind
    pub kind: MemberKind,
    /// The member name (resource type for primary members)
    pub name: &'a str,
}

impl<'a> Member<'a> {
    /// Parse an annotation of the form `"<kind>,<name>"`.
    ///
    /// ```
    /// use jsonapi::{Member, MemberKind};
    ///
    /// let member = Member::parse("attribute,title").unwrap();
    /// assert_eq!(member.kind, MemberKind::Attribute);
    /// assert_eq!(member.name, "title");
    /// ```
    pub fn parse(tag: &'a str) -> Result<Self, JsonApiError> {
        if tag.is_empty() {
            return Err(ErrorKind::MissingTag.into());
        }
        let mut parts = tag.split(',');
        let (Some(kind), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ErrorKind::MalformedTag {
                tag: tag.to_string(),
            }
            .into());
        };
        let kind = MemberKind::from_token(kind).ok_or_else(|| ErrorKind::UnknownMemberKind {
            kind: kind.to_string(),
        })?;
        Ok(Member { kind, name })
    }
}

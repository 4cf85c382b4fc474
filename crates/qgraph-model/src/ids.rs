#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Token used in place of an identifier that sanitizes to nothing.
pub const UNSPECIFIED: &str = "UNSPECIFIED";

/// Stable identifier of a graph node.
///
/// Identifiers are derived from natural keys by the normalizer; this type
/// only guarantees that the value is non-empty and trimmed.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyIdentifier);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wraps an already sanitized slug. Blank input becomes [`UNSPECIFIED`].
    pub fn from_slug(slug: impl Into<String>) -> Self {
        Self::new(slug).unwrap_or_else(|_| Self(UNSPECIFIED.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_identifiers() {
        assert_eq!(NodeId::new("   "), Err(ModelError::EmptyIdentifier));
    }

    #[test]
    fn trims_identifiers() {
        let id = NodeId::new(" SUB-OS ").unwrap();
        assert_eq!(id.as_str(), "SUB-OS");
        assert_eq!(id.to_string(), "SUB-OS");
    }

    #[test]
    fn from_slug_falls_back_to_sentinel() {
        assert_eq!(NodeId::from_slug("").as_str(), UNSPECIFIED);
        assert_eq!(NodeId::from_slug("P-2014-CS").as_str(), "P-2014-CS");
    }

    #[test]
    fn serde_rejects_empty_strings() {
        let parsed: Result<NodeId, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
        let parsed: NodeId = serde_json::from_str("\"CH-TREES\"").unwrap();
        assert_eq!(parsed.as_str(), "CH-TREES");
    }
}

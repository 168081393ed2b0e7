//! Participant identity label.
//!
//! [`Identity`] is a newtype wrapper around the free-form display name a
//! participant supplies at join time. It is the only notion of "who" in the
//! gateway: it keys the recipient registry, names bidders and chat authors,
//! and is echoed in notifications. Labels are not authenticated.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GatewayError;

/// Longest label accepted at join time, in characters.
pub const MAX_IDENTITY_LEN: usize = 64;

/// Display-name label identifying a participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Creates an `Identity` from a raw label without validation.
    ///
    /// Used for labels that originate on the server side (tests, fallbacks).
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Parses a client-supplied label, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the trimmed label is empty
    /// or longer than [`MAX_IDENTITY_LEN`] characters.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "username cannot be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_IDENTITY_LEN {
            return Err(GatewayError::InvalidRequest(format!(
                "username longer than {MAX_IDENTITY_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let Ok(id) = Identity::parse("  alice ") else {
            panic!("valid label");
        };
        assert_eq!(id.as_str(), "alice");
    }

    #[test]
    fn parse_rejects_blank_label() {
        assert!(Identity::parse("   ").is_err());
    }

    #[test]
    fn parse_rejects_overlong_label() {
        let long = "x".repeat(MAX_IDENTITY_LEN + 1);
        assert!(Identity::parse(&long).is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Identity::new("bob")).unwrap_or_default();
        assert_eq!(json, "\"bob\"");
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = Identity::new("carol");
        let mut map = HashMap::new();
        map.insert(id.clone(), "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }
}

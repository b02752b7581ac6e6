//! Validated identifier (de)serialization.

use serde::{Deserialize, Serialize};

/// An identifier that matches `^[a-z][a-z0-9-]*$`.
///
/// Used for application names and component IDs, which share the same
/// naming rule across the descriptor and the synthesized manifest.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NameId(String);

impl NameId {
    /// Validate and wrap a name. Exposed for callers outside serde's `TryFrom`.
    pub fn parse(name: impl Into<String>) -> Result<Self, String> {
        Self::try_from(name.into())
    }
}

impl std::fmt::Display for NameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NameId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<NameId> for String {
    fn from(value: NameId) -> Self {
        value.0
    }
}

impl TryFrom<String> for NameId {
    type Error = String;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        let mut chars = id.chars();
        let first = chars
            .next()
            .ok_or_else(|| "must not be empty".to_string())?;
        if !first.is_ascii_lowercase() {
            return Err(format!(
                "must start with a lowercase ASCII letter; got {first:?}"
            ));
        }
        for ch in chars {
            if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-') {
                return Err(format!(
                    "must contain only lowercase letters, digits, and '-'; got {ch:?}"
                ));
            }
        }
        Ok(Self(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_names() {
        for name in ["a", "my-app", "tool1", "a1-b2-c3"] {
            NameId::parse(name).unwrap();
        }
    }

    #[test]
    fn rejects_invalid_names() {
        for name in ["", "Abc", "1abc", "-abc", "has space", "has_underscore"] {
            assert!(NameId::parse(name).is_err(), "{name:?} should be invalid");
        }
    }
}

use serde::{Deserialize, Serialize};

/// Represents a version integer field with a const value, e.g. the manifest's
/// `ftl_manifest_version = 1` header.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(into = "usize", try_from = "usize")]
pub struct FixedVersion<const V: usize>;

impl<const V: usize> From<FixedVersion<V>> for usize {
    fn from(_: FixedVersion<V>) -> usize {
        V
    }
}

impl<const V: usize> TryFrom<usize> for FixedVersion<V> {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if value != V {
            return Err(format!("invalid manifest version {value} != {V}"));
        }
        Ok(Self)
    }
}

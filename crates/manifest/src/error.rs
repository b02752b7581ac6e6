//! Manifest synthesis errors

/// Synthesis errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Synthesis is pure and total on a validated [`ftl_descriptor::Application`];
    /// reaching this variant means an internal invariant was violated.
    #[error("synthesis bug: {0}")]
    SynthesisBug(String),

    /// TOML serialization of an otherwise-valid manifest failed.
    #[error("error serializing manifest: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

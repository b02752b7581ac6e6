//! Descriptor validation errors

/// The on-disk format a descriptor was read from, used for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    /// YAML (`ftl.yaml` / `ftl.yml`)
    Yaml,
    /// JSON (`ftl.json`)
    Json,
}

impl std::fmt::Display for DescriptorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// Descriptor validation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The descriptor is not well-formed YAML or JSON.
    #[error("invalid {format} syntax: {detail}")]
    InvalidSyntax {
        /// The format the descriptor was parsed as
        format: DescriptorFormat,
        /// The underlying parser's message
        detail: String,
    },

    /// The descriptor parses but does not match the application schema.
    #[error("invalid descriptor at `{path}`: {reason}")]
    InvalidSchema {
        /// Dotted/indexed path to the offending value, e.g. `components[2].source`
        path: String,
        /// Human-readable explanation
        reason: String,
    },

    /// `access` and `auth` are inconsistent with each other.
    #[error("inconsistent access configuration: {0}")]
    InconsistentAccess(String),
}

//! OCI artifact pipeline errors

/// OCI artifact pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied string is not a valid `<registry>/<package>:<version>` reference.
    #[error("invalid OCI reference `{0}`: {1}")]
    InvalidRef(String, String),

    /// A local file expected to exist (the `.wasm` to push, or a cache entry) was not found.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// A registry call failed in a way expected to be transient (network error, 5xx, rate limit).
    #[error("transient registry error: {0}")]
    RegistryTransient(String),

    /// A registry call failed authentication or authorization.
    #[error("registry authentication failed: {0}")]
    RegistryAuth(String),

    /// A pulled manifest did not match the single-layer Wasm artifact shape this pipeline expects.
    #[error("unexpected manifest shape: {0}")]
    BadManifest(String),

    /// Local I/O failure (cache write, temp file, directory creation).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a transient class, i.e. worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::RegistryTransient(_))
    }
}

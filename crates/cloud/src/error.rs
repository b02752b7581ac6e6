//! Control-plane client errors

/// Control-plane client errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A 4xx response, deserialized from the control plane's `{code, message}` error envelope.
    #[error("control plane rejected the request ({code}): {message}")]
    ControlPlaneError {
        /// Machine-readable error code
        code: String,
        /// Human-readable message
        message: String,
    },

    /// A 5xx response or network failure; safe to retry with backoff.
    #[error("transient control plane error: {0}")]
    ControlPlaneTransient(String),
}

impl Error {
    /// Whether this error is worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::ControlPlaneTransient(_))
    }
}

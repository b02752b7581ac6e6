//! Credential broker errors

/// Credential broker errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The control plane's ECR token blob could not be decoded into `AWS:<password>`.
    #[error("malformed ECR token: {0}")]
    BadECRToken(String),

    /// The OAuth2 client-credentials exchange failed.
    #[error("credential exchange failed (status {status}): {detail}")]
    AuthExchange {
        /// HTTP status returned by the token endpoint
        status: u16,
        /// Response body or transport error detail
        detail: String,
    },

    /// Transport failure reaching the token endpoint.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

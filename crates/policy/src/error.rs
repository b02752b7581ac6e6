//! Policy generation errors

/// Policy generation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied [`crate::Context`] cannot produce a policy for the
    /// requested access mode (e.g. `private` with no allowed subjects).
    #[error("cannot build a `{mode}` policy: {reason}")]
    InvalidPolicyContext {
        /// The access mode that was requested
        mode: &'static str,
        /// Why the context is insufficient
        reason: String,
    },
}

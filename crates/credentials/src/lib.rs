//! Resolves deployment push credentials: ECR tokens from the control plane,
//! and generic bearer tokens via OAuth2 client-credentials or a
//! pre-generated machine-to-machine token.

#![deny(missing_docs)]

mod bearer;
mod ecr;
mod error;

pub use bearer::{acquire_bearer_token, BearerSource};
pub use ecr::{decode_ecr_token, RegistryCredentials};
pub use error::Error;

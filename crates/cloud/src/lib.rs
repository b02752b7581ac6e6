//! Client for the FTL control plane: application and deployment
//! lifecycle, push-credential issuance, and deployment status polling.

#![deny(missing_docs)]

mod client;
mod error;
mod model;

pub use client::{new_idempotency_key, Client};
pub use error::Error;
pub use model::{
    App, CreateDeploymentResponse, DeploymentState, DeploymentStatus, EcrTokenResponse,
    PushCredentials,
};

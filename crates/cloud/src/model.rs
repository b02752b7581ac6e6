//! Wire types for the control-plane REST surface.

use serde::{Deserialize, Serialize};

/// An application registered with the control plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    /// Control-plane-assigned application id.
    pub id: String,
    /// Application name.
    pub name: String,
    /// Gateway access mode, as a lowercase string (`public`, `private`, `org`, `custom`).
    pub access: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateAppRequest<'a> {
    pub name: &'a str,
    pub access: &'a str,
    pub auth: Option<&'a serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateAppResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateDeploymentRequest<'a> {
    pub manifest_toml: &'a str,
    pub metadata: &'a serde_json::Value,
}

/// The control plane's response to creating a deployment: where to push
/// artifacts and what deployment to poll.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeploymentResponse {
    /// Control-plane-assigned deployment id.
    pub deployment_id: String,
    /// Scoped push credentials for this deployment.
    pub push_credentials: PushCredentials,
    /// Namespace prefix artifacts must be pushed under.
    pub package_namespace: String,
}

/// Scoped registry push credentials, typically an ECR token.
#[derive(Debug, Clone, Deserialize)]
pub struct PushCredentials {
    /// Registry host to push to.
    pub registry: String,
    /// Opaque base64 ECR token; decode with `ftl_credentials::decode_ecr_token`.
    pub ecr_token: String,
}

/// A deployment's terminal or in-progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    /// Deployment accepted, not yet terminal.
    Pending,
    /// Deployment is live and serving traffic.
    Ready,
    /// Deployment failed.
    Failed,
    /// Deployment was cancelled.
    Cancelled,
}

impl DeploymentState {
    /// Whether this state ends polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed | Self::Cancelled)
    }
}

/// Current status of a deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentStatus {
    /// Current state.
    pub status: DeploymentState,
    /// Public URL, once `ready`.
    pub url: Option<String>,
    /// URI to fetch deployment logs from, if available.
    pub logs_uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EcrTokenRequest<'a> {
    pub package_namespace: &'a str,
}

/// A short-lived ECR push token.
#[derive(Debug, Clone, Deserialize)]
pub struct EcrTokenResponse {
    /// Registry host the token is scoped to.
    pub registry: String,
    /// Opaque base64 token.
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub code: String,
    pub message: String,
}

//! Deployment lifecycle state.

/// Where a deployment run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    /// Not yet started.
    Init,
    /// Running local component builds.
    Building,
    /// Requesting push credentials from the control plane.
    AcquiringCreds,
    /// Pushing built/local artifacts to the registry.
    Pushing,
    /// Generating the policy and running the synthesis engine.
    Synthesizing,
    /// Submitting the manifest to the control plane.
    Submitting,
    /// Waiting for the deployment to reach a terminal state.
    Polling,
    /// The deployment is live.
    Ready,
    /// The deployment failed.
    Failed,
    /// The deployment was cancelled, or polling exceeded its ceiling.
    Cancelled,
}

impl DeploymentState {
    /// Whether this state ends the run; no further stage transitions occur.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed | Self::Cancelled)
    }
}

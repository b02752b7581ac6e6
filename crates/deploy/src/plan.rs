//! The dry-run deployment plan: what would happen without pushing anything
//! to a registry or submitting to the control plane.

/// What will happen to a single component during a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentAction {
    /// Built locally, then pushed.
    Build {
        /// Source directory the build command runs against.
        source: String,
    },
    /// Already a local `.wasm` file, pushed as-is.
    Push {
        /// Path to the `.wasm` file.
        path: String,
    },
    /// Already published; referenced, not pushed.
    Pull {
        /// The existing registry reference.
        reference: String,
    },
}

/// Per-component action plus the full action list, reported before any
/// side-effecting work happens (`dry-run` mode) or alongside it (`live`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    /// Component id paired with what will be done for it.
    pub components: Vec<(String, ComponentAction)>,
}

impl DeploymentPlan {
    /// Human-readable one-line-per-component summary.
    pub fn describe(&self) -> String {
        self.components
            .iter()
            .map(|(id, action)| match action {
                ComponentAction::Build { source } => format!("{id}: build from {source}"),
                ComponentAction::Push { path } => format!("{id}: push {path}"),
                ComponentAction::Pull { reference } => format!("{id}: reference {reference}"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

//! `ftl synth` — synthesize the runtime manifest for a descriptor without
//! building, pushing, or deploying anything.

use std::path::PathBuf;

use clap::Parser;

use ftl_manifest::{DeploymentContext, PlatformOverrides};
use ftl_policy::{ActorType, Context as PolicyContext};

use crate::commands::{apply_variable_overrides, load_application, CommandError};

/// Synthesize the runtime manifest TOML for a descriptor and print it (or
/// write it to `--out`).
#[derive(Parser, Debug)]
#[clap(about = "Synthesize the runtime manifest for an FTL application")]
pub struct SynthCommand {
    /// Path to the descriptor or the directory containing it.
    #[clap(short = 'f', long = "file", default_value = ".")]
    pub file: PathBuf,

    /// Write the manifest to this path instead of stdout.
    #[clap(long = "out")]
    pub out: Option<PathBuf>,

    /// Override or add an application-level variable (`key=value`), repeatable.
    #[clap(long = "var")]
    pub vars: Vec<String>,

    /// Registry host the gateway component is published under.
    #[clap(long, env = "FTL_GATEWAY_REGISTRY")]
    pub gateway_registry: String,
    /// Gateway package path.
    #[clap(long, env = "FTL_GATEWAY_PACKAGE")]
    pub gateway_package: String,
    /// Gateway version to pin.
    #[clap(long, env = "FTL_GATEWAY_VERSION")]
    pub gateway_version: String,
    /// Registry host the authorizer component is published under.
    #[clap(long, env = "FTL_AUTHORIZER_REGISTRY")]
    pub authorizer_registry: String,
    /// Authorizer package path.
    #[clap(long, env = "FTL_AUTHORIZER_PACKAGE")]
    pub authorizer_package: String,
    /// Authorizer version to pin.
    #[clap(long, env = "FTL_AUTHORIZER_VERSION")]
    pub authorizer_version: String,

    /// Subject identifier of whoever would own a `private` deployment.
    #[clap(long)]
    pub owner_subject: Option<String>,
    /// WorkOS organization id, for `org` access mode.
    #[clap(long)]
    pub org_id: Option<String>,
}

impl SynthCommand {
    /// Run the command.
    pub fn run(self) -> Result<(), CommandError> {
        let mut app = load_application(&self.file)?;
        apply_variable_overrides(&mut app, &self.vars)?;

        let policy_ctx = PolicyContext {
            owner_subject: self.owner_subject.clone(),
            org_id: self.org_id.clone(),
            org_members: Vec::new(),
            actor_type: Some(ActorType::User),
        };
        let policy_outcome = ftl_policy::generate(app.access, &policy_ctx)
            .map_err(|e| CommandError::new(1, e.into()))?;
        let policy = match policy_outcome {
            ftl_policy::Outcome::Generated(policy) => Some(policy),
            ftl_policy::Outcome::PassThrough | ftl_policy::Outcome::None => None,
        };

        let overrides = PlatformOverrides {
            gateway_registry: self.gateway_registry,
            gateway_package: self.gateway_package,
            gateway_version: self.gateway_version,
            authorizer_registry: self.authorizer_registry,
            authorizer_package: self.authorizer_package,
            authorizer_version: self.authorizer_version,
            policy,
            deployment_context: DeploymentContext {
                actor_type: Some(ActorType::User),
                org_id: self.org_id,
                forward_claims: Default::default(),
            },
        };

        let (manifest_toml, meta) = ftl_manifest::synthesize(&app, &overrides)
            .map_err(|e| CommandError::new(1, e.into()))?;

        match &self.out {
            Some(path) => std::fs::write(path, &manifest_toml)
                .map_err(|e| CommandError::new(1, anyhow::anyhow!("writing {}: {e}", path.display())))?,
            None => print!("{manifest_toml}"),
        }

        terminal::step!(
            "Synthesized",
            "{} component(s), access {:?}",
            meta.component_count,
            meta.access_mode
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(dir: &std::path::Path, out: PathBuf) -> SynthCommand {
        SynthCommand {
            file: dir.to_owned(),
            out: Some(out),
            vars: vec!["greeting=hello".to_string()],
            gateway_registry: "ghcr.io".to_string(),
            gateway_package: "ftl/gateway".to_string(),
            gateway_version: "1.0.0".to_string(),
            authorizer_registry: "ghcr.io".to_string(),
            authorizer_package: "ftl/authorizer".to_string(),
            authorizer_version: "1.0.0".to_string(),
            owner_subject: None,
            org_id: None,
        }
    }

    #[test]
    fn writes_manifest_with_variable_overrides_to_the_out_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ftl.yaml"),
            "name: my-app\ncomponents:\n  - id: tool1\n    source: tool1.wasm\n",
        )
        .unwrap();
        let out = dir.path().join("manifest.toml");

        command(dir.path(), out.clone()).run().unwrap();

        let manifest = std::fs::read_to_string(&out).unwrap();
        assert!(manifest.contains("tool1"));
    }
}

//! `ftl deploy` — build, push, and submit an application for activation, or
//! (`--dry-run`) just report what would happen.

use std::path::PathBuf;

use clap::Parser;

use ftl_credentials::BearerSource;
use ftl_deploy::{ActorIdentity, DeployRequest, DeploymentMode, DeploymentState, PlatformConfig};
use ftl_policy::ActorType;

use crate::commands::{apply_variable_overrides, load_application, CommandError};

/// Deploy an application descriptor to the FTL control plane.
#[derive(Parser, Debug)]
#[clap(about = "Deploy an FTL application")]
pub struct DeployCommand {
    /// Path to the descriptor or the directory containing it.
    #[clap(short = 'f', long = "file", default_value = ".")]
    pub file: PathBuf,

    /// Directory local component sources are resolved relative to.
    #[clap(long = "base-dir", default_value = ".")]
    pub base_dir: PathBuf,

    /// Override or add an application-level variable (`key=value`), repeatable.
    #[clap(long = "var")]
    pub vars: Vec<String>,

    /// Compute and print the plan and manifest without building, pushing,
    /// or submitting anything.
    #[clap(long)]
    pub dry_run: bool,

    /// Base URL of the control plane, e.g. `https://api.ftl.dev`.
    #[clap(long, env = "FTL_CONTROL_PLANE_URL")]
    pub control_plane_url: String,

    /// Root directory for the content-addressed artifact cache. Defaults to
    /// the platform data directory.
    #[clap(long)]
    pub cache_dir: Option<PathBuf>,

    /// A pre-generated control-plane bearer token.
    #[clap(long, env = "M2M_TOKEN")]
    pub m2m_token: Option<String>,
    /// OAuth2 client id, used with `--client-secret` to obtain a bearer token.
    #[clap(long, env = "CLIENT_ID")]
    pub client_id: Option<String>,
    /// OAuth2 client secret.
    #[clap(long, env = "CLIENT_SECRET")]
    pub client_secret: Option<String>,
    /// OAuth2 token endpoint, required when authenticating with client credentials.
    #[clap(long, env = "FTL_TOKEN_URL")]
    pub token_url: Option<String>,

    /// Subject identifier (JWT `sub`) of the deploying actor.
    #[clap(long)]
    pub actor_subject: String,
    /// Whether the deploying actor is a service account rather than a human.
    #[clap(long)]
    pub actor_machine: bool,
    /// Subjects belonging to the actor's organization, for `org` access mode.
    #[clap(long = "org-member")]
    pub org_members: Vec<String>,

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
}

impl DeployCommand {
    /// Run the command.
    pub async fn run(self) -> Result<(), CommandError> {
        let mut app = load_application(&self.file)?;
        apply_variable_overrides(&mut app, &self.vars)?;

        let bearer_source = self.bearer_source()?;
        let http = reqwest::Client::new();
        let token = ftl_credentials::acquire_bearer_token(&http, &bearer_source)
            .await
            .map_err(|e| CommandError::new(3, e.into()))?;

        let cloud = ftl_cloud::Client::new(self.control_plane_url.clone(), token);

        let cache_root = match self.cache_dir {
            Some(dir) => dir,
            None => ftl_common::data_dir::data_dir()
                .map(|dir| dir.join("cache"))
                .map_err(|e| CommandError::new(4, e))?,
        };
        tracing::debug!(cache_root = %ftl_common::ui::quoted_path(&cache_root), "resolved artifact cache");

        let mode = if self.dry_run {
            DeploymentMode::DryRun
        } else {
            DeploymentMode::Live
        };

        let req = DeployRequest {
            app,
            base_dir: self.base_dir,
            mode,
            platform: PlatformConfig {
                gateway_registry: self.gateway_registry,
                gateway_package: self.gateway_package,
                gateway_version: self.gateway_version,
                authorizer_registry: self.authorizer_registry,
                authorizer_package: self.authorizer_package,
                authorizer_version: self.authorizer_version,
            },
            actor: ActorIdentity {
                subject: self.actor_subject,
                actor_type: if self.actor_machine {
                    ActorType::Machine
                } else {
                    ActorType::User
                },
                org_members: self.org_members,
            },
        };

        let _sloth = ftl_common::sloth::warn_if_slothful(
            30_000,
            "Still deploying; this is taking a while...".to_string(),
        );
        let outcome = ftl_deploy::deploy(req, &cloud, cache_root)
            .await
            .map_err(classify_deploy_error)?;
        drop(_sloth);

        if self.dry_run {
            terminal::step!("Plan", "\n{}", outcome.plan.describe());
            print!("{}", outcome.manifest_toml);
            return Ok(());
        }

        match outcome.state {
            DeploymentState::Ready => {
                terminal::step!(
                    "Deployed",
                    "{}",
                    outcome.url.as_deref().unwrap_or("(no URL reported)")
                );
                Ok(())
            }
            DeploymentState::Failed => Err(CommandError::new(
                4,
                anyhow::anyhow!("deployment {:?} reported a failed state", outcome.deployment_id),
            )),
            DeploymentState::Cancelled => Err(CommandError::new(
                5,
                anyhow::anyhow!("deployment {:?} was cancelled", outcome.deployment_id),
            )),
            other => Err(CommandError::new(
                4,
                anyhow::anyhow!("deployment ended in unexpected state {other:?}"),
            )),
        }
    }

    fn bearer_source(&self) -> Result<BearerSource, CommandError> {
        if let Some(token) = &self.m2m_token {
            return Ok(BearerSource::Preset(token.clone()));
        }
        match (&self.client_id, &self.client_secret, &self.token_url) {
            (Some(client_id), Some(client_secret), Some(token_url)) => {
                Ok(BearerSource::ClientCredentials {
                    token_url: token_url.clone(),
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                })
            }
            _ => Err(CommandError::new(
                3,
                anyhow::anyhow!(
                    "no credentials given: set M2M_TOKEN, or all of CLIENT_ID/CLIENT_SECRET/--token-url"
                ),
            )),
        }
    }
}

/// Map a deployment failure to the exit code its root cause belongs to.
fn classify_deploy_error(error: anyhow::Error) -> CommandError {
    for cause in error.chain() {
        if cause.downcast_ref::<ftl_descriptor::Error>().is_some() {
            return CommandError::new(1, error);
        }
        if cause.downcast_ref::<ftl_build::Error>().is_some() {
            return CommandError::new(2, error);
        }
        if cause.downcast_ref::<ftl_oci::Error>().is_some()
            || cause.downcast_ref::<ftl_credentials::Error>().is_some()
        {
            return CommandError::new(3, error);
        }
        if cause.downcast_ref::<ftl_cloud::Error>().is_some() {
            return CommandError::new(4, error);
        }
    }
    // The orchestrator's poll-ceiling `bail!` has no typed error of its own.
    if error.to_string().contains("did not reach a terminal state") {
        return CommandError::new(5, error);
    }
    CommandError::new(1, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> DeployCommand {
        DeployCommand {
            file: PathBuf::from("."),
            base_dir: PathBuf::from("."),
            vars: Vec::new(),
            dry_run: false,
            control_plane_url: "https://api.ftl.dev".to_string(),
            cache_dir: None,
            m2m_token: None,
            client_id: None,
            client_secret: None,
            token_url: None,
            actor_subject: "user_1".to_string(),
            actor_machine: false,
            org_members: Vec::new(),
            gateway_registry: "ghcr.io".to_string(),
            gateway_package: "ftl/gateway".to_string(),
            gateway_version: "1.0.0".to_string(),
            authorizer_registry: "ghcr.io".to_string(),
            authorizer_package: "ftl/authorizer".to_string(),
            authorizer_version: "1.0.0".to_string(),
        }
    }

    #[test]
    fn bearer_source_prefers_a_preset_token_over_client_credentials() {
        let mut cmd = command();
        cmd.m2m_token = Some("tok".to_string());
        cmd.client_id = Some("id".to_string());
        cmd.client_secret = Some("secret".to_string());
        cmd.token_url = Some("https://auth.example/token".to_string());

        assert!(matches!(cmd.bearer_source().unwrap(), BearerSource::Preset(t) if t == "tok"));
    }

    #[test]
    fn bearer_source_requires_all_three_client_credentials_fields() {
        let mut cmd = command();
        cmd.client_id = Some("id".to_string());
        // client_secret and token_url left unset.

        let err = cmd.bearer_source().unwrap_err();
        assert_eq!(err.code, 3);
    }

    #[test]
    fn classify_deploy_error_maps_known_causes_to_their_exit_codes() {
        let descriptor_err = anyhow::Error::new(ftl_descriptor::Error::InvalidSchema {
            path: "$.name".to_string(),
            reason: "bad".to_string(),
        });
        assert_eq!(classify_deploy_error(descriptor_err).code, 1);

        let cloud_err = anyhow::Error::new(ftl_cloud::Error::ControlPlaneTransient(
            "503 from control plane".to_string(),
        ));
        assert_eq!(classify_deploy_error(cloud_err).code, 4);
    }

    #[test]
    fn classify_deploy_error_falls_back_to_the_poll_ceiling_message() {
        let err = anyhow::anyhow!(
            "deployment dep_1 did not reach a terminal state within the polling ceiling"
        );
        assert_eq!(classify_deploy_error(err).code, 5);
    }
}

//! Drives the full deployment pipeline: partition components, build local
//! ones in parallel, acquire push credentials, push artifacts with retry,
//! rewrite the application to registry sources, generate a policy,
//! synthesize the runtime manifest, submit it, and poll until terminal.

#![deny(missing_docs)]

mod plan;
mod retry;
mod state;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use ftl_descriptor::{Application, AuthConfig as DescriptorAuth, Component, ComponentSource};
use ftl_manifest::{synthesize, DeploymentContext as ManifestDeploymentContext, PlatformOverrides};
use ftl_policy::{ActorType, Context as PolicyContext, Outcome as PolicyOutcome, Policy};

pub use plan::{ComponentAction, DeploymentPlan};
pub use retry::RetryConfig;
pub use state::DeploymentState;

/// Whether to run the full pipeline or stop after synthesis and report a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Compute the plan and the manifest; never push or submit.
    DryRun,
    /// Run the full pipeline end to end.
    Live,
}

/// Platform-controlled gateway/authorizer coordinates, supplied by the
/// deployment target rather than the application descriptor.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Registry host the gateway component is published under.
    pub gateway_registry: String,
    /// Gateway package path.
    pub gateway_package: String,
    /// Gateway version to pin.
    pub gateway_version: String,
    /// Registry host the authorizer component is published under.
    pub authorizer_registry: String,
    /// Authorizer package path.
    pub authorizer_package: String,
    /// Authorizer version to pin.
    pub authorizer_version: String,
}

/// Identity of whoever is running the deployment, used to fill in the
/// policy context for `private`/`org` access modes.
#[derive(Debug, Clone)]
pub struct ActorIdentity {
    /// The actor's subject identifier (JWT `sub`).
    pub subject: String,
    /// Human vs. service account.
    pub actor_type: ActorType,
    /// Subjects belonging to the actor's organization, for `org` access mode.
    pub org_members: Vec<String>,
}

/// Everything the orchestrator needs to run a deployment.
pub struct DeployRequest {
    /// The validated application to deploy.
    pub app: Application,
    /// Directory the descriptor was loaded from; local component sources
    /// are resolved relative to it.
    pub base_dir: PathBuf,
    /// Dry-run or live.
    pub mode: DeploymentMode,
    /// Gateway/authorizer platform coordinates.
    pub platform: PlatformConfig,
    /// Who is deploying.
    pub actor: ActorIdentity,
}

/// The result of running a deployment to completion, or to its dry-run stop point.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    /// Final lifecycle state reached.
    pub state: DeploymentState,
    /// The synthesized manifest TOML.
    pub manifest_toml: String,
    /// What was (or would be) done per component.
    pub plan: DeploymentPlan,
    /// Public URL, once `ready`. Never set in dry-run mode.
    pub url: Option<String>,
    /// Control-plane deployment id. Never set in dry-run mode.
    pub deployment_id: Option<String>,
}

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const POLL_CEILING: Duration = Duration::from_secs(5 * 60);

/// Run a deployment: in [`DeploymentMode::DryRun`], stop once the manifest
/// and plan are computed; in [`DeploymentMode::Live`], drive the pipeline
/// through to a terminal deployment state.
pub async fn deploy(
    req: DeployRequest,
    cloud: &ftl_cloud::Client,
    oci_cache_root: PathBuf,
) -> Result<DeployOutcome> {
    let mut state = DeploymentState::Init;
    tracing::debug!(?state, "starting deployment");

    let (local, remote) = partition_components(&req.app);
    let plan = build_plan(&local, &remote);
    let policy = generate_policy(&req.app, &req.actor).context("policy generation failed")?;

    if req.mode == DeploymentMode::DryRun {
        state = DeploymentState::Synthesizing;
        let overrides = assemble_overrides(&req.app, &req.platform, &req.actor, policy);
        let (manifest_toml, _meta) =
            synthesize(&req.app, &overrides).context("synthesis failed")?;
        return Ok(DeployOutcome {
            state,
            manifest_toml,
            plan,
            url: None,
            deployment_id: None,
        });
    }

    state = DeploymentState::Building;
    tracing::info!(?state, components = local.len(), "building local components");
    let built = build_local_components(&local, &req.base_dir)
        .await
        .with_context(|| format!("build phase failed (state: {state:?})"))?;

    state = DeploymentState::AcquiringCreds;
    let app_id = ensure_app(cloud, &req.app)
        .await
        .with_context(|| format!("could not register application (state: {state:?})"))?;

    tracing::info!(?state, app_id, "acquiring push credentials");
    let ecr = cloud
        .ecr_token(&app_id)
        .await
        .with_context(|| format!("could not acquire push credentials (state: {state:?})"))?;
    let creds = ftl_credentials::decode_ecr_token(&ecr.registry, &ecr.token)
        .context("control plane returned an invalid push token")?;

    let mut oci_client = ftl_oci::Client::new(oci_cache_root)
        .await
        .context("could not initialize the artifact client")?;
    oci_client
        .login(&creds.registry, &creds.username, &creds.password)
        .await
        .context("could not persist push credentials")?;

    state = DeploymentState::Pushing;
    tracing::info!(?state, "pushing artifacts");
    let pushed = push_components(
        &mut oci_client,
        &local,
        &built,
        &creds.registry,
        &app_id,
        &req.app.version,
    )
    .await
    .with_context(|| format!("push phase failed (state: {state:?})"))?;

    let rewritten = rewrite_application(&req.app, &pushed);
    let overrides = assemble_overrides(&rewritten, &req.platform, &req.actor, policy);

    state = DeploymentState::Synthesizing;
    tracing::info!(?state, "synthesizing manifest");
    let (manifest_toml, _meta) =
        synthesize(&rewritten, &overrides).context("synthesis failed")?;

    state = DeploymentState::Submitting;
    tracing::info!(?state, app_id, "submitting deployment");
    let metadata = serde_json::json!({ "actor": req.actor.subject });
    let idempotency_key = ftl_cloud::new_idempotency_key();
    let created = cloud
        .create_deployment(&app_id, &manifest_toml, &metadata, &idempotency_key)
        .await
        .with_context(|| format!("could not submit deployment (state: {state:?})"))?;

    state = DeploymentState::Polling;
    tracing::info!(?state, deployment_id = %created.deployment_id, "polling for a terminal status");
    let final_status = poll_until_terminal(cloud, &created.deployment_id).await?;
    let state = match final_status.status {
        ftl_cloud::DeploymentState::Ready => DeploymentState::Ready,
        ftl_cloud::DeploymentState::Failed => DeploymentState::Failed,
        ftl_cloud::DeploymentState::Cancelled => DeploymentState::Cancelled,
        ftl_cloud::DeploymentState::Pending => DeploymentState::Cancelled,
    };
    tracing::info!(?state, "deployment reached a terminal state");

    Ok(DeployOutcome {
        state,
        manifest_toml,
        plan,
        url: final_status.url,
        deployment_id: Some(created.deployment_id),
    })
}

fn partition_components(app: &Application) -> (Vec<&Component>, Vec<&Component>) {
    app.components
        .iter()
        .partition(|c| matches!(c.source, ComponentSource::Local(_)))
}

fn build_plan(local: &[&Component], remote: &[&Component]) -> DeploymentPlan {
    let mut components = Vec::with_capacity(local.len() + remote.len());
    for c in local {
        let path = match &c.source {
            ComponentSource::Local(path) => path.clone(),
            ComponentSource::Registry { .. } => unreachable!("partitioned as local"),
        };
        let action = if path.ends_with(".wasm") {
            ComponentAction::Push { path }
        } else {
            ComponentAction::Build { source: path }
        };
        components.push((c.id.to_string(), action));
    }
    for c in remote {
        if let ComponentSource::Registry {
            registry,
            package,
            version,
        } = &c.source
        {
            components.push((
                c.id.to_string(),
                ComponentAction::Pull {
                    reference: format!("{registry}/{package}:{version}"),
                },
            ));
        }
    }
    DeploymentPlan { components }
}

async fn build_local_components(
    local: &[&Component],
    base_dir: &Path,
) -> Result<HashMap<String, PathBuf>> {
    let limit = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let semaphore = Arc::new(Semaphore::new(limit));
    let mut set = JoinSet::new();

    for c in local {
        let id = c.id.to_string();
        let source_rel = match &c.source {
            ComponentSource::Local(path) => path.clone(),
            ComponentSource::Registry { .. } => unreachable!("partitioned as local"),
        };
        let source_path = base_dir.join(&source_rel);
        let (command, workdir) = match &c.build {
            Some(b) => (b.command.clone(), b.workdir.clone()),
            None => (None, None),
        };
        let sem = semaphore.clone();
        set.spawn(async move {
            let _permit = sem.acquire_owned().await.expect("semaphore never closed");
            tokio::task::spawn_blocking(move || {
                let workdir_path = workdir.as_deref().map(Path::new);
                ftl_build::build_component(&id, &source_path, command.as_deref(), workdir_path)
                    .map(|path| (id, path))
            })
            .await
            .expect("build task panicked")
        });
    }

    let mut results = HashMap::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok((id, path))) => {
                results.insert(id, path);
            }
            Ok(Err(e)) => {
                set.abort_all();
                return Err(e).context("component build failed");
            }
            Err(join_err) => {
                set.abort_all();
                bail!("build task panicked or was cancelled: {join_err}");
            }
        }
    }
    Ok(results)
}

/// Requests per-deployment push credentials scoped to `app_id`, the agreed
/// stand-in for the platform-provided package namespace (the namespace is
/// treated opaquely; using the application id keeps references stable
/// across deployments of the same application).
async fn push_components(
    oci_client: &mut ftl_oci::Client,
    local: &[&Component],
    built: &HashMap<String, PathBuf>,
    registry: &str,
    app_id: &str,
    app_version: &str,
) -> Result<HashMap<String, ComponentSource>> {
    let mut pushed = HashMap::new();
    for c in local {
        let id = c.id.to_string();
        let wasm_path = built
            .get(&id)
            .ok_or_else(|| anyhow::anyhow!("component `{id}` has no build output"))?;
        let reference = format!("{registry}/{app_id}/{id}:{app_version}");

        retry::retry_with_backoff(
            RetryConfig::default(),
            ftl_oci::Error::is_transient,
            || oci_client.push(wasm_path, &reference),
        )
        .await
        .with_context(|| format!("failed to push component `{id}`"))?;

        pushed.insert(
            id,
            ComponentSource::Registry {
                registry: registry.to_owned(),
                package: format!("{app_id}/{}", c.id),
                version: app_version.to_owned(),
            },
        );
    }
    Ok(pushed)
}

fn rewrite_application(app: &Application, pushed: &HashMap<String, ComponentSource>) -> Application {
    let mut rewritten = app.clone();
    for component in &mut rewritten.components {
        let id = component.id.to_string();
        if let Some(source) = pushed.get(&id) {
            component.source = source.clone();
        }
    }
    rewritten
}

fn generate_policy(app: &Application, actor: &ActorIdentity) -> Result<Option<Policy>> {
    let ctx = PolicyContext {
        owner_subject: Some(actor.subject.clone()),
        org_id: workos_org_id(app),
        org_members: actor.org_members.clone(),
        actor_type: Some(actor.actor_type),
    };
    match ftl_policy::generate(app.access, &ctx)? {
        PolicyOutcome::Generated(p) => Ok(Some(p)),
        PolicyOutcome::PassThrough => {
            let (source, data) = match &app.auth {
                Some(DescriptorAuth::Custom {
                    policy,
                    policy_data,
                    ..
                }) => (
                    policy.clone().unwrap_or_default(),
                    policy_data.clone().unwrap_or(serde_json::Value::Null),
                ),
                _ => bail!("custom access mode requires an inline auth.policy"),
            };
            Ok(Some(Policy { source, data }))
        }
        PolicyOutcome::None => Ok(None),
    }
}

fn workos_org_id(app: &Application) -> Option<String> {
    match &app.auth {
        Some(DescriptorAuth::Workos { org_id, .. }) => Some(org_id.clone()),
        _ => None,
    }
}

fn assemble_overrides(
    app: &Application,
    platform: &PlatformConfig,
    actor: &ActorIdentity,
    policy: Option<Policy>,
) -> PlatformOverrides {
    PlatformOverrides {
        gateway_registry: platform.gateway_registry.clone(),
        gateway_package: platform.gateway_package.clone(),
        gateway_version: platform.gateway_version.clone(),
        authorizer_registry: platform.authorizer_registry.clone(),
        authorizer_package: platform.authorizer_package.clone(),
        authorizer_version: platform.authorizer_version.clone(),
        policy,
        deployment_context: ManifestDeploymentContext {
            actor_type: Some(actor.actor_type),
            org_id: workos_org_id(app),
            forward_claims: Default::default(),
        },
    }
}

async fn ensure_app(cloud: &ftl_cloud::Client, app: &Application) -> Result<String> {
    let name = app.name.to_string();
    let access = access_str(app.access);
    let existing = cloud.list_apps().await.context("could not list apps")?;
    if let Some(found) = existing.into_iter().find(|a| a.name == name) {
        return Ok(found.id);
    }
    let auth_json = app.auth.as_ref().map(auth_to_json);
    cloud
        .create_app(&name, access, auth_json.as_ref())
        .await
        .context("could not create app")
}

fn access_str(access: ftl_descriptor::AccessMode) -> &'static str {
    match access {
        ftl_descriptor::AccessMode::Public => "public",
        ftl_descriptor::AccessMode::Private => "private",
        ftl_descriptor::AccessMode::Org => "org",
        ftl_descriptor::AccessMode::Custom => "custom",
    }
}

fn auth_to_json(auth: &DescriptorAuth) -> serde_json::Value {
    match auth {
        DescriptorAuth::Workos {
            org_id,
            jwt_issuer,
            jwt_audience,
        } => serde_json::json!({
            "provider": "workos",
            "org_id": org_id,
            "jwt_issuer": jwt_issuer,
            "jwt_audience": jwt_audience,
        }),
        DescriptorAuth::Custom {
            jwt_issuer,
            jwt_audience,
            jwt_jwks_uri,
            ..
        } => serde_json::json!({
            "provider": "custom",
            "jwt_issuer": jwt_issuer,
            "jwt_audience": jwt_audience,
            "jwt_jwks_uri": jwt_jwks_uri,
        }),
    }
}

async fn poll_until_terminal(
    cloud: &ftl_cloud::Client,
    deployment_id: &str,
) -> Result<ftl_cloud::DeploymentStatus> {
    let start = Instant::now();
    loop {
        let status = cloud
            .get_deployment(deployment_id)
            .await
            .context("could not fetch deployment status")?;
        if status.status.is_terminal() {
            return Ok(status);
        }
        if start.elapsed() >= POLL_CEILING {
            bail!("deployment {deployment_id} did not reach a terminal state within the polling ceiling");
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftl_descriptor::{BuildConfig, ComponentSource as DescSource};

    fn sample_app() -> Application {
        Application {
            name: ftl_serde::NameId::parse("my-app").unwrap(),
            version: "1.0.0".to_owned(),
            description: None,
            access: ftl_descriptor::AccessMode::Private,
            auth: None,
            components: vec![
                Component {
                    id: ftl_serde::NameId::parse("tool1").unwrap(),
                    source: DescSource::Local("./tool1".to_owned()),
                    build: Some(BuildConfig {
                        command: Some("cargo build".to_owned()),
                        workdir: None,
                        watch: vec![],
                    }),
                    variables: Default::default(),
                },
                Component {
                    id: ftl_serde::NameId::parse("tool2").unwrap(),
                    source: DescSource::Registry {
                        registry: "ghcr.io".to_owned(),
                        package: "acme/tool2".to_owned(),
                        version: "2.0.0".to_owned(),
                    },
                    build: None,
                    variables: Default::default(),
                },
            ],
            variables: Default::default(),
        }
    }

    #[test]
    fn partitions_local_and_remote_components() {
        let app = sample_app();
        let (local, remote) = partition_components(&app);
        assert_eq!(local.len(), 1);
        assert_eq!(remote.len(), 1);
        assert_eq!(local[0].id.to_string(), "tool1");
        assert_eq!(remote[0].id.to_string(), "tool2");
    }

    #[test]
    fn plan_classifies_build_vs_pull() {
        let app = sample_app();
        let (local, remote) = partition_components(&app);
        let plan = build_plan(&local, &remote);
        assert_eq!(
            plan.components[0],
            (
                "tool1".to_owned(),
                ComponentAction::Build {
                    source: "./tool1".to_owned()
                }
            )
        );
        assert_eq!(
            plan.components[1],
            (
                "tool2".to_owned(),
                ComponentAction::Pull {
                    reference: "ghcr.io/acme/tool2:2.0.0".to_owned()
                }
            )
        );
    }

    #[test]
    fn plan_classifies_prebuilt_wasm_as_push() {
        let mut app = sample_app();
        app.components[0].source = DescSource::Local("./tool1.wasm".to_owned());
        let (local, remote) = partition_components(&app);
        let plan = build_plan(&local, &remote);
        assert_eq!(
            plan.components[0],
            (
                "tool1".to_owned(),
                ComponentAction::Push {
                    path: "./tool1.wasm".to_owned()
                }
            )
        );
    }

    #[test]
    fn generate_policy_private_uses_actor_subject_as_owner() {
        let app = sample_app();
        let actor = ActorIdentity {
            subject: "user_42".to_owned(),
            actor_type: ActorType::User,
            org_members: vec![],
        };
        let policy = generate_policy(&app, &actor).unwrap().unwrap();
        assert_eq!(policy.data, serde_json::json!({ "owner": "user_42" }));
    }

    #[test]
    fn generate_policy_public_has_none() {
        let mut app = sample_app();
        app.access = ftl_descriptor::AccessMode::Public;
        let actor = ActorIdentity {
            subject: "user_42".to_owned(),
            actor_type: ActorType::User,
            org_members: vec![],
        };
        assert!(generate_policy(&app, &actor).unwrap().is_none());
    }

    #[test]
    fn rewrite_application_replaces_only_pushed_local_sources() {
        let app = sample_app();
        let mut pushed = HashMap::new();
        pushed.insert(
            "tool1".to_owned(),
            ComponentSource::Registry {
                registry: "ghcr.io".to_owned(),
                package: "my-app/tool1".to_owned(),
                version: "1.0.0".to_owned(),
            },
        );
        let rewritten = rewrite_application(&app, &pushed);
        assert_eq!(
            rewritten.components[0].source,
            ComponentSource::Registry {
                registry: "ghcr.io".to_owned(),
                package: "my-app/tool1".to_owned(),
                version: "1.0.0".to_owned(),
            }
        );
        assert_eq!(rewritten.components[1].source, app.components[1].source);
    }
}

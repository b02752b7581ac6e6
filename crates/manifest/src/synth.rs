//! Synthesis: typed [`Application`] + [`PlatformOverrides`] → runtime manifest TOML.

use indexmap::IndexMap;

use ftl_descriptor::{AccessMode, Application, AuthConfig, ComponentSource as DescriptorSource};
use ftl_policy::{ActorType, Policy};

use crate::error::Error;
use crate::schema::{
    ApplicationSection, ComponentBuildConfig, ComponentManifest, ComponentSource, HttpTrigger,
    Manifest, Route, TriggerSection,
};

/// The stable component id the gateway is injected under.
pub const GATEWAY_COMPONENT_ID: &str = "mcp-gateway";
/// The stable component id the authorizer is injected under.
pub const AUTHORIZER_COMPONENT_ID: &str = "mcp-authorizer";

/// Platform-controlled values folded into synthesis, sourced from the
/// deployment orchestrator rather than the descriptor.
#[derive(Debug, Clone)]
pub struct PlatformOverrides {
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
    /// Generated or pass-through authorization policy, when `access` needs one.
    pub policy: Option<Policy>,
    /// Context describing who is deploying.
    pub deployment_context: DeploymentContext,
}

/// Context about the actor performing the deployment, threaded through to the
/// authorizer's variables where applicable.
#[derive(Debug, Clone, Default)]
pub struct DeploymentContext {
    /// Whether the deploying actor is a human or a service account.
    pub actor_type: Option<ActorType>,
    /// The organization the actor belongs to, if any.
    pub org_id: Option<String>,
    /// Claims forwarded from the actor's token. Carried as metadata only;
    /// not currently surfaced as a manifest variable.
    pub forward_claims: IndexMap<String, String>,
}

/// A record of what synthesis did, returned alongside the manifest TOML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisMetadata {
    /// Application name.
    pub app_name: String,
    /// Application version.
    pub app_version: String,
    /// Number of user-declared components (excludes the injected gateway/authorizer).
    pub component_count: usize,
    /// The application's gateway access mode.
    pub access_mode: AccessModeTag,
    /// Whether a gateway component was injected. Always `true`.
    pub injected_gateway: bool,
    /// Whether an authorizer component was injected.
    pub injected_authorizer: bool,
    /// Number of subjects folded into the generated policy's data, if any.
    pub subjects_injected: usize,
}

/// A serialization-friendly mirror of [`ftl_descriptor::AccessMode`], so
/// [`SynthesisMetadata`] does not need to depend on descriptor internals
/// beyond this one enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessModeTag {
    /// No authentication required.
    Public,
    /// Authenticated, any accepted identity.
    Private,
    /// Authenticated, restricted to a WorkOS organization.
    Org,
    /// Authenticated, restricted by a user-supplied policy.
    Custom,
}

impl From<AccessMode> for AccessModeTag {
    fn from(mode: AccessMode) -> Self {
        match mode {
            AccessMode::Public => Self::Public,
            AccessMode::Private => Self::Private,
            AccessMode::Org => Self::Org,
            AccessMode::Custom => Self::Custom,
        }
    }
}

/// Synthesize the runtime manifest TOML and accompanying metadata for `app`.
pub fn synthesize(
    app: &Application,
    overrides: &PlatformOverrides,
) -> Result<(String, SynthesisMetadata), Error> {
    let needs_authorizer = app.access != AccessMode::Public;

    let mut components: IndexMap<String, ComponentManifest> = IndexMap::new();
    let mut user_ids = Vec::with_capacity(app.components.len());

    for component in &app.components {
        let id = component.id.to_string();
        let source = match &component.source {
            DescriptorSource::Local(path) => ComponentSource::Local(path.clone()),
            DescriptorSource::Registry {
                registry,
                package,
                version,
            } => ComponentSource::Registry {
                registry: registry.clone(),
                package: package.clone(),
                version: version.clone(),
            },
        };
        let build = match (&component.source, &component.build) {
            (DescriptorSource::Local(_), Some(build)) => {
                build.command.as_ref().map(|command| ComponentBuildConfig {
                    command: command.clone(),
                    workdir: build.workdir.clone(),
                })
            }
            _ => None,
        };
        let mut variables: IndexMap<String, String> = app
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        variables.sort_keys();
        for (k, v) in &component.variables {
            variables.insert(k.clone(), v.clone());
        }

        if components
            .insert(
                id.clone(),
                ComponentManifest {
                    source,
                    allowed_outbound_hosts: Vec::new(),
                    variables,
                    build,
                },
            )
            .is_some()
        {
            return Err(Error::SynthesisBug(format!(
                "duplicate component id `{id}` reached synthesis unvalidated"
            )));
        }
        user_ids.push(id);
    }
    let component_count = components.len();

    let mut gateway_variables = IndexMap::new();
    if !user_ids.is_empty() {
        gateway_variables.insert("component_names".to_owned(), user_ids.join(","));
    }
    components.insert(
        GATEWAY_COMPONENT_ID.to_owned(),
        ComponentManifest {
            source: ComponentSource::Registry {
                registry: overrides.gateway_registry.clone(),
                package: overrides.gateway_package.clone(),
                version: overrides.gateway_version.clone(),
            },
            allowed_outbound_hosts: vec!["http://*.spin.internal".to_owned()],
            variables: gateway_variables,
            build: None,
        },
    );

    let mut subjects_injected = 0usize;
    if needs_authorizer {
        let mut authorizer_variables = IndexMap::new();
        authorizer_variables.insert(
            "mcp_gateway_url".to_owned(),
            "http://mcp-gateway.spin.internal".to_owned(),
        );
        if let Some(auth) = &app.auth {
            let (jwt_issuer, jwt_audience) = match auth {
                AuthConfig::Workos {
                    jwt_issuer,
                    jwt_audience,
                    ..
                } => (jwt_issuer.clone(), jwt_audience.clone()),
                AuthConfig::Custom {
                    jwt_issuer,
                    jwt_audience,
                    ..
                } => (jwt_issuer.clone(), Some(jwt_audience.clone())),
            };
            authorizer_variables.insert("mcp_jwt_issuer".to_owned(), jwt_issuer);
            if let Some(audience) = jwt_audience {
                authorizer_variables.insert("mcp_jwt_audience".to_owned(), audience);
            }
        }
        if let Some(policy) = &overrides.policy {
            authorizer_variables.insert("mcp_policy".to_owned(), policy.source.clone());
            authorizer_variables.insert(
                "mcp_policy_data".to_owned(),
                serde_json::to_string(&policy.data).map_err(|e| {
                    Error::SynthesisBug(format!("policy data is not serializable: {e}"))
                })?,
            );
            subjects_injected = match policy.data.get("members").and_then(|v| v.as_array()) {
                Some(members) => members.len(),
                None if policy.data.get("owner").is_some() => 1,
                None => 0,
            };
        }
        components.insert(
            AUTHORIZER_COMPONENT_ID.to_owned(),
            ComponentManifest {
                source: ComponentSource::Registry {
                    registry: overrides.authorizer_registry.clone(),
                    package: overrides.authorizer_package.clone(),
                    version: overrides.authorizer_version.clone(),
                },
                allowed_outbound_hosts: vec![
                    "http://*.spin.internal".to_owned(),
                    "https://*.authkit.app".to_owned(),
                    "https://*.workos.com".to_owned(),
                ],
                variables: authorizer_variables,
                build: None,
            },
        );
    }

    let mut http_triggers = Vec::new();
    if needs_authorizer {
        http_triggers.push(HttpTrigger {
            route: Route::wildcard(),
            component: AUTHORIZER_COMPONENT_ID.to_owned(),
        });
        http_triggers.push(HttpTrigger {
            route: Route::private(),
            component: GATEWAY_COMPONENT_ID.to_owned(),
        });
    } else {
        http_triggers.push(HttpTrigger {
            route: Route::wildcard(),
            component: GATEWAY_COMPONENT_ID.to_owned(),
        });
    }
    for id in &user_ids {
        http_triggers.push(HttpTrigger {
            route: Route::private(),
            component: id.clone(),
        });
    }

    let manifest = Manifest {
        ftl_manifest_version: Default::default(),
        application: ApplicationSection {
            name: app.name.to_string(),
            version: app.version.clone(),
        },
        components,
        trigger: TriggerSection { http: http_triggers },
    };

    let toml = toml::to_string(&manifest)?;

    let metadata = SynthesisMetadata {
        app_name: app.name.to_string(),
        app_version: app.version.clone(),
        component_count,
        access_mode: app.access.into(),
        injected_gateway: true,
        injected_authorizer: needs_authorizer,
        subjects_injected,
    };

    Ok((toml, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftl_descriptor::{Component, ComponentSource as DescSource};

    fn app(access: AccessMode, auth: Option<AuthConfig>) -> Application {
        Application {
            name: ftl_serde::NameId::parse("my-app").unwrap(),
            version: "1.0.0".to_owned(),
            description: None,
            access,
            auth,
            components: vec![Component {
                id: ftl_serde::NameId::parse("tool1").unwrap(),
                source: DescSource::Local("tool1.wasm".to_owned()),
                build: None,
                variables: Default::default(),
            }],
            variables: Default::default(),
        }
    }

    fn overrides(policy: Option<Policy>) -> PlatformOverrides {
        PlatformOverrides {
            gateway_registry: "ghcr.io".to_owned(),
            gateway_package: "ftl/gateway".to_owned(),
            gateway_version: "1.0.0".to_owned(),
            authorizer_registry: "ghcr.io".to_owned(),
            authorizer_package: "ftl/authorizer".to_owned(),
            authorizer_version: "1.0.0".to_owned(),
            policy,
            deployment_context: DeploymentContext::default(),
        }
    }

    #[test]
    fn public_app_has_no_authorizer() {
        let app = app(AccessMode::Public, None);
        let (toml, meta) = synthesize(&app, &overrides(None)).unwrap();
        assert!(!meta.injected_authorizer);
        assert!(meta.injected_gateway);
        assert!(toml.contains("[component.mcp-gateway]"));
        assert!(!toml.contains("mcp-authorizer"));
        assert!(toml.contains("route = \"/...\""));
    }

    #[test]
    fn private_app_injects_authorizer_and_policy() {
        let policy = Policy {
            source: "package mcp.authorization\n".to_owned(),
            data: serde_json::json!({ "owner": "u1" }),
        };
        let app = app(AccessMode::Private, None);
        let (toml, meta) = synthesize(&app, &overrides(Some(policy))).unwrap();
        assert!(meta.injected_authorizer);
        assert_eq!(meta.subjects_injected, 1);
        assert!(toml.contains("[component.mcp-authorizer]"));
        assert!(toml.contains("mcp_policy"));
    }

    #[test]
    fn component_order_is_declaration_order() {
        let mut app = app(AccessMode::Public, None);
        app.components.push(Component {
            id: ftl_serde::NameId::parse("tool0").unwrap(),
            source: DescSource::Local("tool0.wasm".to_owned()),
            build: None,
            variables: Default::default(),
        });
        let (toml, _) = synthesize(&app, &overrides(None)).unwrap();
        let tool1_pos = toml.find("[component.tool1]").unwrap();
        let tool0_pos = toml.find("[component.tool0]").unwrap();
        assert!(tool1_pos < tool0_pos);
    }

    #[test]
    fn private_routes_emitted_per_user_component() {
        let app = app(AccessMode::Public, None);
        let (toml, _) = synthesize(&app, &overrides(None)).unwrap();
        assert!(toml.contains("component = \"tool1\""));
    }
}

//! The runtime manifest schema (TOML wire format).
//!
//! Consumers of the target runtime depend on these exact key names:
//! `[component.<id>]`, `[[trigger.http]]`, `source`, `allowed_outbound_hosts`,
//! `variables`, `route`, and the private-route form `route = { private = true }`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use ftl_serde::FixedVersion;

/// The runtime manifest, the synthesis engine's sole output shape.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Manifest schema version. Always `1`.
    pub ftl_manifest_version: FixedVersion<1>,

    /// Global application metadata.
    pub application: ApplicationSection,

    /// Components, keyed by id, in declaration/injection order.
    #[serde(rename = "component")]
    pub components: IndexMap<String, ComponentManifest>,

    /// Trigger configuration, by trigger type.
    pub trigger: TriggerSection,
}

/// Application-level metadata carried into the runtime manifest.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationSection {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
}

/// A single component's runtime configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentManifest {
    /// Where the component's Wasm module comes from.
    pub source: ComponentSource,

    /// Outbound hosts this component may reach. Empty for user components
    /// unless the descriptor grows an explicit allowlist in the future.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_outbound_hosts: Vec<String>,

    /// Runtime variables visible to the component.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, String>,

    /// Build configuration, present only for locally-sourced components
    /// with an explicit build command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<ComponentBuildConfig>,
}

/// Where a component's Wasm module is loaded from, as written to the wire manifest.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentSource {
    /// A bare path, resolved relative to the manifest.
    Local(String),
    /// A published registry reference.
    Registry {
        /// Registry host.
        registry: String,
        /// Package path within the registry.
        package: String,
        /// Published version.
        version: String,
    },
}

/// Build configuration recorded on a component, for tooling that re-runs builds
/// from the synthesized manifest rather than the original descriptor.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentBuildConfig {
    /// Literal build command.
    pub command: String,
    /// Working directory the command runs in, relative to the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
}

/// Trigger configuration, by trigger type.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerSection {
    /// HTTP triggers, routing incoming requests to components.
    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "http")]
    pub http: Vec<HttpTrigger>,
}

/// A single HTTP trigger binding a route to a component.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpTrigger {
    /// The route this trigger matches.
    pub route: Route,
    /// The component invoked for matching requests.
    pub component: String,
}

/// An HTTP trigger's route.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Route {
    /// A literal path pattern, e.g. the public wildcard `/...`.
    Path(String),
    /// A private route, reachable only from other components in the application.
    Private {
        /// Always `true`; the field's presence is what marks the route private.
        private: bool,
    },
}

impl Route {
    /// The public wildcard route.
    pub fn wildcard() -> Self {
        Self::Path("/...".to_owned())
    }

    /// A private, intra-application-only route.
    pub fn private() -> Self {
        Self::Private { private: true }
    }
}

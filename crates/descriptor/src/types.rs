//! Typed application descriptor schema

use std::collections::HashMap;

use ftl_serde::NameId;

/// An application descriptor: the top-level `ftl.yaml` / `ftl.json` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    /// Application name, used as the default push namespace segment.
    pub name: NameId,
    /// Semver application version.
    pub version: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Who may reach the deployed gateway.
    pub access: AccessMode,
    /// Auth configuration. Required when `access` is `Org` or `Custom`.
    pub auth: Option<AuthConfig>,
    /// Components, in descriptor order. IDs are unique within an application.
    pub components: Vec<Component>,
    /// Application-level variable defaults, inherited by components.
    pub variables: HashMap<String, String>,
}

impl Application {
    /// The default application version when none is given.
    pub const DEFAULT_VERSION: &'static str = "0.1.0";
}

/// Gateway access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// No authentication required.
    #[default]
    Public,
    /// Authenticated, any identity accepted by the issuer.
    Private,
    /// Authenticated, restricted to a WorkOS organization.
    Org,
    /// Authenticated, restricted by a user-supplied policy.
    Custom,
}

/// A single component within an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Component ID, unique within the application.
    pub id: NameId,
    /// Where the component's Wasm binary comes from.
    pub source: ComponentSource,
    /// Build configuration. Absent for registry-sourced components.
    pub build: Option<BuildConfig>,
    /// Component-level variable defaults, override application-level ones.
    pub variables: HashMap<String, String>,
}

/// Where a component's Wasm binary comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSource {
    /// A path to a local `.wasm` file, relative to the descriptor.
    Local(String),
    /// A published artifact in an OCI registry.
    Registry {
        /// Registry host, e.g. `ghcr.io`.
        registry: String,
        /// Package path within the registry, e.g. `acme/tool`.
        package: String,
        /// Semver version of the published artifact.
        version: String,
    },
}

/// How to build a local component's Wasm binary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildConfig {
    /// Shell command to run. When absent, the builder picks a per-language default.
    pub command: Option<String>,
    /// Directory the build command runs in, relative to the descriptor. Defaults to ".".
    pub workdir: Option<String>,
    /// File glob patterns watched for rebuild triggers. Metadata only; never
    /// interpreted by this implementation.
    pub watch: Vec<String>,
}

/// Authentication configuration, keyed by provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// WorkOS-backed authentication, scoped to one organization.
    Workos {
        /// WorkOS organization ID.
        org_id: String,
        /// JWT issuer URL. Defaults to `https://api.workos.com`.
        jwt_issuer: String,
        /// Expected JWT audience, if the issuer requires one.
        jwt_audience: Option<String>,
    },
    /// A caller-operated OIDC-compatible issuer.
    Custom {
        /// JWT issuer URL.
        jwt_issuer: String,
        /// Expected JWT audience. Mandatory for a custom issuer, unlike
        /// `Workos::jwt_audience`.
        jwt_audience: String,
        /// JWKS URI, if it cannot be discovered from the issuer's well-known document.
        jwt_jwks_uri: Option<String>,
        /// Inline Rego policy text overriding the generated default.
        policy: Option<String>,
        /// Data bound to `policy`, passed through to the authorizer unmodified.
        policy_data: Option<serde_json::Value>,
    },
}

impl AuthConfig {
    /// The default WorkOS JWT issuer.
    pub const DEFAULT_WORKOS_ISSUER: &'static str = "https://api.workos.com";
}

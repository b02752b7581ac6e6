//! Runtime manifest schema and the synthesis engine that produces it.
//!
//! Synthesis takes a validated [`ftl_descriptor::Application`] plus
//! platform-controlled [`PlatformOverrides`] and produces the TOML manifest
//! the target runtime loads, injecting a gateway component (always) and an
//! authorizer component (whenever the application is not public).

#![deny(missing_docs)]

mod error;
pub mod schema;
mod synth;

pub use error::Error;
pub use synth::{
    synthesize, AccessModeTag, DeploymentContext, PlatformOverrides, SynthesisMetadata,
    AUTHORIZER_COMPONENT_ID, GATEWAY_COMPONENT_ID,
};

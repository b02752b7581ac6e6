//! Application descriptor schema, parsing, and validation.
//!
//! An FTL application descriptor (`ftl.yaml`/`ftl.yml`/`ftl.json`) declares
//! an application's name, access policy, and components. This crate turns
//! descriptor bytes into a validated [`Application`] or a precise error
//! naming the offending field.

#![deny(missing_docs)]

mod error;
mod parse;
mod types;

pub use error::{DescriptorFormat, Error};
pub use parse::{from_json, from_yaml};
pub use types::{AccessMode, Application, AuthConfig, BuildConfig, Component, ComponentSource};

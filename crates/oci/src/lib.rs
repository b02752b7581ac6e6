//! Push and pull bare Wasm binaries as single-layer OCI artifacts, with a
//! content-addressed local cache for pulled bytes.

#![deny(missing_docs)]

mod auth;
mod cache;
mod client;
mod error;

pub use auth::AuthConfig;
pub use cache::Cache;
pub use client::{Client, WASM_CONFIG_MEDIA_TYPE, WASM_LAYER_MEDIA_TYPE};
pub use error::Error;

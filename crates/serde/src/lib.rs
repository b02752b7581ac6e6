//! Serde serialization helpers shared across FTL crates.

#![deny(missing_docs)]

pub mod id;
mod version;

pub use id::NameId;
pub use version::FixedVersion;

//! Library surface backing the `ftl` binary: one module per CLI subcommand,
//! each a thin wrapper over the `ftl-*` crates.

#![deny(missing_docs)]

pub mod commands;

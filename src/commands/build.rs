//! `ftl build` — build every local component's Wasm binary without pushing
//! or deploying anything.

use std::path::PathBuf;

use clap::Parser;

use ftl_descriptor::ComponentSource;

use crate::commands::{load_application, CommandError};

/// Build the local components declared in a descriptor.
#[derive(Parser, Debug)]
#[clap(about = "Build the local components of an FTL application")]
pub struct BuildCommand {
    /// Path to the descriptor or the directory containing it.
    #[clap(short = 'f', long = "file", default_value = ".")]
    pub file: PathBuf,

    /// Directory local component sources are resolved relative to.
    #[clap(long = "base-dir", default_value = ".")]
    pub base_dir: PathBuf,
}

impl BuildCommand {
    /// Run the command.
    pub fn run(self) -> Result<(), CommandError> {
        let app = load_application(&self.file)?;

        for component in &app.components {
            let ComponentSource::Local(source) = &component.source else {
                continue;
            };
            let source_dir = self.base_dir.join(source);
            let (command, workdir) = component
                .build
                .as_ref()
                .map(|b| (b.command.as_deref(), b.workdir.as_deref().map(PathBuf::from)))
                .unwrap_or((None, None));

            let _sloth = ftl_common::sloth::warn_if_slothful(
                10_000,
                format!("Still building {}; this is taking a while...", component.id),
            );
            let wasm = ftl_build::build_component(
                &component.id,
                &source_dir,
                command,
                workdir.as_deref(),
            )
            .map_err(|e| CommandError::new(2, e.into()))?;
            drop(_sloth);

            terminal::step!(
                "Built",
                "{} -> {}",
                component.id,
                ftl_common::ui::quoted_path(&wasm)
            );
        }

        Ok(())
    }
}

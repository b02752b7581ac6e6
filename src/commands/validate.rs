//! `ftl validate` — parse and validate an application descriptor.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::{load_application, CommandError};

/// Validate an application descriptor against the FTL schema.
#[derive(Parser, Debug)]
#[clap(about = "Validate an FTL application descriptor")]
pub struct ValidateCommand {
    /// Path to the descriptor or the directory containing it.
    #[clap(short = 'f', long = "file", default_value = ".")]
    pub file: PathBuf,
}

impl ValidateCommand {
    /// Run the command.
    pub fn run(self) -> Result<(), CommandError> {
        let app = load_application(&self.file)?;
        terminal::step!(
            "Valid",
            "{} v{} ({} component(s))",
            app.name.as_ref(),
            app.version,
            app.components.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ftl.yaml"),
            "name: my-app\ncomponents:\n  - id: tool1\n    source: tool1.wasm\n",
        )
        .unwrap();

        ValidateCommand {
            file: dir.path().to_owned(),
        }
        .run()
        .unwrap();
    }

    #[test]
    fn rejects_a_descriptor_with_an_invalid_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ftl.yaml"),
            "name: Not_Valid\ncomponents: []\n",
        )
        .unwrap();

        let err = ValidateCommand {
            file: dir.path().to_owned(),
        }
        .run()
        .unwrap_err();
        assert_eq!(err.code, 1);
    }
}

//! Language detection by marker file, and per-language default build commands.

use std::path::Path;

/// A source language, detected from a marker file in the component's source directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// `Cargo.toml` present.
    Rust,
    /// `pyproject.toml` present.
    Python,
    /// `go.mod` present.
    Go,
    /// `package.json` present.
    Node,
}

impl Language {
    /// Detect the language of the component rooted at `dir` by marker file.
    /// Checked in a fixed order so a directory with multiple markers still
    /// resolves deterministically.
    pub fn detect(dir: &Path) -> Option<Self> {
        const MARKERS: &[(&str, Language)] = &[
            ("Cargo.toml", Language::Rust),
            ("go.mod", Language::Go),
            ("pyproject.toml", Language::Python),
            ("package.json", Language::Node),
        ];
        MARKERS
            .iter()
            .find(|(marker, _)| dir.join(marker).is_file())
            .map(|(_, lang)| *lang)
    }

    /// The default build command for this language, given the component id.
    pub fn default_build_command(self, id: &str) -> String {
        match self {
            Language::Rust => "cargo build --target wasm32-wasip1 --release".to_owned(),
            Language::Go => format!("tinygo build -target=wasip1 -o {id}.wasm ."),
            Language::Python => format!("componentize-py componentize app -o {id}.wasm"),
            Language::Node => "npm run build".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_rust_by_cargo_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        assert_eq!(Language::detect(dir.path()), Some(Language::Rust));
    }

    #[test]
    fn detects_go_by_go_mod() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("go.mod"), "").unwrap();
        assert_eq!(Language::detect(dir.path()), Some(Language::Go));
    }

    #[test]
    fn no_marker_is_undetected() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Language::detect(dir.path()), None);
    }

    #[test]
    fn default_commands_embed_component_id() {
        assert!(Language::Go.default_build_command("tool1").contains("tool1.wasm"));
    }
}

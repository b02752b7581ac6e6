//! Commands for the FTL CLI.

/// Command for validating an application descriptor.
pub mod validate;
/// Command for synthesizing a runtime manifest from a descriptor.
pub mod synth;
/// Command for building local components.
pub mod build;
/// Command for running a full or dry-run deployment.
pub mod deploy;
/// Commands for managing registry credentials.
pub mod oci;

/// A command failure paired with the process exit code it maps to, per the
/// CLI's exit-code contract: `1` validation, `2` build, `3` artifact
/// push/pull, `4` control-plane, `5` timeout/cancelled.
pub struct CommandError {
    /// The exit code `main` should return for this failure.
    pub code: u8,
    /// The underlying error, printed to stderr.
    pub error: anyhow::Error,
}

impl CommandError {
    /// Wrap `error` with a fixed exit `code`.
    pub fn new(code: u8, error: anyhow::Error) -> Self {
        Self { code, error }
    }
}

impl std::fmt::Debug for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.error, f)
    }
}

/// Read and validate the descriptor at `path`, dispatching on its extension.
/// `path` may name the descriptor file directly or a directory containing
/// one of [`ftl_common::paths::DEFAULT_DESCRIPTOR_FILES`]. Any failure is a
/// validation failure (exit code `1`).
pub(crate) fn load_application(
    path: &std::path::Path,
) -> Result<ftl_descriptor::Application, CommandError> {
    let resolved = ftl_common::paths::resolve_descriptor_file_path(path)
        .map_err(|e| CommandError::new(1, e))?;
    let bytes = std::fs::read(&resolved).map_err(|e| {
        CommandError::new(1, anyhow::anyhow!("reading {}: {e}", ftl_common::ui::quoted_path(&resolved)))
    })?;
    let is_json = resolved.extension().is_some_and(|ext| ext == "json");
    let result = if is_json {
        ftl_descriptor::from_json(&bytes)
    } else {
        ftl_descriptor::from_yaml(&bytes)
    };
    result.map_err(|e| CommandError::new(1, e.into()))
}

/// Apply `--var key=value` overrides onto an application's top-level
/// variable defaults.
pub(crate) fn apply_variable_overrides(
    app: &mut ftl_descriptor::Application,
    vars: &[String],
) -> Result<(), CommandError> {
    for raw in vars {
        let (key, value) =
            ftl_common::arg_parser::parse_kv(raw).map_err(|e| CommandError::new(1, e))?;
        app.variables.insert(key, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_YAML: &str = "name: my-app\ncomponents:\n  - id: tool1\n    source: tool1.wasm\n";

    #[test]
    fn load_application_resolves_default_filename_in_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ftl.yaml"), MINIMAL_YAML).unwrap();

        let app = load_application(dir.path()).unwrap();
        assert_eq!(app.name.as_ref(), "my-app");
    }

    #[test]
    fn load_application_reads_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        std::fs::write(
            &path,
            r#"{"name":"my-app","components":[{"id":"tool1","source":"tool1.wasm"}]}"#,
        )
        .unwrap();

        let app = load_application(&path).unwrap();
        assert_eq!(app.name.as_ref(), "my-app");
    }

    #[test]
    fn load_application_reports_missing_descriptor_as_a_command_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_application(dir.path()).unwrap_err();
        assert_eq!(err.code, 1);
    }

    #[test]
    fn apply_variable_overrides_inserts_and_rejects_malformed_pairs() {
        let mut app = ftl_descriptor::from_yaml(MINIMAL_YAML.as_bytes()).unwrap();

        apply_variable_overrides(&mut app, &["greeting=hello".to_string()]).unwrap();
        assert_eq!(app.variables.get("greeting").map(String::as_str), Some("hello"));

        let err = apply_variable_overrides(&mut app, &["no-equals-sign".to_string()]).unwrap_err();
        assert_eq!(err.code, 1);
    }
}

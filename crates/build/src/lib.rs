//! Builds a component's Wasm binary from its local source directory.
//!
//! Language is detected by marker file (`Cargo.toml` ⇒ Rust, `go.mod` ⇒ Go,
//! `pyproject.toml` ⇒ Python, `package.json` ⇒ Node) when the descriptor does
//! not supply an explicit build command. After a successful build, the
//! produced `.wasm` is located by searching a fixed set of candidate paths.

#![deny(missing_docs)]

mod error;
mod language;

use std::path::{Path, PathBuf};

use subprocess::{Exec, Redirection};

pub use error::Error;
pub use language::Language;

const STDERR_TAIL_LINES: usize = 20;

/// Build the component `id` rooted at `source`, using `command`/`workdir`
/// from the descriptor if given, otherwise a per-language default. If
/// `source` already points at a `.wasm` file, it is returned unchanged and
/// no command is invoked.
pub fn build_component(
    id: &str,
    source: &Path,
    command: Option<&str>,
    workdir: Option<&Path>,
) -> Result<PathBuf, Error> {
    if source.extension().is_some_and(|ext| ext == "wasm") {
        return Ok(source.to_owned());
    }

    let cwd = match workdir {
        Some(wd) => source.join(wd),
        None => source.to_owned(),
    };

    let command = resolve_command(id, source, command)?;

    tracing::info!(component = id, command = %command, "running build command");

    let capture = Exec::shell(&command)
        .cwd(&cwd)
        .stdout(Redirection::None)
        .stderr(Redirection::Pipe)
        .capture()?;

    if !capture.exit_status.success() {
        return Err(Error::BuildExec {
            id: id.to_owned(),
            exit_code: exit_code_of(&capture.exit_status),
            stderr_tail: tail_lines(&capture.stderr_str(), STDERR_TAIL_LINES),
        });
    }

    locate_wasm(id, source)
}

fn resolve_command(id: &str, source: &Path, command: Option<&str>) -> Result<String, Error> {
    if let Some(command) = command {
        return Ok(command.to_owned());
    }
    Language::detect(source)
        .map(|lang| lang.default_build_command(id))
        .ok_or_else(|| Error::BuildExec {
            id: id.to_owned(),
            exit_code: None,
            stderr_tail: "no build command given and no recognized language marker found"
                .to_owned(),
        })
}

fn locate_wasm(id: &str, source: &Path) -> Result<PathBuf, Error> {
    let candidates = [
        source.join(format!("{id}.wasm")),
        source.join("dist").join(format!("{id}.wasm")),
        source
            .join("target/wasm32-wasip1/release")
            .join(format!("{id}.wasm")),
        source
            .join("target/wasm32-wasip2/release")
            .join(format!("{id}.wasm")),
    ];
    candidates
        .iter()
        .find(|path| path.is_file())
        .cloned()
        .ok_or_else(|| Error::WasmNotFound {
            id: id.to_owned(),
            searched_paths: candidates.iter().map(|p| p.display().to_string()).collect(),
        })
}

fn exit_code_of(status: &subprocess::ExitStatus) -> Option<i32> {
    match status {
        subprocess::ExitStatus::Exited(code) => Some(*code as i32),
        subprocess::ExitStatus::Other(code) => Some(*code),
        subprocess::ExitStatus::Signaled(_) | subprocess::ExitStatus::Undetermined => None,
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasm_source_skips_build() {
        let dir = tempfile::tempdir().unwrap();
        let wasm = dir.path().join("tool1.wasm");
        std::fs::write(&wasm, b"").unwrap();
        let result = build_component("tool1", &wasm, None, None).unwrap();
        assert_eq!(result, wasm);
    }

    #[test]
    fn missing_wasm_after_build_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = build_component("tool1", dir.path(), Some("true"), None);
        assert!(matches!(result, Err(Error::WasmNotFound { .. })));
    }

    #[test]
    fn failing_command_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let result = build_component("tool1", dir.path(), Some("exit 7"), None);
        match result {
            Err(Error::BuildExec { exit_code, .. }) => assert_eq!(exit_code, Some(7)),
            other => panic!("expected BuildExec, got {other:?}"),
        }
    }

    #[test]
    fn locates_wasm_in_dist_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("dist")).unwrap();
        std::fs::write(dir.path().join("dist/tool1.wasm"), b"").unwrap();
        let result = build_component("tool1", dir.path(), Some("true"), None).unwrap();
        assert_eq!(result, dir.path().join("dist/tool1.wasm"));
    }

    #[test]
    fn tail_lines_keeps_only_the_last_n() {
        let text = (1..=30).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let tail = tail_lines(&text, 5);
        assert_eq!(tail, "26\n27\n28\n29\n30");
    }
}

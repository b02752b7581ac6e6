//! Resolves a file path to an application descriptor

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

/// Candidate file names for the default descriptor, checked in order.
pub const DEFAULT_DESCRIPTOR_FILES: &[&str] = &["ftl.yaml", "ftl.yml", "ftl.json"];

/// Resolves a descriptor path provided by a user, which may be a file or
/// directory, to a path to an application descriptor file.
pub fn resolve_descriptor_file_path(provided_path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = provided_path.as_ref();

    if path.is_file() {
        Ok(path.to_owned())
    } else if path.is_dir() {
        DEFAULT_DESCRIPTOR_FILES
            .iter()
            .map(|name| path.join(name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                anyhow!(
                    "Directory {} does not contain a {} file",
                    path.display(),
                    DEFAULT_DESCRIPTOR_FILES.join(" or ")
                )
            })
    } else {
        let pd = path.display();
        let err = match path.try_exists() {
            Err(e) => anyhow!("Error accessing path {pd}: {e:#}"),
            Ok(false) => anyhow!("No such file or directory '{pd}'"),
            Ok(true) => anyhow!("Path {pd} is neither a file nor a directory"),
        };
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_direct_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ftl.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(resolve_descriptor_file_path(&path).unwrap(), path);
    }

    #[test]
    fn resolves_a_directory_to_its_default_descriptor_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ftl.yml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(resolve_descriptor_file_path(dir.path()).unwrap(), path);
    }

    #[test]
    fn rejects_a_directory_with_no_descriptor_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_descriptor_file_path(dir.path()).is_err());
    }

    #[test]
    fn rejects_a_path_that_does_not_exist() {
        assert!(resolve_descriptor_file_path("/no/such/path").is_err());
    }
}

//! Content-addressed cache for pulled Wasm artifacts.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::Error;

const WASM_DIR: &str = "wasm";

/// A content-addressed cache of Wasm bytes, keyed by hex SHA-256 digest.
///
/// Writes go through a temp file in the same directory followed by an atomic
/// rename, so a reader never observes a torn file and concurrent writers of
/// the same digest never corrupt each other's output.
pub struct Cache {
    root: PathBuf,
}

impl Cache {
    /// Open (creating if necessary) a cache rooted at `root`.
    pub async fn new(root: PathBuf) -> Result<Self, Error> {
        let wasm_dir = root.join(WASM_DIR);
        fs::create_dir_all(&wasm_dir).await?;
        Ok(Self { root })
    }

    fn wasm_dir(&self) -> PathBuf {
        self.root.join(WASM_DIR)
    }

    fn wasm_path(&self, digest_hex: &str) -> PathBuf {
        self.wasm_dir().join(format!("{digest_hex}.wasm"))
    }

    /// Return the path to a cached Wasm file for `digest_hex`, if one exists
    /// with exactly `expected_len` bytes.
    pub async fn cached_wasm(&self, digest_hex: &str, expected_len: u64) -> Option<PathBuf> {
        let path = self.wasm_path(digest_hex);
        let metadata = fs::metadata(&path).await.ok()?;
        (metadata.len() == expected_len).then_some(path)
    }

    /// Write `bytes` into the cache under `digest_hex`, returning the final path.
    pub async fn write_wasm(&self, digest_hex: &str, bytes: &[u8]) -> Result<PathBuf, Error> {
        let final_path = self.wasm_path(digest_hex);
        let mut tmp = tempfile::NamedTempFile::new_in(self.wasm_dir())?;
        std::io::Write::write_all(&mut tmp, bytes)?;
        persist(tmp, &final_path)?;
        Ok(final_path)
    }
}

fn persist(tmp: tempfile::NamedTempFile, dest: &Path) -> Result<(), Error> {
    tmp.persist(dest)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().to_owned()).await.unwrap();
        let digest = ftl_common::sha256::hex_digest_from_bytes("hello");
        cache.write_wasm(&digest, b"hello").await.unwrap();
        let path = cache.cached_wasm(&digest, 5).await.unwrap();
        assert_eq!(tokio::fs::read(path).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn size_mismatch_is_not_a_cache_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().to_owned()).await.unwrap();
        let digest = ftl_common::sha256::hex_digest_from_bytes("hello");
        cache.write_wasm(&digest, b"hello").await.unwrap();
        assert!(cache.cached_wasm(&digest, 999).await.is_none());
    }

    #[tokio::test]
    async fn missing_digest_is_not_a_cache_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().to_owned()).await.unwrap();
        assert!(cache.cached_wasm("deadbeef", 5).await.is_none());
    }
}

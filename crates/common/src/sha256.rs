//! SHA-256 digest helpers

use std::path::Path;

use sha2::{Digest, Sha256};

/// Return the hex SHA-256 digest of the given bytes.
pub fn hex_digest_from_bytes(bytes: impl AsRef<[u8]>) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}

/// Return the hex SHA-256 digest of the given file.
pub fn hex_digest_from_file(path: impl AsRef<Path>) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = sha2::Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    let digest = hasher.finalize();
    Ok(format!("{digest:x}"))
}

/// Return the `sha256:<hex>`-prefixed digest of the given bytes, the form
/// used throughout OCI artifact references.
pub fn prefixed_digest_from_bytes(bytes: impl AsRef<[u8]>) -> String {
    format!("sha256:{}", hex_digest_from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_hex_digest_from_bytes() {
        let hex = hex_digest_from_bytes("ftl");
        assert_eq!(
            hex,
            "f9394510528c7122ccd02dfc661c09371fccb1113487452abc1193fb771a8732"
        );
    }

    #[test]
    fn test_hex_digest_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(&mut f, "ftl").unwrap();
        let hex = hex_digest_from_file(f.into_temp_path()).unwrap();
        assert_eq!(hex, hex_digest_from_bytes("ftl"));
    }

    #[test]
    fn test_prefixed_digest() {
        let digest = prefixed_digest_from_bytes("ftl");
        assert!(digest.starts_with("sha256:"));
        assert_eq!(digest.len(), "sha256:".len() + 64);
    }
}

//! Push and pull bare Wasm binaries as single-layer OCI artifacts.

use std::path::{Path, PathBuf};

use docker_credential::DockerCredential;
use oci_distribution::{
    client::ImageLayer, manifest::OciImageManifest, secrets::RegistryAuth, Reference,
};
use serde::{Deserialize, Serialize};

use ftl_common::sha256;

use crate::auth::AuthConfig;
use crate::cache::Cache;
use crate::error::Error;

/// Media type of the single Wasm layer. Not compressed, not tar-wrapped.
pub const WASM_LAYER_MEDIA_TYPE: &str = "application/wasm";
/// Media type of the config blob describing the layer.
pub const WASM_CONFIG_MEDIA_TYPE: &str = "application/vnd.wasm.config.v0+json";

const ARCHITECTURE: &str = "wasm";
const OS: &str = "wasip1";

/// The config blob pushed alongside a Wasm layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WasmConfig {
    architecture: String,
    os: String,
    created: String,
    #[serde(rename = "layerDigests")]
    layer_digests: Vec<String>,
    rootfs: RootFs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RootFs {
    #[serde(rename = "type")]
    kind: String,
    diff_ids: Vec<String>,
}

/// Client for pushing and pulling single-layer Wasm OCI artifacts.
pub struct Client {
    oci: oci_distribution::Client,
    cache: Cache,
}

impl Client {
    /// Create a client backed by the cache rooted at `cache_root`.
    pub async fn new(cache_root: PathBuf) -> Result<Self, Error> {
        let oci = oci_distribution::Client::new(oci_distribution::client::ClientConfig::default());
        let cache = Cache::new(cache_root).await?;
        Ok(Self { oci, cache })
    }

    /// Persist basic-auth credentials for `server` for future pushes/pulls.
    pub async fn login(&self, server: &str, username: &str, password: &str) -> Result<(), Error> {
        let mut config = AuthConfig::load_default().await;
        config.insert(server, username, password);
        config.save_default().await
    }

    /// Push the `.wasm` file at `wasm_path` to `reference` (`<registry>/<package>:<version>`).
    /// Returns the pushed layer's `sha256:<hex>` digest.
    pub async fn push(&mut self, wasm_path: &Path, reference: &str) -> Result<String, Error> {
        let parsed: Reference = reference
            .parse()
            .map_err(|e: <Reference as std::str::FromStr>::Err| {
                Error::InvalidRef(reference.to_owned(), e.to_string())
            })?;

        let bytes = tokio::fs::read(wasm_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(wasm_path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;

        let digest = sha256::prefixed_digest_from_bytes(&bytes);
        let layer = ImageLayer::new(bytes, WASM_LAYER_MEDIA_TYPE.to_owned(), None);

        let config_json = WasmConfig {
            architecture: ARCHITECTURE.to_owned(),
            os: OS.to_owned(),
            created: created_timestamp(),
            layer_digests: vec![digest.clone()],
            rootfs: RootFs {
                kind: "layers".to_owned(),
                diff_ids: vec![digest.clone()],
            },
        };
        let config_bytes = serde_json::to_vec(&config_json)
            .map_err(|e| Error::BadManifest(format!("could not serialize config: {e}")))?;
        let config = oci_distribution::client::Config::new(
            config_bytes,
            WASM_CONFIG_MEDIA_TYPE.to_owned(),
            None,
        );

        let manifest = OciImageManifest::build(std::slice::from_ref(&layer), &config, None);
        let auth = self.auth(&parsed).await;

        self.oci
            .push(&parsed, &[layer], config, &auth, Some(manifest))
            .await
            .map_err(classify_push_error)?;

        Ok(digest)
    }

    /// Resolve `reference`, returning the local path to its single Wasm layer,
    /// pulling and caching it if not already present.
    pub async fn pull(&mut self, reference: &str) -> Result<PathBuf, Error> {
        let parsed: Reference = reference
            .parse()
            .map_err(|e: <Reference as std::str::FromStr>::Err| {
                Error::InvalidRef(reference.to_owned(), e.to_string())
            })?;
        let auth = self.auth(&parsed).await;

        let (manifest, _digest) = self
            .oci
            .pull_image_manifest(&parsed, &auth)
            .await
            .map_err(classify_pull_error)?;

        let layer = manifest
            .layers
            .first()
            .ok_or_else(|| Error::BadManifest("manifest has no layers".to_owned()))?;
        if manifest.layers.len() != 1 {
            return Err(Error::BadManifest(format!(
                "expected exactly one layer, found {}",
                manifest.layers.len()
            )));
        }
        if layer.media_type != WASM_LAYER_MEDIA_TYPE {
            return Err(Error::BadManifest(format!(
                "unexpected layer media type `{}`",
                layer.media_type
            )));
        }

        let digest_hex = layer
            .digest
            .strip_prefix("sha256:")
            .unwrap_or(&layer.digest)
            .to_owned();

        if let Some(path) = self.cache.cached_wasm(&digest_hex, layer.size as u64).await {
            return Ok(path);
        }

        let mut bytes = Vec::with_capacity(layer.size.max(0) as usize);
        self.oci
            .pull_blob(&parsed, layer, &mut bytes)
            .await
            .map_err(classify_pull_error)?;

        self.cache.write_wasm(&digest_hex, &bytes).await
    }

    async fn auth(&self, reference: &Reference) -> RegistryAuth {
        let server = reference
            .resolve_registry()
            .strip_suffix('/')
            .unwrap_or_else(|| reference.resolve_registry());

        if let Some(auth) = AuthConfig::auth_for(server).await {
            return auth;
        }
        match docker_credential::get_credential(server) {
            Ok(DockerCredential::UsernamePassword(username, password)) => {
                RegistryAuth::Basic(username, password)
            }
            Ok(DockerCredential::IdentityToken(_)) | Err(_) => RegistryAuth::Anonymous,
        }
    }
}

fn created_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn classify_push_error(e: oci_distribution::errors::OciDistributionError) -> Error {
    use oci_distribution::errors::OciDistributionError;
    match &e {
        OciDistributionError::AuthenticationFailure(detail) => {
            Error::RegistryAuth(detail.clone())
        }
        _ => Error::RegistryTransient(e.to_string()),
    }
}

fn classify_pull_error(e: oci_distribution::errors::OciDistributionError) -> Error {
    use oci_distribution::errors::OciDistributionError;
    match &e {
        OciDistributionError::AuthenticationFailure(detail) => {
            Error::RegistryAuth(detail.clone())
        }
        OciDistributionError::ImageManifestNotFoundError(detail) => {
            Error::BadManifest(detail.clone())
        }
        _ => Error::RegistryTransient(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic_for_identical_bytes() {
        let a = sha256::prefixed_digest_from_bytes(b"same bytes");
        let b = sha256::prefixed_digest_from_bytes(b"same bytes");
        assert_eq!(a, b);
        assert!(a.starts_with("sha256:"));
    }

    #[test]
    fn config_blob_round_trips_through_json() {
        let config = WasmConfig {
            architecture: ARCHITECTURE.to_owned(),
            os: OS.to_owned(),
            created: "2024-01-01T00:00:00Z".to_owned(),
            layer_digests: vec!["sha256:abc".to_owned()],
            rootfs: RootFs {
                kind: "layers".to_owned(),
                diff_ids: vec!["sha256:abc".to_owned()],
            },
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["architecture"], "wasm");
        assert_eq!(json["os"], "wasip1");
        assert_eq!(json["layerDigests"][0], "sha256:abc");
        assert_eq!(json["rootfs"]["type"], "layers");
    }
}

//! Registry credential persistence and resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use oci_distribution::secrets::RegistryAuth;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// On-disk store of per-registry basic-auth credentials, base64 `user:pass`
/// keyed by registry host.
#[derive(Default, Serialize, Deserialize)]
pub struct AuthConfig {
    auths: HashMap<String, String>,
}

impl AuthConfig {
    /// Load the authentication configuration from the default location
    /// (`$XDG_CONFIG_HOME/ftl/registry-auth.json`), or an empty config if
    /// none is stored yet.
    pub async fn load_default() -> Self {
        match Self::load(&Self::default_path()).await {
            Ok(config) => config,
            Err(_) => Self::default(),
        }
    }

    /// Save the authentication configuration to the default location.
    pub async fn save_default(&self) -> Result<(), Error> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    /// Record credentials for `server`.
    pub fn insert(&mut self, server: impl Into<String>, username: &str, password: &str) {
        let encoded = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            format!("{username}:{password}"),
        );
        self.auths.insert(server.into(), encoded);
    }

    /// Resolve stored basic-auth credentials for `server`, if any.
    pub async fn auth_for(server: &str) -> Option<RegistryAuth> {
        let config = Self::load_default().await;
        let encoded = config.auths.get(server)?;
        let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)
            .ok()?;
        let decoded = std::str::from_utf8(&bytes).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(RegistryAuth::Basic(username.to_owned(), password.to_owned()))
    }

    fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("ftl")
            .join("registry-auth.json")
    }

    async fn load(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read(path).await?;
        serde_json::from_slice(&contents).map_err(|e| Error::Io(std::io::Error::other(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_round_trips_through_base64() {
        let mut config = AuthConfig::default();
        config.insert("ghcr.io", "AWS", "secret:with:colons");
        let encoded = config.auths.get("ghcr.io").unwrap();
        let bytes =
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), "AWS:secret:with:colons");
    }
}

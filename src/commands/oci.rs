//! `ftl oci` — registry credential management.

use clap::Parser;

use crate::commands::CommandError;

/// Commands for managing registry credentials used when pulling or pushing components.
#[derive(Parser, Debug)]
pub enum OciCommands {
    /// Store credentials for a registry in the local credential store.
    Login(LoginCommand),
}

impl OciCommands {
    /// Run the command.
    pub async fn run(self) -> Result<(), CommandError> {
        match self {
            Self::Login(cmd) => cmd.run().await,
        }
    }
}

/// Store basic-auth credentials for a registry, used as a fallback auth
/// source (before anonymous access) when pushing or pulling components.
#[derive(Parser, Debug)]
#[clap(about = "Log in to a component registry")]
pub struct LoginCommand {
    /// Registry host, e.g. `ghcr.io`.
    pub server: String,

    /// Registry username.
    #[clap(long, env = "REGISTRY_USERNAME")]
    pub username: String,

    /// Registry password or access token.
    #[clap(long, env = "REGISTRY_PASSWORD")]
    pub password: String,
}

impl LoginCommand {
    /// Run the command.
    pub async fn run(self) -> Result<(), CommandError> {
        let mut config = ftl_oci::AuthConfig::load_default().await;
        config.insert(self.server.clone(), &self.username, &self.password);
        config
            .save_default()
            .await
            .map_err(|e| CommandError::new(3, e.into()))?;

        terminal::step!("Logged in", "{}", self.server);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_persists_credentials_under_a_temp_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", dir.path());

        let cmd = LoginCommand {
            server: "ghcr.io".to_string(),
            username: "AWS".to_string(),
            password: "secret".to_string(),
        };
        cmd.run().await.unwrap();

        let saved = dir.path().join("ftl").join("registry-auth.json");
        assert!(saved.exists());

        std::env::remove_var("XDG_CONFIG_HOME");
    }
}

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::model::{
    App, CreateAppRequest, CreateAppResponse, CreateDeploymentRequest, CreateDeploymentResponse,
    DeploymentStatus, EcrTokenRequest, EcrTokenResponse, ErrorEnvelope,
};

/// A thin REST client for the FTL control plane.
///
/// Holds a base URL and a bearer token; every call sends
/// `Authorization: Bearer <token>` and classifies the response into
/// [`Error::ControlPlaneError`] (4xx) or [`Error::ControlPlaneTransient`]
/// (5xx, timeouts, connection failures).
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl Client {
    /// Build a client pointed at `base_url` (e.g. `https://api.ftl.dev`),
    /// authenticating with `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        idempotency_key: Option<&str>,
        body: Option<&(impl serde::Serialize + ?Sized)>,
    ) -> Result<T, Error> {
        let mut req = self
            .http
            .request(method, self.url(path))
            .bearer_auth(&self.token);
        if let Some(key) = idempotency_key {
            req = req.header("Idempotency-Key", key);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::ControlPlaneTransient(e.to_string()))?;

        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<T>()
                .await
                .map_err(|e| Error::ControlPlaneTransient(e.to_string()));
        }
        if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
            let detail = resp
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(Error::ControlPlaneTransient(format!(
                "{status}: {detail}"
            )));
        }
        let envelope = resp.json::<ErrorEnvelope>().await.unwrap_or(ErrorEnvelope {
            code: status.as_str().to_string(),
            message: status.canonical_reason().unwrap_or("unknown error").to_string(),
        });
        Err(Error::ControlPlaneError {
            code: envelope.code,
            message: envelope.message,
        })
    }

    /// Register a new application. Returns the control-plane-assigned id.
    pub async fn create_app(
        &self,
        name: &str,
        access: &str,
        auth: Option<&serde_json::Value>,
    ) -> Result<String, Error> {
        let req = CreateAppRequest { name, access, auth };
        let resp: CreateAppResponse = self
            .send(Method::POST, "/v1/apps", None, Some(&req))
            .await?;
        Ok(resp.id)
    }

    /// List applications visible to the caller.
    pub async fn list_apps(&self) -> Result<Vec<App>, Error> {
        self.send(Method::GET, "/v1/apps", None, None::<&()>).await
    }

    /// Delete an application by id.
    pub async fn delete_app(&self, app_id: &str) -> Result<(), Error> {
        let path = format!("/v1/apps/{app_id}");
        let req = self
            .http
            .request(Method::DELETE, self.url(&path))
            .bearer_auth(&self.token);
        let resp = req
            .send()
            .await
            .map_err(|e| Error::ControlPlaneTransient(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
            let detail = resp.text().await.unwrap_or_else(|_| status.to_string());
            return Err(Error::ControlPlaneTransient(format!("{status}: {detail}")));
        }
        let envelope = resp.json::<ErrorEnvelope>().await.unwrap_or(ErrorEnvelope {
            code: status.as_str().to_string(),
            message: status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        });
        Err(Error::ControlPlaneError {
            code: envelope.code,
            message: envelope.message,
        })
    }

    /// Submit a synthesized manifest as a new deployment.
    ///
    /// `idempotency_key` should be stable across retries of the same
    /// logical deployment attempt so the control plane can deduplicate.
    pub async fn create_deployment(
        &self,
        app_id: &str,
        manifest_toml: &str,
        metadata: &serde_json::Value,
        idempotency_key: &str,
    ) -> Result<CreateDeploymentResponse, Error> {
        let path = format!("/v1/apps/{app_id}/deployments");
        let req = CreateDeploymentRequest {
            manifest_toml,
            metadata,
        };
        self.send(Method::POST, &path, Some(idempotency_key), Some(&req))
            .await
    }

    /// Fetch a deployment's current status.
    pub async fn get_deployment(&self, deployment_id: &str) -> Result<DeploymentStatus, Error> {
        let path = format!("/v1/deployments/{deployment_id}");
        self.send(Method::GET, &path, None, None::<&()>).await
    }

    /// Request a short-lived ECR push token scoped to `package_namespace`.
    pub async fn ecr_token(&self, package_namespace: &str) -> Result<EcrTokenResponse, Error> {
        let req = EcrTokenRequest { package_namespace };
        self.send(Method::POST, "/v1/ecr-tokens", None, Some(&req))
            .await
    }
}

/// Generate a fresh idempotency key for a deployment attempt.
pub fn new_idempotency_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path_without_double_slash() {
        let client = Client::new("https://api.ftl.dev/", "tok");
        assert_eq!(client.url("/v1/apps"), "https://api.ftl.dev/v1/apps");
    }

    #[test]
    fn idempotency_keys_are_unique() {
        assert_ne!(new_idempotency_key(), new_idempotency_key());
    }
}

//! Generic bearer token acquisition.

use serde::Deserialize;

use crate::error::Error;

/// Where a bearer token comes from.
#[derive(Debug, Clone)]
pub enum BearerSource {
    /// A pre-generated token, passed straight through (the `M2M_TOKEN` case).
    Preset(String),
    /// An OAuth2 client-credentials exchange against `token_url`.
    ClientCredentials {
        /// Token endpoint URL.
        token_url: String,
        /// OAuth2 client id (`CLIENT_ID`).
        client_id: String,
        /// OAuth2 client secret (`CLIENT_SECRET`).
        client_secret: String,
    },
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Acquire a bearer token from `source`.
pub async fn acquire_bearer_token(
    http: &reqwest::Client,
    source: &BearerSource,
) -> Result<String, Error> {
    match source {
        BearerSource::Preset(token) => Ok(token.clone()),
        BearerSource::ClientCredentials {
            token_url,
            client_id,
            client_secret,
        } => {
            let response = http
                .post(token_url)
                .form(&[
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                ])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                return Err(Error::AuthExchange {
                    status: status.as_u16(),
                    detail,
                });
            }

            let parsed: TokenResponse = response.json().await.map_err(|e| Error::AuthExchange {
                status: status.as_u16(),
                detail: format!("could not parse token response: {e}"),
            })?;
            Ok(parsed.access_token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preset_token_passes_through() {
        let http = reqwest::Client::new();
        let token = acquire_bearer_token(&http, &BearerSource::Preset("m2m-token".to_owned()))
            .await
            .unwrap();
        assert_eq!(token, "m2m-token");
    }
}

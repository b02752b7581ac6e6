//! ECR push-credential decoding.

use crate::error::Error;

/// Basic-auth credentials for pushing to a registry, resolved from an
/// opaque ECR token blob returned by the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    /// Registry host, with any `http://`/`https://` prefix stripped.
    pub registry: String,
    /// Always `"AWS"` — ECR's fixed basic-auth username.
    pub username: String,
    /// The decoded password.
    pub password: String,
}

/// Decode a base64 ECR token into [`RegistryCredentials`] for `registry`.
///
/// The token is `base64(username:password)`; the username must be exactly
/// `AWS` and the password must be non-empty. The password itself may
/// contain `:` characters, so splitting stops after the first separator.
pub fn decode_ecr_token(registry: &str, token: &str) -> Result<RegistryCredentials, Error> {
    let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, token)
        .map_err(|e| Error::BadECRToken(format!("not valid base64: {e}")))?;
    let decoded = String::from_utf8(bytes)
        .map_err(|e| Error::BadECRToken(format!("not valid UTF-8: {e}")))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| Error::BadECRToken("expected `username:password`".to_owned()))?;

    if username != "AWS" {
        return Err(Error::BadECRToken(format!(
            "expected username `AWS`, got `{username}`"
        )));
    }
    if password.is_empty() {
        return Err(Error::BadECRToken("password must not be empty".to_owned()));
    }

    let registry = registry
        .strip_prefix("https://")
        .or_else(|| registry.strip_prefix("http://"))
        .unwrap_or(registry);

    Ok(RegistryCredentials {
        registry: registry.to_owned(),
        username: username.to_owned(),
        password: password.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(s: &str) -> String {
        base64::Engine::encode(&base64::engine::general_purpose::STANDARD, s)
    }

    #[test]
    fn decodes_valid_token() {
        let token = encode("AWS:s3cr3t");
        let creds = decode_ecr_token("https://123.dkr.ecr.us-east-1.amazonaws.com", &token).unwrap();
        assert_eq!(creds.username, "AWS");
        assert_eq!(creds.password, "s3cr3t");
        assert_eq!(creds.registry, "123.dkr.ecr.us-east-1.amazonaws.com");
    }

    #[test]
    fn preserves_colons_in_password() {
        let token = encode("AWS:part1:part2");
        let creds = decode_ecr_token("ecr.example.com", &token).unwrap();
        assert_eq!(creds.password, "part1:part2");
    }

    #[test]
    fn rejects_wrong_username() {
        let token = encode("root:s3cr3t");
        let err = decode_ecr_token("ecr.example.com", &token).unwrap_err();
        assert!(matches!(err, Error::BadECRToken(_)));
    }

    #[test]
    fn rejects_non_base64() {
        let err = decode_ecr_token("ecr.example.com", "not base64!!").unwrap_err();
        assert!(matches!(err, Error::BadECRToken(_)));
    }
}

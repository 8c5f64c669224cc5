use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::EcrError;

/// Docker login credentials for an ECR registry
///
/// Derived from an authorization token on every read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCredentials {
    /// Registry endpoint the credentials are valid for
    pub proxy_endpoint: String,
    /// Username for docker login (ECR issues "AWS")
    pub username: String,
    /// Password or token for docker login
    pub password: String,
}

/// Decode a base64 authorization token into docker login credentials
///
/// The decoded payload is `username:password`; the password may itself
/// contain colons, so only the first colon separates the two.
pub fn decode_token(token: &str, proxy_endpoint: &str) -> Result<RegistryCredentials, EcrError> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(token)
        .map_err(|e| EcrError::InvalidTokenEncoding(e.to_string()))?;

    let decoded = String::from_utf8(decoded)
        .map_err(|_| EcrError::InvalidTokenEncoding("token is not valid UTF-8".to_string()))?;

    let (username, password) = decoded.split_once(':').ok_or(EcrError::InvalidTokenFormat)?;

    Ok(RegistryCredentials {
        proxy_endpoint: proxy_endpoint.to_string(),
        username: username.to_string(),
        password: password.to_string(),
    })
}

use reqwest::{StatusCode, Url};
use serde::Deserialize;

use super::{RemoteClient, RemoteError, status_error};
use crate::types::{BearerToken, Credential};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl RemoteClient {
    /// Exchange a username/password for a bearer token (password grant).
    ///
    /// Only HTTP 200 with a JSON `access_token` yields a token. No retry.
    pub async fn acquire_token(
        &self,
        auth_url: &Url,
        username: &str,
        password: &Credential,
    ) -> Result<BearerToken, RemoteError> {
        tracing::debug!(url = %auth_url, username, "Requesting access token");

        let response = self
            .http()
            .post(auth_url.clone())
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password.expose()),
            ])
            .send()
            .await
            .map_err(|e| RemoteError::transport(auth_url, e))?;

        if response.status() != StatusCode::OK {
            return Err(status_error(auth_url, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::transport(auth_url, e))?;

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| RemoteError::InvalidResponse {
                url: auth_url.to_string(),
                reason: format!("Failed to parse token response: {}", e),
            })?;

        if parsed.access_token.is_empty() {
            return Err(RemoteError::InvalidResponse {
                url: auth_url.to_string(),
                reason: "access_token is empty".to_string(),
            });
        }

        Ok(BearerToken::new(parsed.access_token))
    }
}

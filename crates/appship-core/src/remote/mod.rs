//! HTTP client for the hosting service
//!
//! Three calls make up the wire protocol:
//! - `POST {auth_url}` password grant, returns `access_token`
//! - `DELETE {base}/api/v1/applications/{app}/clear`
//! - `POST {base}/api/v1/applications/{app}/deploy` multipart upload
//!
//! Every call reports failure as a [`RemoteError`] value. Classification
//! into a deployment result happens in the orchestrator.

mod application;
mod token;

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

const USER_AGENT: &str = concat!("appship/", env!("CARGO_PKG_VERSION"));
const MAX_BODY_EXCERPT: usize = 512;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Failed to prepare HTTP request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Request to {url} failed: {}", error_chain(.source))]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}{}", body_suffix(.body))]
    Status {
        url: String,
        status: StatusCode,
        body: Option<String>,
    },

    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
}

impl RemoteError {
    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Refused, reset, DNS or timeout failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Transport { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteError::Transport { source, .. } if source.is_timeout())
    }

    /// Classify a `send()` failure; a request that could not be built never hit the wire.
    fn transport(url: &reqwest::Url, source: reqwest::Error) -> Self {
        if source.is_builder() {
            return RemoteError::Request(source);
        }
        RemoteError::Transport {
            url: url.to_string(),
            source,
        }
    }
}

/// Thin wrapper over a `reqwest::Client` with the service's timeout.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
}

impl RemoteClient {
    pub fn new(timeout: Duration) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Request)?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Turn a non-200 response into a `Status` error, keeping a body excerpt for logs.
async fn status_error(url: &reqwest::Url, response: reqwest::Response) -> RemoteError {
    let status = response.status();
    let body = response
        .text()
        .await
        .ok()
        .and_then(|text| summarize_error_body(&text));
    RemoteError::Status {
        url: url.to_string(),
        status,
        body,
    }
}

/// Prefer the JSON `message`/`error_description`/`error` field, else a raw excerpt.
fn summarize_error_body(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(trimmed) {
        for key in ["message", "error_description", "error", "detail"] {
            if let Some(serde_json::Value::String(value)) = map.get(key) {
                return Some(value.clone());
            }
        }
    }

    let mut excerpt: String = trimmed.chars().take(MAX_BODY_EXCERPT).collect();
    if trimmed.chars().count() > MAX_BODY_EXCERPT {
        excerpt.push_str("...");
    }
    Some(excerpt)
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .map(|b| format!(": {}", b))
        .unwrap_or_default()
}

/// reqwest hides the root cause (refused, reset, dns) behind its source chain.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_prefers_json_message() {
        assert_eq!(
            summarize_error_body(r#"{"message":"bad archive","code":42}"#),
            Some("bad archive".to_string())
        );
        assert_eq!(
            summarize_error_body(r#"{"error":"invalid_grant","error_description":"Bad credentials"}"#),
            Some("Bad credentials".to_string())
        );
    }

    #[test]
    fn summarize_falls_back_to_text() {
        assert_eq!(summarize_error_body("   "), None);
        assert_eq!(
            summarize_error_body("Service Unavailable"),
            Some("Service Unavailable".to_string())
        );

        let long = "x".repeat(MAX_BODY_EXCERPT + 10);
        let excerpt = summarize_error_body(&long).unwrap();
        assert_eq!(excerpt.len(), MAX_BODY_EXCERPT + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn status_error_display_includes_body() {
        let err = RemoteError::Status {
            url: "https://apps.example.com/x".to_string(),
            status: StatusCode::BAD_REQUEST,
            body: Some("bad archive".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "https://apps.example.com/x returned HTTP 400 Bad Request: bad archive"
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(!err.is_transport());
    }

    #[test]
    fn builder_failures_are_not_transport_errors() {
        let url = reqwest::Url::parse("https://apps.example.com/oauth/token").unwrap();
        let built = reqwest::Client::new()
            .get(url.clone())
            .header("bad header\n", "x")
            .build();
        let source = built.unwrap_err();
        assert!(source.is_builder());

        let err = RemoteError::transport(&url, source);
        assert!(matches!(err, RemoteError::Request(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn client_builds_with_timeout() {
        assert!(RemoteClient::new(Duration::from_secs(5)).is_ok());
    }
}

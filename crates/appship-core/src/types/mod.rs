//! Shared core types used across the deployment pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed classification of a single deployment attempt.
///
/// Exactly one value is produced per attempt. Callers must handle every
/// variant; there is no catch-all string status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentResult {
    /// Archive accepted by the deploy endpoint.
    Success,
    /// Credentials rejected while acquiring the token.
    AuthorizationError,
    /// A previously issued token was rejected by a later call.
    Unauthorized,
    /// Transport-level failure (refused, reset, DNS, timeout).
    ConnectionError,
    /// Local precondition failure or a 4xx rejection of the request content.
    ValidationError,
    /// Anything not covered above.
    UnknownError,
}

impl DeploymentResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentResult::Success => "success",
            DeploymentResult::AuthorizationError => "authorization-error",
            DeploymentResult::Unauthorized => "unauthorized",
            DeploymentResult::ConnectionError => "connection-error",
            DeploymentResult::ValidationError => "validation-error",
            DeploymentResult::UnknownError => "unknown-error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeploymentResult::Success)
    }

    /// Whether the upstream message should be shown to the user for diagnosis.
    pub fn surfaces_upstream_message(&self) -> bool {
        matches!(
            self,
            DeploymentResult::ConnectionError
                | DeploymentResult::AuthorizationError
                | DeploymentResult::Unauthorized
        )
    }
}

impl fmt::Display for DeploymentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short-lived bearer token issued by the authentication endpoint.
///
/// Requested fresh for each deployment attempt and dropped with it.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Stored password for a `(base_url, username)` pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_kebab_case() {
        let json = serde_json::to_string(&DeploymentResult::AuthorizationError).unwrap();
        assert_eq!(json, "\"authorization-error\"");
        assert_eq!(
            DeploymentResult::AuthorizationError.to_string(),
            "authorization-error"
        );
    }

    #[test]
    fn only_success_is_success() {
        let all = [
            DeploymentResult::Success,
            DeploymentResult::AuthorizationError,
            DeploymentResult::Unauthorized,
            DeploymentResult::ConnectionError,
            DeploymentResult::ValidationError,
            DeploymentResult::UnknownError,
        ];
        let successes: Vec<_> = all.iter().filter(|r| r.is_success()).collect();
        assert_eq!(successes, vec![&DeploymentResult::Success]);
    }

    #[test]
    fn upstream_message_surfaced_for_network_and_auth_failures() {
        assert!(DeploymentResult::ConnectionError.surfaces_upstream_message());
        assert!(DeploymentResult::AuthorizationError.surfaces_upstream_message());
        assert!(DeploymentResult::Unauthorized.surfaces_upstream_message());
        assert!(!DeploymentResult::ValidationError.surfaces_upstream_message());
        assert!(!DeploymentResult::Success.surfaces_upstream_message());
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let token = BearerToken::new("abc.def.ghi");
        let cred = Credential::new("hunter2");
        assert_eq!(format!("{:?}", token), "BearerToken(***)");
        assert_eq!(format!("{:?}", cred), "Credential(***)");
        assert_eq!(token.expose(), "abc.def.ghi");
    }
}

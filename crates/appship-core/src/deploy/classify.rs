//! Mapping of remote failures onto [`DeploymentResult`].
//!
//! The token endpoint and the application endpoints classify the same
//! HTTP status differently: a 401 while logging in means the credentials
//! are wrong, a 401 afterwards means the issued token was rejected.

use crate::remote::RemoteError;
use crate::types::DeploymentResult;

/// Classify a failed token request.
pub fn classify_token_failure(error: &RemoteError) -> DeploymentResult {
    match error {
        RemoteError::Transport { .. } => DeploymentResult::ConnectionError,
        RemoteError::Status { status, .. } if status.is_client_error() => {
            DeploymentResult::AuthorizationError
        }
        RemoteError::Status { .. }
        | RemoteError::InvalidResponse { .. }
        | RemoteError::Request(_) => DeploymentResult::UnknownError,
    }
}

/// Classify a failed clear or upload call.
pub fn classify_call_failure(error: &RemoteError) -> DeploymentResult {
    match error {
        RemoteError::Transport { .. } => DeploymentResult::ConnectionError,
        RemoteError::Status { status, .. } if status.as_u16() == 401 => {
            DeploymentResult::Unauthorized
        }
        RemoteError::Status { status, .. } if status.is_client_error() => {
            DeploymentResult::ValidationError
        }
        RemoteError::Status { .. }
        | RemoteError::InvalidResponse { .. }
        | RemoteError::Request(_) => DeploymentResult::UnknownError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn status(code: u16) -> RemoteError {
        RemoteError::Status {
            url: "https://apps.example.com".to_string(),
            status: StatusCode::from_u16(code).unwrap(),
            body: None,
        }
    }

    fn invalid() -> RemoteError {
        RemoteError::InvalidResponse {
            url: "https://apps.example.com".to_string(),
            reason: "not json".to_string(),
        }
    }

    fn unbuildable() -> RemoteError {
        let source = reqwest::Client::new()
            .get("https://apps.example.com")
            .header("bad header\n", "x")
            .build()
            .unwrap_err();
        RemoteError::Request(source)
    }

    #[test]
    fn unbuildable_requests_are_unknown_errors() {
        assert_eq!(
            classify_token_failure(&unbuildable()),
            DeploymentResult::UnknownError
        );
        assert_eq!(
            classify_call_failure(&unbuildable()),
            DeploymentResult::UnknownError
        );
    }

    #[test]
    fn token_failures() {
        assert_eq!(
            classify_token_failure(&status(401)),
            DeploymentResult::AuthorizationError
        );
        assert_eq!(
            classify_token_failure(&status(400)),
            DeploymentResult::AuthorizationError
        );
        assert_eq!(
            classify_token_failure(&status(403)),
            DeploymentResult::AuthorizationError
        );
        assert_eq!(
            classify_token_failure(&status(500)),
            DeploymentResult::UnknownError
        );
        assert_eq!(
            classify_token_failure(&status(503)),
            DeploymentResult::UnknownError
        );
        assert_eq!(
            classify_token_failure(&status(302)),
            DeploymentResult::UnknownError
        );
        assert_eq!(
            classify_token_failure(&invalid()),
            DeploymentResult::UnknownError
        );
    }

    #[test]
    fn call_failures() {
        assert_eq!(
            classify_call_failure(&status(401)),
            DeploymentResult::Unauthorized
        );
        assert_eq!(
            classify_call_failure(&status(400)),
            DeploymentResult::ValidationError
        );
        assert_eq!(
            classify_call_failure(&status(403)),
            DeploymentResult::ValidationError
        );
        assert_eq!(
            classify_call_failure(&status(413)),
            DeploymentResult::ValidationError
        );
        assert_eq!(
            classify_call_failure(&status(500)),
            DeploymentResult::UnknownError
        );
        assert_eq!(
            classify_call_failure(&status(204)),
            DeploymentResult::UnknownError
        );
        assert_eq!(
            classify_call_failure(&invalid()),
            DeploymentResult::UnknownError
        );
    }
}

//! Deployment orchestrator.
//!
//! Runs one attempt strictly in order:
//! config + credential, token, optional clear, archive, upload.
//! The first failure ends the run; nothing is retried and a completed
//! clear is not rolled back when a later step fails.

use std::path::PathBuf;

use tracing::Instrument;

use super::classify::{classify_call_failure, classify_token_failure};
use super::confirm::{ConfirmationGate, needs_confirmation};
use super::report::{DeployOutcome, RunProgress};
use crate::archive::build_archive;
use crate::config::{ConfigProvider, DeploymentConfig};
use crate::remote::RemoteClient;
use crate::secrets::SecretStore;
use crate::types::{Credential, DeploymentResult};

pub const NO_CONFIG_MESSAGE: &str = "No deployment configuration found";

/// Per-invocation options supplied by the caller.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Workspace whose configuration is deployed
    pub workspace: PathBuf,
    /// Reject source directories outside the workspace
    pub confine_to_workspace: bool,
}

impl DeployOptions {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            confine_to_workspace: true,
        }
    }

    pub fn with_confine_to_workspace(mut self, confine: bool) -> Self {
        self.confine_to_workspace = confine;
        self
    }
}

/// Sequences token acquisition, clearing, archiving and upload.
///
/// Collaborators are injected; the deployer keeps no state between runs,
/// so concurrent runs only share the remote application. Callers that
/// need one deployment per target at a time must serialize themselves.
pub struct Deployer {
    config: Box<dyn ConfigProvider>,
    secrets: Box<dyn SecretStore>,
    confirm: Box<dyn ConfirmationGate>,
    client: Option<RemoteClient>,
}

impl Deployer {
    pub fn new(
        config: impl ConfigProvider + 'static,
        secrets: impl SecretStore + 'static,
        confirm: impl ConfirmationGate + 'static,
    ) -> Self {
        Self {
            config: Box::new(config),
            secrets: Box::new(secrets),
            confirm: Box::new(confirm),
            client: None,
        }
    }

    /// Use a preconfigured HTTP client instead of one built from the config timeout.
    pub fn with_client(mut self, client: RemoteClient) -> Self {
        self.client = Some(client);
        self
    }

    pub async fn deploy(&self, options: &DeployOptions) -> DeployOutcome {
        let mut progress = RunProgress::start("");

        let config = match self.config.load(&options.workspace) {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::warn!(workspace = %options.workspace.display(), "{}", NO_CONFIG_MESSAGE);
                return progress.fail(DeploymentResult::ValidationError, NO_CONFIG_MESSAGE);
            }
            Err(e) => {
                return progress.fail(
                    DeploymentResult::ValidationError,
                    format!("Failed to load deployment configuration: {:#}", e),
                );
            }
        };
        progress.set_app_name(&config.app_name);

        let span = tracing::info_span!("deploy", app = %config.app_name);
        self.run(config, options, progress).instrument(span).await
    }

    async fn run(
        &self,
        config: DeploymentConfig,
        options: &DeployOptions,
        mut progress: RunProgress,
    ) -> DeployOutcome {
        if let Err(e) = config.validate() {
            return progress.fail(DeploymentResult::ValidationError, format!("{:#}", e));
        }

        let password = match self.resolve_credential(&config) {
            Ok(password) => password,
            Err(message) => return progress.fail(DeploymentResult::ValidationError, message),
        };

        if needs_confirmation(&config) && !self.confirm.confirm_rapid_deploy(&config) {
            tracing::info!("Rapid deploy declined; nothing sent");
            return DeployOutcome::NotAttempted {
                reason: "Rapid deploy was not confirmed".to_string(),
            };
        }

        let endpoints = (config.auth_url(), config.clear_url(), config.deploy_url());
        let (auth_url, clear_url, deploy_url) = match endpoints {
            (Ok(auth), Ok(clear), Ok(deploy)) => (auth, clear, deploy),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                return progress.fail(DeploymentResult::ValidationError, format!("{:#}", e));
            }
        };

        let client = match &self.client {
            Some(client) => client.clone(),
            None => match RemoteClient::new(config.timeout()) {
                Ok(client) => client,
                Err(e) => return progress.fail(DeploymentResult::UnknownError, e.to_string()),
            },
        };

        tracing::info!(username = %config.username, "Requesting access token");
        let token = match client
            .acquire_token(&auth_url, &config.username, &password)
            .await
        {
            Ok(token) => token,
            Err(e) => {
                let result = classify_token_failure(&e);
                tracing::warn!(%result, error = %e, "Token request failed");
                return progress.fail(result, e.to_string());
            }
        };
        drop(password);

        if config.rapid_deploy {
            tracing::info!("Clearing remote application state");
            if let Err(e) = client.clear(&clear_url, &token).await {
                let result = classify_call_failure(&e);
                tracing::warn!(%result, error = %e, "Clearing remote state failed");
                return progress.fail(result, e.to_string());
            }
            progress.mark_cleared();
        }

        let source = config.resolved_source_path(&options.workspace);
        let project = options
            .confine_to_workspace
            .then_some(options.workspace.as_path());
        let archive = match build_archive(&source, project).await {
            Ok(archive) => archive,
            Err(e) => {
                tracing::warn!(error = %e, "Archive build failed");
                return progress.fail(DeploymentResult::ValidationError, e.to_string());
            }
        };
        progress.record_archive(&archive);
        tracing::info!(
            files = archive.file_count(),
            size_bytes = archive.len(),
            "Archive ready"
        );

        let file_name = format!("{}.zip", config.app_name);
        match client.upload(&deploy_url, &token, archive, &file_name).await {
            Ok(()) => {
                tracing::info!("Deployment accepted");
                progress.finish(DeploymentResult::Success, None)
            }
            Err(e) => {
                let result = classify_call_failure(&e);
                tracing::warn!(%result, error = %e, "Upload failed");
                progress.fail(result, e.to_string())
            }
        }
    }

    fn resolve_credential(&self, config: &DeploymentConfig) -> Result<Credential, String> {
        match self.secrets.get(&config.base_url, &config.username) {
            Ok(Some(credential)) if !credential.is_empty() => Ok(credential),
            Ok(_) => Err(format!(
                "No stored password for {} at {}",
                config.username, config.base_url
            )),
            Err(e) => Err(e.to_string()),
        }
    }
}

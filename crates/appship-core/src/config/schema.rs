//! Configuration schema for appship.toml
//!
//! A workspace carries a single `[deploy]` table describing one target:
//!
//! ```toml
//! [deploy]
//! base_url = "https://apps.example.com"
//! app_name = "demo"
//! username = "u@example.com"
//! source_path = "dist"
//! rapid_deploy = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default transport timeout for every remote call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Root structure of appship.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppshipConfig {
    /// Deployment target, absent until `appship init` has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeploymentConfig>,
}

impl AppshipConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(deploy) = &self.deploy {
            deploy
                .validate()
                .context("Invalid [deploy] configuration")?;
        }
        Ok(())
    }
}

/// One deployment target. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Root URL of the hosting service
    pub base_url: String,

    /// Target application identifier
    pub app_name: String,

    /// Account used to obtain bearer tokens
    pub username: String,

    /// Directory to archive; relative paths resolve against the workspace
    pub source_path: PathBuf,

    /// Wipe remote application state before uploading
    #[serde(default)]
    pub rapid_deploy: bool,

    /// Do not ask before a rapid deploy
    #[serde(default)]
    pub skip_rapid_deploy_warning: bool,

    /// Token endpoint; defaults to `{base_url}/oauth/token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,

    /// Transport timeout in seconds for each remote call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl DeploymentConfig {
    pub fn new(
        base_url: impl Into<String>,
        app_name: impl Into<String>,
        username: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            app_name: app_name.into(),
            username: username.into(),
            source_path: source_path.into(),
            rapid_deploy: false,
            skip_rapid_deploy_warning: false,
            auth_url: None,
            timeout_secs: None,
        }
    }

    pub fn with_rapid_deploy(mut self, rapid_deploy: bool) -> Self {
        self.rapid_deploy = rapid_deploy;
        self
    }

    pub fn with_skip_rapid_deploy_warning(mut self, skip: bool) -> Self {
        self.skip_rapid_deploy_warning = skip;
        self
    }

    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = Some(auth_url.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base = parse_service_url(&self.base_url).context("Invalid base_url")?;
        if base.scheme() == "http" {
            tracing::warn!(base_url = %self.base_url, "base_url is not HTTPS; credentials travel in clear text");
        }
        if let Some(auth_url) = &self.auth_url {
            parse_service_url(auth_url).context("Invalid auth_url")?;
        }
        if self.app_name.trim().is_empty() {
            anyhow::bail!("app_name must not be empty");
        }
        if self.app_name.contains('/') {
            anyhow::bail!("app_name must not contain '/': {}", self.app_name);
        }
        if self.username.trim().is_empty() {
            anyhow::bail!("username must not be empty");
        }
        if self.timeout_secs == Some(0) {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Token endpoint for the password grant.
    pub fn auth_url(&self) -> anyhow::Result<Url> {
        match &self.auth_url {
            Some(url) => parse_service_url(url),
            None => self.endpoint(&["oauth", "token"]),
        }
    }

    /// `DELETE {base_url}/api/v1/applications/{app_name}/clear`
    pub fn clear_url(&self) -> anyhow::Result<Url> {
        self.endpoint(&["api", "v1", "applications", &self.app_name, "clear"])
    }

    /// `POST {base_url}/api/v1/applications/{app_name}/deploy`
    pub fn deploy_url(&self) -> anyhow::Result<Url> {
        self.endpoint(&["api", "v1", "applications", &self.app_name, "deploy"])
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Resolve `source_path` against the workspace, expanding a leading `~/`.
    ///
    /// A blank path stays empty so the archive step rejects it instead of
    /// shipping the workspace root.
    pub fn resolved_source_path(&self, workspace: &Path) -> PathBuf {
        if self.source_path.to_string_lossy().trim().is_empty() {
            return PathBuf::new();
        }
        if let Ok(rest) = self.source_path.strip_prefix("~")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        if self.source_path.is_absolute() {
            self.source_path.clone()
        } else {
            workspace.join(&self.source_path)
        }
    }

    fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = parse_service_url(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("base_url cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_service_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Failed to parse URL: {}", raw))?;
    match url.scheme() {
        "https" | "http" => Ok(url),
        other => anyhow::bail!("Unsupported URL scheme '{}' in {}", other, raw),
    }
}

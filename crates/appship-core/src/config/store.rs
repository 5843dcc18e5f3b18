//! Config store for loading and saving appship.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{AppshipConfig, DeploymentConfig, parser};

pub const CONFIG_FILE_NAME: &str = "appship.toml";

/// Source of the deployment target for a workspace.
pub trait ConfigProvider: Send + Sync {
    /// Returns `Ok(None)` when the workspace has no deployment configuration.
    fn load(&self, workspace: &Path) -> anyhow::Result<Option<DeploymentConfig>>;
}

/// Reads `appship.toml` from the workspace root.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileConfigProvider;

impl ConfigProvider for FileConfigProvider {
    fn load(&self, workspace: &Path) -> anyhow::Result<Option<DeploymentConfig>> {
        Ok(ConfigStore::for_workspace(workspace).load()?.deploy)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
    workspace: PathBuf,
}

impl ConfigStore {
    pub fn for_workspace(workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        Self {
            config_path: workspace.join(CONFIG_FILE_NAME),
            workspace,
        }
    }

    pub fn from_current_dir() -> anyhow::Result<Self> {
        let workspace =
            std::env::current_dir().context("Could not determine current directory")?;
        Ok(Self::for_workspace(workspace))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    pub fn load(&self) -> anyhow::Result<AppshipConfig> {
        if !self.config_path.exists() {
            return Ok(AppshipConfig::new());
        }
        parser::parse_appship_toml(&self.config_path)
    }

    pub fn save(&self, config: &AppshipConfig) -> anyhow::Result<()> {
        config.validate()?;
        let content = parser::to_toml(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_returns_empty_config() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::for_workspace(temp.path());
        assert!(!store.exists());
        assert!(store.load().unwrap().deploy.is_none());
        assert!(FileConfigProvider.load(temp.path()).unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::for_workspace(temp.path());
        let deploy =
            DeploymentConfig::new("https://apps.example.com", "demo", "u@example.com", "dist");
        store
            .save(&AppshipConfig {
                deploy: Some(deploy.clone()),
            })
            .unwrap();

        assert!(temp.path().join(CONFIG_FILE_NAME).exists());
        assert_eq!(
            FileConfigProvider.load(temp.path()).unwrap(),
            Some(deploy)
        );
    }

    #[test]
    fn save_rejects_invalid_config() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::for_workspace(temp.path());
        let deploy = DeploymentConfig::new("not-a-url", "demo", "u", "dist");
        assert!(
            store
                .save(&AppshipConfig {
                    deploy: Some(deploy)
                })
                .is_err()
        );
        assert!(!store.exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "[deploy\n").unwrap();
        let err = FileConfigProvider.load(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}

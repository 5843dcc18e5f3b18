//! Workspace configuration
//!
//! Each workspace keeps its deployment target in `appship.toml` at the
//! workspace root. The pipeline only reads it through [`ConfigProvider`].

pub mod parser;
pub mod schema;
pub mod store;

pub use parser::{parse_appship_toml, parse_appship_toml_str, to_toml};
pub use schema::{AppshipConfig, DEFAULT_TIMEOUT_SECS, DeploymentConfig};
pub use store::{CONFIG_FILE_NAME, ConfigProvider, ConfigStore, FileConfigProvider};

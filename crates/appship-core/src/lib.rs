//! Appship Core Library
//!
//! Packages a local source tree and ships it to an application-hosting
//! service: credential lookup, bearer token acquisition, optional remote
//! state clearing, in-memory archiving and authenticated upload.

pub mod archive;
pub mod config;
pub mod deploy;
pub mod remote;
pub mod secrets;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        AppshipConfig, ConfigProvider, ConfigStore, DeploymentConfig, FileConfigProvider,
    };

    // Pipeline
    pub use crate::archive::{Archive, ArchiveError, build_archive};
    pub use crate::deploy::{
        AlwaysConfirm, ConfirmationGate, DeployOptions, DeployOutcome, DeployReport, Deployer,
    };
    pub use crate::remote::{RemoteClient, RemoteError};

    // Secrets
    #[cfg(feature = "keyring-store")]
    pub use crate::secrets::KeyringSecretStore;
    pub use crate::secrets::{MemorySecretStore, SecretStore, SecretStoreError};

    // Shared types
    pub use crate::types::{BearerToken, Credential, DeploymentResult};
}

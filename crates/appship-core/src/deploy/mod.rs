//! Deployment pipeline
//!
//! [`Deployer`] turns a workspace configuration into exactly one
//! [`DeploymentResult`](crate::types::DeploymentResult), or reports the
//! run as not attempted when a rapid deploy is declined.

pub mod classify;
pub mod confirm;
pub mod orchestrator;
pub mod report;

pub use classify::{classify_call_failure, classify_token_failure};
pub use confirm::{AlwaysConfirm, ConfirmationGate, needs_confirmation};
pub use orchestrator::{DeployOptions, Deployer, NO_CONFIG_MESSAGE};
pub use report::{ArchiveSummary, DeployOutcome, DeployReport};

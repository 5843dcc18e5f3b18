//! Confirmation gate consulted before a rapid deploy clears remote state.

use crate::config::DeploymentConfig;

pub trait ConfirmationGate: Send + Sync {
    /// Return `false` to abort the run before any network call.
    fn confirm_rapid_deploy(&self, config: &DeploymentConfig) -> bool;
}

/// Approves every rapid deploy (`--yes`, CI, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmationGate for AlwaysConfirm {
    fn confirm_rapid_deploy(&self, _config: &DeploymentConfig) -> bool {
        true
    }
}

impl<F> ConfirmationGate for F
where
    F: Fn(&DeploymentConfig) -> bool + Send + Sync,
{
    fn confirm_rapid_deploy(&self, config: &DeploymentConfig) -> bool {
        self(config)
    }
}

/// Whether the gate has to be consulted for this configuration.
pub fn needs_confirmation(config: &DeploymentConfig) -> bool {
    config.rapid_deploy && !config.skip_rapid_deploy_warning
}

//! Interactive prompts for the CLI.
//!
//! Everything that talks to the terminal lives here so the core crate
//! only ever sees the [`ConfirmationGate`] seam and plain strings.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Password, theme::ColorfulTheme};

use appship_core::config::DeploymentConfig;
use appship_core::deploy::ConfirmationGate;
use appship_core::types::Credential;

/// Asks on the terminal before a rapid deploy wipes remote state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl ConfirmationGate for TerminalConfirm {
    fn confirm_rapid_deploy(&self, config: &DeploymentConfig) -> bool {
        let mut stderr = std::io::stderr();
        let _ = writeln!(
            stderr,
            "{} Rapid deploy removes everything currently deployed to '{}' at {} before uploading.",
            style("⚠").yellow().bold(),
            config.app_name,
            config.base_url
        );

        // A failed prompt (no tty, ctrl-c) counts as a refusal.
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Continue with rapid deploy?")
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Prompt for the account password without echoing it.
pub fn prompt_password(config: &DeploymentConfig) -> Result<Credential> {
    let secret = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Password for {} at {}", config.username, config.base_url))
        .interact()
        .context("Failed to read password")?;
    Ok(Credential::new(secret))
}

/// Read the password from the first line of `reader`.
pub fn read_password_line(reader: impl BufRead) -> Result<Credential> {
    let line = reader
        .lines()
        .next()
        .transpose()
        .context("Failed to read password from stdin")?
        .unwrap_or_default();
    let secret = line.trim_end_matches(['\r', '\n']);
    if secret.is_empty() {
        anyhow::bail!("No password supplied on stdin");
    }
    Ok(Credential::new(secret))
}

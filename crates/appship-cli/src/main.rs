//! Appship - ship a build directory to an application-hosting service
//!
//! Usage:
//!   appship init --base-url URL --app NAME --username USER
//!   appship login             # Store the account password
//!   appship deploy            # Archive and upload the source directory
//!   appship config            # Show the resolved configuration

mod prompts;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use appship_core::config::{AppshipConfig, ConfigStore, DeploymentConfig, FileConfigProvider};
use appship_core::deploy::{AlwaysConfirm, DeployOptions, DeployOutcome, Deployer};
use appship_core::secrets::{KeyringSecretStore, SecretStore, SecretStoreError};
use appship_core::types::Credential;

use crate::prompts::TerminalConfirm;

#[derive(Parser)]
#[command(name = "appship")]
#[command(about = "Deploy a local build to an application-hosting service", long_about = None)]
struct Cli {
    /// Workspace containing appship.toml (defaults to the current directory)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write appship.toml for this workspace
    Init(InitArgs),

    /// Store the account password in the system keychain
    Login {
        /// Read the password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,
    },

    /// Remove the stored password
    Logout,

    /// Archive the source directory and upload it
    Deploy {
        /// Skip the rapid deploy confirmation prompt (for CI/CD)
        #[arg(short = 'y', long)]
        yes: bool,

        /// Output format
        #[arg(short = 'o', long = "format", default_value = "table")]
        format: OutputFormat,

        /// Allow a source directory outside the workspace
        #[arg(long)]
        allow_outside_workspace: bool,
    },

    /// Show the resolved deployment configuration
    Config,
}

#[derive(Args)]
struct InitArgs {
    /// Root URL of the hosting service
    #[arg(long)]
    base_url: String,

    /// Target application name
    #[arg(long)]
    app: String,

    /// Account used to log in
    #[arg(long)]
    username: String,

    /// Directory to archive, relative to the workspace
    #[arg(long, default_value = "dist")]
    source: PathBuf,

    /// Clear the remote application before every upload
    #[arg(long)]
    rapid_deploy: bool,

    /// Overwrite an existing appship.toml
    #[arg(long)]
    force: bool,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appship=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let store = match cli.workspace {
        Some(workspace) => ConfigStore::for_workspace(workspace),
        None => ConfigStore::from_current_dir()?,
    };

    match cli.command {
        Commands::Init(args) => run_init(&store, args),
        Commands::Login { password_stdin } => run_login(&store, password_stdin),
        Commands::Logout => run_logout(&store),
        Commands::Deploy {
            yes,
            format,
            allow_outside_workspace,
        } => {
            let outcome = run_deploy(&store, yes, allow_outside_workspace)?;
            print_outcome(&outcome, format)?;
            if !outcome.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Config => run_config(&store),
    }
}

fn run_init(store: &ConfigStore, args: InitArgs) -> Result<()> {
    if store.exists() && !args.force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            store.config_path().display()
        );
    }

    let mut config = store.load().unwrap_or_default();
    config.deploy = Some(
        DeploymentConfig::new(args.base_url, args.app, args.username, args.source)
            .with_rapid_deploy(args.rapid_deploy),
    );
    store.save(&config)?;

    println!("✓ Wrote {}", store.config_path().display());
    println!("  Run 'appship login' to store the password");
    Ok(())
}

fn require_target(store: &ConfigStore) -> Result<DeploymentConfig> {
    let config: AppshipConfig = store.load()?;
    config.deploy.with_context(|| {
        format!(
            "No [deploy] section in {}; run 'appship init' first",
            store.config_path().display()
        )
    })
}

fn run_login(store: &ConfigStore, password_stdin: bool) -> Result<()> {
    let target = require_target(store)?;
    let credential = if password_stdin {
        prompts::read_password_line(std::io::stdin().lock())?
    } else {
        prompts::prompt_password(&target)?
    };

    KeyringSecretStore::new()
        .store(&target.base_url, &target.username, &credential)
        .context("Failed to store password")?;

    println!(
        "✓ Stored password for {} at {}",
        target.username, target.base_url
    );
    Ok(())
}

fn run_logout(store: &ConfigStore) -> Result<()> {
    let target = require_target(store)?;
    let removed = KeyringSecretStore::new()
        .delete(&target.base_url, &target.username)
        .context("Failed to remove password")?;

    if removed {
        println!("✓ Removed password for {}", target.username);
    } else {
        println!("• No stored password for {}", target.username);
    }
    Ok(())
}

fn run_deploy(
    store: &ConfigStore,
    yes: bool,
    allow_outside_workspace: bool,
) -> Result<DeployOutcome> {
    let deployer = if yes {
        Deployer::new(FileConfigProvider, KeyringSecretStore::new(), AlwaysConfirm)
    } else {
        Deployer::new(FileConfigProvider, KeyringSecretStore::new(), TerminalConfirm)
    };
    let options = DeployOptions::new(store.workspace())
        .with_confine_to_workspace(!allow_outside_workspace);
    tracing::debug!(workspace = %store.workspace().display(), yes, "Starting deploy");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    Ok(runtime.block_on(deployer.deploy(&options)))
}

fn print_outcome(outcome: &DeployOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcome)?);
        }
        OutputFormat::Table => match outcome {
            DeployOutcome::NotAttempted { reason } => {
                println!("{} {}", style("•").dim(), reason);
            }
            DeployOutcome::Completed(report) => {
                if report.result.is_success() {
                    println!(
                        "{} Deployed '{}'",
                        style("✓").green().bold(),
                        report.app_name
                    );
                } else {
                    println!(
                        "{} Deployment of '{}' failed: {}",
                        style("✗").red().bold(),
                        report.app_name,
                        report.result
                    );
                }

                if let Some(archive) = &report.archive {
                    println!(
                        "  Archive: {} files, {} bytes, blake3 {}",
                        archive.file_count,
                        archive.size_bytes,
                        &archive.digest[..archive.digest.len().min(12)]
                    );
                }
                if report.cleared {
                    println!("  Remote state was cleared");
                }
                if let Some(message) = &report.message {
                    let label = if report.result.surfaces_upstream_message() {
                        "Server"
                    } else {
                        "Reason"
                    };
                    println!("  {}: {}", label, message);
                }

                let elapsed = report.finished_at - report.started_at;
                println!("  Took {} ms", elapsed.num_milliseconds());
            }
        },
    }
    Ok(())
}

fn run_config(store: &ConfigStore) -> Result<()> {
    println!("Config file: {}", store.config_path().display());
    let Some(target) = store.load()?.deploy else {
        println!("  {}", style("No [deploy] section").yellow());
        return Ok(());
    };

    println!("  base_url:      {}", target.base_url);
    println!("  app_name:      {}", target.app_name);
    println!("  username:      {}", target.username);
    println!(
        "  source_path:   {}",
        target.resolved_source_path(store.workspace()).display()
    );
    println!("  rapid_deploy:  {}", target.rapid_deploy);
    println!("  timeout:       {}s", target.timeout().as_secs());
    for (label, url) in [
        ("auth_url", target.auth_url()),
        ("clear_url", target.clear_url()),
        ("deploy_url", target.deploy_url()),
    ] {
        match url {
            Ok(url) => println!("  {:<14} {}", format!("{label}:"), url),
            Err(e) => println!("  {:<14} {}", format!("{label}:"), style(format!("{e:#}")).red()),
        }
    }

    let lookup = KeyringSecretStore::new().get(&target.base_url, &target.username);
    let state = password_state(&lookup);
    if lookup.is_err() {
        println!("  password:      {}", style(state).red());
    } else {
        println!("  password:      {}", state);
    }
    Ok(())
}

fn password_state(lookup: &Result<Option<Credential>, SecretStoreError>) -> String {
    match lookup {
        Ok(Some(_)) => "stored".to_string(),
        Ok(None) => "not stored".to_string(),
        Err(e) => format!("unavailable ({})", e),
    }
}

//! Clap derive structures for the `fwsh` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fwsh -- edit, validate and deploy firewall configuration
#[derive(Debug, Parser)]
#[command(
    name = "fwsh",
    version,
    about = "Edit, validate and deploy firewall configuration",
    long_about = "An operator console for a firewall configuration kept in git.\n\n\
        Edits are validated, pushed to the device through its management API\n\
        and committed only once the device has accepted them.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Defaults to the interactive menu.
    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration file
    #[arg(long, short = 'c', env = "FWSH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log file (the terminal belongs to the editor and the menu)
    #[arg(long, env = "FWSH_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

impl GlobalOpts {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(fwsh_config::config_path)
    }
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive menu (default)
    Shell,

    /// Edit, validate and deploy the configuration once
    #[command(alias = "conf")]
    Edit,

    /// Discard uncommitted edits and redeploy the committed revision
    Rollback,

    /// Commit the configuration file and push
    Commit,

    /// Manage the fwsh configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update the device profile with guided setup
    Init,

    /// Display the resolved configuration
    Show,

    /// Store the device password in the system keyring
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into operator-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use fwsh_config::ConfigError;
use fwsh_core::{CoreError, DeployStage};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONFIG: i32 = 4;
    pub const VERSION_CONTROL: i32 = 5;
    pub const DEPLOY: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("No device profile configured")]
    #[diagnostic(
        code(fwsh::no_profile),
        help(
            "Create one with: fwsh config init\n\
             Expected in: {path}"
        )
    )]
    NoProfile { path: String },

    #[error("No password configured for {user}@{host}")]
    #[diagnostic(
        code(fwsh::no_credentials),
        help(
            "Store one with: fwsh config set-password\n\
             Or set the FWSH_PASSWORD environment variable."
        )
    )]
    NoCredentials { user: String, host: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fwsh::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(fwsh::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(fwsh::keyring),
        help("Use password_env or a plaintext password in the config file instead.")
    )]
    Keyring { message: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fwsh::auth_failed),
        help("Check the user and password with: fwsh config init")
    )]
    AuthFailed { message: String },

    #[error("Device API error: {message}")]
    #[diagnostic(
        code(fwsh::remote),
        help("Check that the management API is running: fwsh config show")
    )]
    Remote { message: String },

    #[error("Deploy stopped at {stage}: {message}")]
    #[diagnostic(
        code(fwsh::deploy_failed),
        help(
            "The file was not committed. Fix it with: fwsh edit\n\
             Or return to the committed revision with: fwsh rollback"
        )
    )]
    Deploy { stage: DeployStage, message: String },

    // ── Local tools ──────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(fwsh::git))]
    VersionControl { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(fwsh::editor),
        help("Set workspace.editor in the config file, or VISUAL / EDITOR.")
    )]
    Editor { message: String },

    #[error("{message}")]
    #[diagnostic(code(fwsh::validator))]
    Validator { message: String },

    #[error("{message}")]
    #[diagnostic(code(fwsh::command))]
    Command { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Prompt failed: {message}")]
    #[diagnostic(code(fwsh::prompt))]
    Prompt { message: String },

    #[error("{message}")]
    #[diagnostic(code(fwsh::session))]
    Session { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize config: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NoProfile { .. } | Self::Config(_) | Self::Keyring { .. } => exit_code::CONFIG,
            Self::Validation { .. } => exit_code::USAGE,
            Self::VersionControl { .. } => exit_code::VERSION_CONTROL,
            Self::Deploy { .. } => exit_code::DEPLOY,
            Self::Remote { .. } => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }
}

pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt {
        message: e.to_string(),
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EditorLaunch { .. } | CoreError::EditorExit { .. } => CliError::Editor {
                message: err.to_string(),
            },
            CoreError::Validator { .. } => CliError::Validator {
                message: err.to_string(),
            },
            CoreError::VersionControl { .. } => CliError::VersionControl {
                message: err.to_string(),
            },
            CoreError::Authentication { message } => CliError::AuthFailed { message },
            CoreError::Remote { message } => CliError::Remote { message },
            CoreError::Deploy { stage, message } => CliError::Deploy { stage, message },
            CoreError::Command { .. } => CliError::Command {
                message: err.to_string(),
            },
            CoreError::Prompt { message } => CliError::Prompt { message },
            CoreError::Io(e) => CliError::Io(e),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { user, host } => CliError::NoCredentials { user, host },
            ConfigError::Keyring(message) => CliError::Keyring { message },
            ConfigError::Serialization(e) => CliError::Toml(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Client(e) => CoreError::from(e).into(),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

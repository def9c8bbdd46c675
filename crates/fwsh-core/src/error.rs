// ── Core error types ──
//
// Every collaborator failure surfaces as a `CoreError`. The session turns
// these into a `SessionOutcome`; the lifecycle operations return them to
// the shell. The `From<fwsh_api::Error>` impl hides HTTP details behind
// device-level wording.

use thiserror::Error;

use crate::model::DeployStage;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Editor ───────────────────────────────────────────────────────
    #[error("Cannot launch editor '{program}': {reason}")]
    EditorLaunch { program: String, reason: String },

    #[error("Editor '{program}' exited with {status}")]
    EditorExit { program: String, status: String },

    // ── Validator ────────────────────────────────────────────────────
    #[error("Validator could not be run: {message}")]
    Validator { message: String },

    // ── Version control ──────────────────────────────────────────────
    #[error("git {operation} failed: {message}")]
    VersionControl {
        operation: &'static str,
        message: String,
    },

    // ── Remote device ────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("{message}")]
    Remote { message: String },

    #[error("{stage} failed: {message}")]
    Deploy { stage: DeployStage, message: String },

    // ── Terminal ─────────────────────────────────────────────────────
    #[error("Command '{command}' failed: {message}")]
    Command { command: String, message: String },

    #[error("Prompt failed: {message}")]
    Prompt { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fwsh_api::Error> for CoreError {
    fn from(err: fwsh_api::Error) -> Self {
        match err {
            fwsh_api::Error::Authentication { message } => CoreError::Authentication { message },
            fwsh_api::Error::Remote { message, .. } => CoreError::Remote { message },
            fwsh_api::Error::Transport(ref e) => {
                let message = if e.is_timeout() {
                    "device did not answer in time".to_owned()
                } else if e.is_connect() {
                    let url = e.url().map_or_else(|| "<unknown>".into(), ToString::to_string);
                    format!("cannot reach device API at {url}")
                } else {
                    e.to_string()
                };
                CoreError::Remote { message }
            }
            fwsh_api::Error::InvalidUrl(e) => CoreError::Remote {
                message: format!("invalid API URL: {e}"),
            },
            fwsh_api::Error::Tls(message) => CoreError::Remote {
                message: format!("TLS error: {message}"),
            },
        }
    }
}

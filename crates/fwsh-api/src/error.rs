use thiserror::Error;

/// Top-level error type for the `fwsh-api` crate.
///
/// `fwsh-core` maps these into session-level failures; the deploy stage
/// that produced the error is tracked by the caller, not here.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API rejected the configured user/password.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Remote ──────────────────────────────────────────────────────
    /// The API answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Remote { status: u16, message: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Remote { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// HTTP status of the failed call, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

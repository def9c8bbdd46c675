// ── Session data model ──
//
// Values produced and consumed within one edit session. Nothing here is
// persisted: the configuration file itself lives on disk under git.

use std::fmt;
use std::num::NonZeroUsize;

use strum::{Display, EnumIter};

// ── EditCursor ───────────────────────────────────────────────────────

/// Where the next editor invocation places the cursor.
///
/// Line numbers are 1-based; the default cursor opens the file at the top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditCursor(Option<NonZeroUsize>);

impl EditCursor {
    /// Open at the top of the file.
    pub const fn top() -> Self {
        Self(None)
    }

    /// Open at the given 1-based line.
    pub const fn at(line: NonZeroUsize) -> Self {
        Self(Some(line))
    }

    pub const fn line(self) -> Option<NonZeroUsize> {
        self.0
    }

    pub const fn is_set(self) -> bool {
        self.0.is_some()
    }
}

impl From<Option<NonZeroUsize>> for EditCursor {
    fn from(line: Option<NonZeroUsize>) -> Self {
        Self(line)
    }
}

// ── Validation ───────────────────────────────────────────────────────

/// Result of one validate-and-reformat attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The file parsed and now holds its canonical form.
    Valid,
    /// The file was rejected; it is left exactly as the operator wrote it.
    Invalid {
        message: String,
        line: Option<NonZeroUsize>,
    },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

// ── Deploy ───────────────────────────────────────────────────────────

/// One remote step. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum DeployStage {
    #[strum(to_string = "reload")]
    Reload,
    #[strum(to_string = "apply")]
    Apply,
    #[strum(to_string = "save")]
    Save,
}

/// Result of running the deploy stages against the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployResult {
    Success,
    /// `stage` is the first stage that failed; later stages never ran.
    Failure { stage: DeployStage, message: String },
}

// ── Recovery ─────────────────────────────────────────────────────────

/// Operator decision after a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryChoice {
    /// Reopen the editor, at the reported line when there is one.
    Retry,
    /// Throw the edits away and restore the last committed revision.
    Cancel,
}

// ── Session outcome ──────────────────────────────────────────────────

/// Why a session ended in [`SessionOutcome::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Editor(String),
    VersionControl(String),
    /// The validator could not be run at all (not a rejected config).
    Validator(String),
    Prompt(String),
    Deploy {
        stage: DeployStage,
        message: String,
    },
    /// The device accepted the configuration but git refused the commit.
    /// The device and the local history now disagree.
    CommitAfterDeploy(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editor(msg)
            | Self::VersionControl(msg)
            | Self::Validator(msg)
            | Self::Prompt(msg) => f.write_str(msg),
            Self::Deploy { stage, message } => write!(f, "{stage} failed: {message}"),
            Self::CommitAfterDeploy(msg) => write!(
                f,
                "deployed, but the commit failed ({msg}); the device runs a configuration \
                 that is not in the history"
            ),
        }
    }
}

/// Terminal result of one [`EditSession`](crate::EditSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    NoChange,
    /// Deployed and committed. A failed push is reported, not rolled back.
    Deployed { push_error: Option<String> },
    /// Edits discarded. A failed stash is reported; the session still ends.
    Cancelled { stash_error: Option<String> },
    Failed(FailureReason),
}

impl SessionOutcome {
    /// Whether the shell should report plain success.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::NoChange
                | Self::Deployed { push_error: None }
                | Self::Cancelled { stash_error: None }
        )
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChange => f.write_str("Nothing changed."),
            Self::Deployed { push_error: None } => f.write_str("OK!"),
            Self::Deployed {
                push_error: Some(err),
            } => write!(f, "OK! (push failed: {err})"),
            Self::Cancelled { stash_error: None } => f.write_str("Changes cancelled."),
            Self::Cancelled {
                stash_error: Some(err),
            } => write!(f, "Changes cancelled, but restoring the file failed: {err}"),
            Self::Failed(reason) => fmt::Display::fmt(reason, f),
        }
    }
}

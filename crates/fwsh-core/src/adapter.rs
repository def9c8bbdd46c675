// ── Collaborator seams ──
//
// The session only talks to the outside world through these traits.
// Production implementations spawn processes or call the device API;
// tests substitute in-memory fakes.

use std::future::Future;
use std::num::NonZeroUsize;
use std::path::Path;

use crate::error::CoreError;
use crate::model::{EditCursor, RecoveryChoice, ValidationOutcome};

/// Foreground editor invocation.
pub trait Editor {
    /// Open `path` at `cursor` and wait for the editor to exit.
    fn launch(
        &self,
        path: &Path,
        cursor: EditCursor,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Syntactic/semantic check plus canonicalization of the configuration.
pub trait Validator {
    /// On `Valid` the file at `path` has been rewritten in canonical form.
    /// On `Invalid` it is untouched. `Err` means the validator itself
    /// could not run.
    fn validate_and_reformat(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<ValidationOutcome, CoreError>> + Send;
}

/// The version-controlled working tree holding the configuration file.
pub trait VersionControl {
    /// Whether the file differs from the last committed revision.
    fn has_changes(&self) -> impl Future<Output = Result<bool, CoreError>> + Send;

    /// Discard uncommitted edits, restoring the last committed revision.
    fn stash(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Record the current file content as a new revision.
    fn commit(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Propagate local commits to the shared remote.
    fn push(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// The running device's management API.
pub trait RemoteDeploy {
    fn reload(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn apply(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn save(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Whether this deployment runs the `save` stage at all.
    fn supports_save(&self) -> bool;
}

/// The operator, asked to choose after a validation failure.
pub trait OperatorPrompt {
    fn recover(
        &mut self,
        message: &str,
        line: Option<NonZeroUsize>,
    ) -> Result<RecoveryChoice, CoreError>;
}

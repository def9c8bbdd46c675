//! Edit-validate-deploy lifecycle for a firewall configuration file.
//!
//! - **[`DeploymentLifecycle`]**: the operations the menu shell invokes:
//!   [`edit_configuration()`](DeploymentLifecycle::edit_configuration),
//!   [`rollback_and_redeploy()`](DeploymentLifecycle::rollback_and_redeploy)
//!   and [`commit_and_push()`](DeploymentLifecycle::commit_and_push).
//!
//! - **[`EditSession`]**: one edit attempt: editor → change check →
//!   validation (with cancel-or-retry recovery) → deploy → commit. Owns the
//!   [`EditCursor`] for the duration of the attempt.
//!
//! - **Collaborators** ([`adapter`]): traits for the editor, validator,
//!   version control, remote device and operator prompt, with process-backed
//!   implementations in [`editor`], [`validator`], [`vcs`] and [`remote`].

pub mod adapter;
pub mod editor;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod process;
pub mod remote;
pub mod session;
pub mod validator;
pub mod vcs;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapter::{Editor, OperatorPrompt, RemoteDeploy, Validator, VersionControl};
pub use editor::CommandEditor;
pub use error::CoreError;
pub use lifecycle::DeploymentLifecycle;
pub use model::{
    DeployResult, DeployStage, EditCursor, FailureReason, RecoveryChoice, SessionOutcome,
    ValidationOutcome,
};
pub use session::EditSession;
pub use validator::{CommandValidator, ConfiguredValidator, JsonValidator, parse_line_hint};
pub use vcs::{Git, PushPolicy};

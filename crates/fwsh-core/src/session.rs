// ── Edit session ──
//
// One operator attempt at changing the configuration:
//
//   Editing → CheckingChanged → Validating ─┬→ CheckingChanged → Deploying → Committing → Done
//      ↑                                    └→ Recovering ─┬→ Editing (retry)
//      └───────────────────────────────────────────────────┘  └→ Done (cancel)
//
// The cursor is owned by the session, so a failed line from one attempt
// can never leak into the next one.

use std::num::NonZeroUsize;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::adapter::{Editor, OperatorPrompt, RemoteDeploy, Validator, VersionControl};
use crate::model::{
    DeployResult, EditCursor, FailureReason, RecoveryChoice, SessionOutcome, ValidationOutcome,
};
use crate::remote;

#[derive(Debug)]
enum State {
    Editing,
    /// `validated` is true on the second check, after canonicalization.
    CheckingChanged {
        validated: bool,
    },
    Validating,
    Recovering {
        message: String,
        line: Option<NonZeroUsize>,
    },
    Deploying,
    Committing,
    Done(SessionOutcome),
}

/// Drives one edit-validate-deploy attempt over borrowed collaborators.
pub struct EditSession<'a, E, V, G, R> {
    path: &'a Path,
    editor: &'a E,
    validator: &'a V,
    vcs: &'a G,
    remote: &'a R,
    cursor: EditCursor,
}

impl<'a, E, V, G, R> EditSession<'a, E, V, G, R>
where
    E: Editor,
    V: Validator,
    G: VersionControl,
    R: RemoteDeploy,
{
    pub fn new(path: &'a Path, editor: &'a E, validator: &'a V, vcs: &'a G, remote: &'a R) -> Self {
        Self {
            path,
            editor,
            validator,
            vcs,
            remote,
            cursor: EditCursor::top(),
        }
    }

    /// Where the editor would open next.
    pub fn cursor(&self) -> EditCursor {
        self.cursor
    }

    /// Run the state machine to a terminal outcome.
    pub async fn run(&mut self, prompt: &mut impl OperatorPrompt) -> SessionOutcome {
        let mut state = State::Editing;
        loop {
            debug!(?state, "edit session");
            state = match state {
                State::Editing => self.edit().await,
                State::CheckingChanged { validated } => self.check_changed(validated).await,
                State::Validating => self.validate().await,
                State::Recovering { message, line } => self.recover(prompt, &message, line).await,
                State::Deploying => self.deploy().await,
                State::Committing => self.commit().await,
                State::Done(outcome) => {
                    info!(%outcome, "edit session finished");
                    return outcome;
                }
            };
        }
    }

    async fn edit(&mut self) -> State {
        match self.editor.launch(self.path, self.cursor).await {
            Ok(()) => State::CheckingChanged { validated: false },
            Err(err) => State::Done(SessionOutcome::Failed(FailureReason::Editor(
                err.to_string(),
            ))),
        }
    }

    async fn check_changed(&mut self, validated: bool) -> State {
        match self.vcs.has_changes().await {
            Ok(false) => {
                info!(validated, "configuration unchanged");
                State::Done(SessionOutcome::NoChange)
            }
            Ok(true) if validated => State::Deploying,
            Ok(true) => State::Validating,
            Err(err) => State::Done(SessionOutcome::Failed(FailureReason::VersionControl(
                err.to_string(),
            ))),
        }
    }

    async fn validate(&mut self) -> State {
        match self.validator.validate_and_reformat(self.path).await {
            Ok(ValidationOutcome::Valid) => {
                self.cursor = EditCursor::top();
                State::CheckingChanged { validated: true }
            }
            Ok(ValidationOutcome::Invalid { message, line }) => {
                State::Recovering { message, line }
            }
            Err(err) => State::Done(SessionOutcome::Failed(FailureReason::Validator(
                err.to_string(),
            ))),
        }
    }

    async fn recover(
        &mut self,
        prompt: &mut impl OperatorPrompt,
        message: &str,
        line: Option<NonZeroUsize>,
    ) -> State {
        match prompt.recover(message, line) {
            Ok(RecoveryChoice::Retry) => {
                if let Some(line) = line {
                    self.cursor = EditCursor::at(line);
                }
                State::Editing
            }
            Ok(RecoveryChoice::Cancel) => {
                self.cursor = EditCursor::top();
                let stash_error = match self.vcs.stash().await {
                    Ok(()) => None,
                    Err(err) => {
                        warn!(error = %err, "stash during cancel failed");
                        Some(err.to_string())
                    }
                };
                State::Done(SessionOutcome::Cancelled { stash_error })
            }
            // The edits stay on disk; nothing is thrown away on a broken prompt.
            Err(err) => State::Done(SessionOutcome::Failed(FailureReason::Prompt(
                err.to_string(),
            ))),
        }
    }

    async fn deploy(&mut self) -> State {
        let stages = remote::full_sequence(self.remote);
        match remote::run_stages(self.remote, &stages).await {
            DeployResult::Success => State::Committing,
            DeployResult::Failure { stage, message } => {
                State::Done(SessionOutcome::Failed(FailureReason::Deploy { stage, message }))
            }
        }
    }

    async fn commit(&mut self) -> State {
        if let Err(err) = self.vcs.commit().await {
            warn!(error = %err, "commit after successful deploy failed");
            return State::Done(SessionOutcome::Failed(FailureReason::CommitAfterDeploy(
                err.to_string(),
            )));
        }
        let push_error = self.vcs.push().await.err().map(|err| err.to_string());
        State::Done(SessionOutcome::Deployed { push_error })
    }
}

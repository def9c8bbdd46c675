// ── Deployment lifecycle ──
//
// The three operations the shell exposes. Each call is independent;
// nothing carries over between edit sessions.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::adapter::{Editor, OperatorPrompt, RemoteDeploy, Validator, VersionControl};
use crate::error::CoreError;
use crate::model::{DeployResult, DeployStage, SessionOutcome};
use crate::remote;
use crate::session::EditSession;

/// Stages rerun after a rollback; the saved configuration is left alone.
const ROLLBACK_STAGES: [DeployStage; 2] = [DeployStage::Reload, DeployStage::Apply];

/// Owns the collaborators for one configuration file.
pub struct DeploymentLifecycle<E, V, G, R> {
    config_file: PathBuf,
    editor: E,
    validator: V,
    vcs: G,
    remote: R,
}

impl<E, V, G, R> DeploymentLifecycle<E, V, G, R>
where
    E: Editor,
    V: Validator,
    G: VersionControl,
    R: RemoteDeploy,
{
    pub fn new(config_file: PathBuf, editor: E, validator: V, vcs: G, remote: R) -> Self {
        Self {
            config_file,
            editor,
            validator,
            vcs,
            remote,
        }
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Run a fresh [`EditSession`] to completion.
    pub async fn edit_configuration(&self, prompt: &mut impl OperatorPrompt) -> SessionOutcome {
        EditSession::new(
            &self.config_file,
            &self.editor,
            &self.validator,
            &self.vcs,
            &self.remote,
        )
        .run(prompt)
        .await
    }

    /// Discard uncommitted edits and bring the device back to HEAD.
    ///
    /// The deploy is not attempted when the stash fails.
    pub async fn rollback_and_redeploy(&self) -> Result<(), CoreError> {
        self.vcs.stash().await?;
        info!(file = %self.config_file.display(), "rolled back to last commit");
        match remote::run_stages(&self.remote, &ROLLBACK_STAGES).await {
            DeployResult::Success => Ok(()),
            DeployResult::Failure { stage, message } => Err(CoreError::Deploy { stage, message }),
        }
    }

    /// Commit the file as it stands and push. No validation or deploy.
    pub async fn commit_and_push(&self) -> Result<(), CoreError> {
        self.vcs.commit().await?;
        self.vcs.push().await
    }
}

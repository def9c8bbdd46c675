// ── Git working tree ──
//
// The configuration file lives in a git working tree; HEAD is the last
// revision the device accepted. All commands run from the file's
// directory and are scoped to the one file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::adapter::VersionControl;
use crate::error::CoreError;
use crate::process;

/// Whether and where commits are pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PushPolicy {
    /// `push()` succeeds without doing anything.
    Disabled,
    /// Plain `git push` (upstream of the current branch).
    #[default]
    Upstream,
    /// `git push <remote> HEAD`.
    Remote(String),
}

/// Git adapter for a single tracked file.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    file: OsString,
    commit_message: Option<String>,
    push: PushPolicy,
}

impl Git {
    /// Track `path`; git runs in its parent directory.
    pub fn for_file(path: &Path) -> Result<Self, CoreError> {
        let file = path
            .file_name()
            .ok_or_else(|| CoreError::VersionControl {
                operation: "setup",
                message: format!("'{}' is not a file path", path.display()),
            })?
            .to_owned();
        let workdir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(Self {
            workdir,
            file,
            commit_message: None,
            push: PushPolicy::default(),
        })
    }

    /// Commit with `-m <template>` instead of opening git's editor.
    /// `{timestamp}` expands to the local time in RFC 3339.
    #[must_use]
    pub fn with_commit_message(mut self, template: Option<String>) -> Self {
        self.commit_message = template;
        self
    }

    #[must_use]
    pub fn with_push(mut self, push: PushPolicy) -> Self {
        self.push = push;
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.workdir);
        cmd
    }

    /// Fail unless the work tree has a committed `HEAD` to diff against.
    async fn verify_head(&self) -> Result<(), CoreError> {
        let mut cmd = self.git();
        cmd.args(["rev-parse", "--verify", "--quiet", "HEAD^{commit}"]);
        let output = process::run_captured(cmd).await.map_err(vcs_error("diff"))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match stderr.trim() {
            "" => "no committed revision to compare against",
            text => text,
        };
        Err(CoreError::VersionControl {
            operation: "diff",
            message: format!("{}: {reason}", self.workdir.display()),
        })
    }

    fn commit_message(&self) -> Option<String> {
        self.commit_message
            .as_ref()
            .map(|t| t.replace("{timestamp}", &Local::now().to_rfc3339()))
    }
}

/// Map a process failure into a version-control error for `operation`.
fn vcs_error(operation: &'static str) -> impl FnOnce(CoreError) -> CoreError {
    move |err| match err {
        CoreError::Command { message, .. } => CoreError::VersionControl { operation, message },
        other => other,
    }
}

impl VersionControl for Git {
    async fn has_changes(&self) -> Result<bool, CoreError> {
        // Outside a work tree `git diff` silently switches to `--no-index`
        // and exits 1, which would read as "changed".
        self.verify_head().await?;

        let mut cmd = self.git();
        cmd.args(["diff", "--quiet", "--exit-code", "HEAD", "--"])
            .arg(&self.file);

        let output = process::run_captured(cmd).await.map_err(vcs_error("diff"))?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(CoreError::VersionControl {
                operation: "diff",
                message: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }),
        }
    }

    async fn stash(&self) -> Result<(), CoreError> {
        let mut cmd = self.git();
        cmd.args(["stash", "push", "--quiet", "--"]).arg(&self.file);
        process::run_checked(cmd).await.map_err(vcs_error("stash"))?;
        info!(file = ?self.file, "uncommitted changes stashed");
        Ok(())
    }

    async fn commit(&self) -> Result<(), CoreError> {
        let mut cmd = self.git();
        cmd.arg("commit");
        match self.commit_message() {
            Some(message) => {
                cmd.arg("-m").arg(message).arg("--").arg(&self.file);
                process::run_checked(cmd).await.map_err(vcs_error("commit"))?;
            }
            None => {
                // git opens the operator's editor for the message.
                cmd.arg("--").arg(&self.file);
                process::run_in_terminal(cmd)
                    .await
                    .map_err(vcs_error("commit"))?;
            }
        }
        info!(file = ?self.file, "configuration committed");
        Ok(())
    }

    async fn push(&self) -> Result<(), CoreError> {
        let mut cmd = self.git();
        cmd.arg("push");
        match &self.push {
            PushPolicy::Disabled => {
                debug!("push disabled");
                return Ok(());
            }
            PushPolicy::Upstream => {}
            PushPolicy::Remote(remote) => {
                cmd.arg(remote).arg("HEAD");
            }
        }
        process::run_in_terminal(cmd).await.map_err(|e| {
            warn!(error = %e, "push failed");
            vcs_error("push")(e)
        })
    }
}

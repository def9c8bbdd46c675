// ── Process helpers ──
//
// Two ways to run a tool: in the operator's terminal (inherited stdio,
// blocks until exit) or captured (output collected for error messages).

use std::ffi::OsStr;
use std::process::{Output, Stdio};

use tokio::process::Command;
use tracing::debug;

use crate::error::CoreError;

/// Render a command line for logs and error messages.
pub fn describe(cmd: &Command) -> String {
    let std = cmd.as_std();
    let mut parts = vec![std.get_program().to_string_lossy().into_owned()];
    parts.extend(std.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Run with the terminal attached. A non-zero exit is an error.
pub async fn run_in_terminal(mut cmd: Command) -> Result<(), CoreError> {
    let command = describe(&cmd);
    debug!(%command, "running in terminal");

    let status = cmd
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| CoreError::Command {
            command: command.clone(),
            message: e.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CoreError::Command {
            command,
            message: format!("exited with {status}"),
        })
    }
}

/// Run with output captured. Only a spawn failure is an error; the caller
/// decides what the exit status means.
pub async fn run_captured(mut cmd: Command) -> Result<Output, CoreError> {
    let command = describe(&cmd);
    debug!(%command, "running captured");

    cmd.stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| CoreError::Command {
            command,
            message: e.to_string(),
        })
}

/// Run captured and turn a non-zero exit into an error carrying both
/// output streams.
pub async fn run_checked(cmd: Command) -> Result<Output, CoreError> {
    let command = describe(&cmd);
    let output = run_captured(cmd).await?;
    if output.status.success() {
        return Ok(output);
    }
    Err(CoreError::Command {
        command,
        message: format!(
            "{}\nstdout: {}\nstderr: {}",
            output.status,
            String::from_utf8_lossy(&output.stdout).trim(),
            String::from_utf8_lossy(&output.stderr).trim(),
        ),
    })
}

/// Run a shell snippet (`sh -c`) in the terminal.
pub async fn run_shell(script: impl AsRef<OsStr>) -> Result<(), CoreError> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    run_in_terminal(cmd).await
}

/// Run a shell snippet with output discarded, ignoring its exit status.
pub async fn run_shell_quiet(script: impl AsRef<OsStr>) {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(script)
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Err(e) = run_captured(cmd).await {
        debug!(error = %e, "quiet shell command failed");
    }
}

// External editor launcher.

use std::path::Path;

use tokio::process::Command;
use tracing::info;

use crate::adapter::Editor;
use crate::error::CoreError;
use crate::model::EditCursor;

/// Fallback when nothing is configured: the Debian `editor` alternative.
pub const DEFAULT_EDITOR: &str = "editor";

/// An editor command line, invoked as `<program> [args..] [+N] <path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEditor {
    program: String,
    args: Vec<String>,
}

impl CommandEditor {
    /// Parse a whitespace-separated command line such as `"vim -n"`.
    ///
    /// Returns `None` for an empty command line.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Configured editor, then `$VISUAL`, then `$EDITOR`, then `editor`.
    pub fn resolve(configured: Option<&str>) -> Self {
        configured
            .and_then(Self::parse)
            .or_else(|| std::env::var("VISUAL").ok().as_deref().and_then(Self::parse))
            .or_else(|| std::env::var("EDITOR").ok().as_deref().and_then(Self::parse))
            .unwrap_or_else(|| Self {
                program: DEFAULT_EDITOR.to_owned(),
                args: Vec::new(),
            })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for one invocation, cursor hint first.
    pub fn invocation_args(&self, path: &Path, cursor: EditCursor) -> Vec<String> {
        let mut args = self.args.clone();
        if let Some(line) = cursor.line() {
            args.push(format!("+{line}"));
        }
        args.push(path.display().to_string());
        args
    }
}

impl Editor for CommandEditor {
    async fn launch(&self, path: &Path, cursor: EditCursor) -> Result<(), CoreError> {
        info!(editor = %self.program, line = ?cursor.line(), "opening editor");

        let status = Command::new(&self.program)
            .args(self.invocation_args(path, cursor))
            .status()
            .await
            .map_err(|e| CoreError::EditorLaunch {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CoreError::EditorExit {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    #[test]
    fn parse_splits_program_and_args() {
        let editor = CommandEditor::parse("  nvim -n  ").unwrap();
        assert_eq!(editor.program(), "nvim");
        assert_eq!(
            editor.invocation_args(Path::new("dynamic"), EditCursor::top()),
            ["-n", "dynamic"]
        );
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(CommandEditor::parse("   ").is_none());
    }

    #[test]
    fn cursor_becomes_plus_line() {
        let editor = CommandEditor::parse("editor").unwrap();
        let cursor = EditCursor::at(NonZeroUsize::new(42).unwrap());
        assert_eq!(
            editor.invocation_args(Path::new("dynamic"), cursor),
            ["+42", "dynamic"]
        );
    }

    #[test]
    fn configured_editor_wins() {
        let editor = CommandEditor::resolve(Some("vi"));
        assert_eq!(editor.program(), "vi");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let editor = CommandEditor::parse("false").unwrap();
        let err = editor
            .launch(Path::new("/dev/null"), EditCursor::top())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::EditorExit { .. }));
    }

    #[tokio::test]
    async fn missing_editor_fails_to_launch() {
        let editor = CommandEditor::parse("/nonexistent/fwsh-editor").unwrap();
        let err = editor
            .launch(Path::new("dynamic"), EditCursor::top())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::EditorLaunch { .. }));
    }
}

// ── Validators ──
//
// Both validators follow the same contract: a rejected file is never
// touched, an accepted file is replaced by its canonical text in one
// atomic rename so a crash can't leave half a configuration behind.

use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, info};

use crate::adapter::Validator;
use crate::error::CoreError;
use crate::model::ValidationOutcome;
use crate::process;

/// Diagnostic marker carrying the offending line, e.g. `line#42`.
static LINE_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"line#(\d+)").expect("line hint regex should compile - static pattern")
});

/// Extract the 1-based line from the first `line#<N>` marker.
///
/// `line#0` and numbers that overflow are treated as no hint.
pub fn parse_line_hint(diagnostic: &str) -> Option<NonZeroUsize> {
    LINE_HINT
        .captures(diagnostic)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<NonZeroUsize>().ok())
}

/// Replace `path` with `content` via a temp file in the same directory,
/// keeping its permissions.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), CoreError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let permissions = std::fs::metadata(path).map(|m| m.permissions()).ok();

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ── External command ─────────────────────────────────────────────────

/// Runs `<program> [args..] <path>`.
///
/// Exit 0 accepts the file: non-empty stdout is taken as the canonical
/// text and written back, empty stdout means the tool rewrote the file
/// itself. Any other exit rejects it, with stderr (or stdout when stderr
/// is empty) as the diagnostic.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    program: String,
    args: Vec<String>,
}

impl CommandValidator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a `["program", "arg", ...]` list. `None` if empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl Validator for CommandValidator {
    async fn validate_and_reformat(&self, path: &Path) -> Result<ValidationOutcome, CoreError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(path);

        let output = process::run_captured(cmd)
            .await
            .map_err(|e| CoreError::Validator {
                message: e.to_string(),
            })?;

        if output.status.success() {
            if output.stdout.is_empty() {
                debug!("validator rewrote the file in place");
            } else {
                write_atomic(path, &output.stdout)?;
            }
            info!(path = %path.display(), "configuration valid");
            return Ok(ValidationOutcome::Valid);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostic = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_owned()
        } else {
            stderr.trim().to_owned()
        };
        let message = if diagnostic.is_empty() {
            format!("validator exited with {}", output.status)
        } else {
            diagnostic
        };

        let line = parse_line_hint(&message);
        info!(line = ?line, "configuration rejected");
        Ok(ValidationOutcome::Invalid { message, line })
    }
}

// ── Built-in JSON ────────────────────────────────────────────────────

/// Canonicalizes JSON configurations: two-space indentation, trailing
/// newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonValidator;

impl JsonValidator {
    /// Canonical text for `raw`, or the parse error message and line.
    pub fn canonicalize(raw: &str) -> Result<String, (String, Option<NonZeroUsize>)> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| (e.to_string(), NonZeroUsize::new(e.line())))?;
        let mut text = serde_json::to_string_pretty(&value)
            .map_err(|e| (e.to_string(), None::<NonZeroUsize>))?;
        text.push('\n');
        Ok(text)
    }
}

impl Validator for JsonValidator {
    async fn validate_and_reformat(&self, path: &Path) -> Result<ValidationOutcome, CoreError> {
        let raw = tokio::fs::read_to_string(path).await?;
        match Self::canonicalize(&raw) {
            Ok(text) => {
                if text != raw {
                    write_atomic(path, text.as_bytes())?;
                }
                Ok(ValidationOutcome::Valid)
            }
            Err((message, line)) => Ok(ValidationOutcome::Invalid { message, line }),
        }
    }
}

// ── Selected at startup ──────────────────────────────────────────────

/// The validator chosen by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredValidator {
    Command(CommandValidator),
    Json(JsonValidator),
}

impl Validator for ConfiguredValidator {
    async fn validate_and_reformat(&self, path: &Path) -> Result<ValidationOutcome, CoreError> {
        match self {
            Self::Command(v) => v.validate_and_reformat(path).await,
            Self::Json(v) => v.validate_and_reformat(path).await,
        }
    }
}

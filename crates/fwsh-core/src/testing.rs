// In-memory collaborators for session and lifecycle tests.
//
// Every fake is a cheap clone over shared state, so a test can hand one
// copy to the code under test and keep another for assertions. All of them
// append to one `Journal` so call order can be checked across fakes.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapter::{Editor, OperatorPrompt, RemoteDeploy, Validator, VersionControl};
use crate::error::CoreError;
use crate::lifecycle::DeploymentLifecycle;
use crate::model::{DeployStage, EditCursor, RecoveryChoice, ValidationOutcome};
use crate::session::EditSession;

pub fn line(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

pub fn invalid(message: &str) -> ValidationOutcome {
    ValidationOutcome::Invalid {
        message: message.to_owned(),
        line: None,
    }
}

pub fn invalid_at(message: &str, n: usize) -> ValidationOutcome {
    ValidationOutcome::Invalid {
        message: message.to_owned(),
        line: Some(line(n)),
    }
}

pub fn uppercase_canonical(raw: &str) -> String {
    raw.to_uppercase()
}

// ── Journal ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: &str) {
        self.0.lock().unwrap().push(entry.to_owned());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.lock().unwrap().iter().any(|e| e == entry)
    }

    /// Entries after the last occurrence of `marker`.
    pub fn entries_after(&self, marker: &str) -> Vec<String> {
        let entries = self.entries();
        let start = entries
            .iter()
            .rposition(|e| e == marker)
            .map_or(0, |i| i + 1);
        entries[start..].to_vec()
    }
}

// ── Editor ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct EditorScript {
    /// `None` leaves the file as it is.
    edits: VecDeque<Option<String>>,
    cursors: Vec<EditCursor>,
    fail: bool,
}

#[derive(Debug, Clone)]
pub struct ScriptedEditor {
    journal: Journal,
    script: Arc<Mutex<EditorScript>>,
}

impl ScriptedEditor {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            script: Arc::default(),
        }
    }

    /// Next launch replaces the file with `content`.
    pub fn push_edit(&self, content: &str) {
        self.script
            .lock()
            .unwrap()
            .edits
            .push_back(Some(content.to_owned()));
    }

    /// Next launch exits without saving.
    pub fn push_unchanged(&self) {
        self.script.lock().unwrap().edits.push_back(None);
    }

    pub fn fail(&self) {
        self.script.lock().unwrap().fail = true;
    }

    pub fn cursors(&self) -> Vec<EditCursor> {
        self.script.lock().unwrap().cursors.clone()
    }
}

impl Editor for ScriptedEditor {
    async fn launch(&self, path: &Path, cursor: EditCursor) -> Result<(), CoreError> {
        self.journal.record("edit");
        let mut script = self.script.lock().unwrap();
        script.cursors.push(cursor);
        if script.fail {
            return Err(CoreError::EditorLaunch {
                program: "scripted".into(),
                reason: "no such file or directory".into(),
            });
        }
        if let Some(Some(content)) = script.edits.pop_front() {
            std::fs::write(path, content)?;
        }
        Ok(())
    }
}

// ── Validator ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ValidatorScript {
    outcomes: VecDeque<ValidationOutcome>,
    canonicalize: Option<fn(&str) -> String>,
}

/// Returns queued outcomes, then `Valid` once the queue is empty.
#[derive(Debug, Clone)]
pub struct ScriptedValidator {
    journal: Journal,
    script: Arc<Mutex<ValidatorScript>>,
}

impl ScriptedValidator {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            script: Arc::default(),
        }
    }

    pub fn push(&self, outcome: ValidationOutcome) {
        self.script.lock().unwrap().outcomes.push_back(outcome);
    }

    fn set_canonicalizer(&self, f: fn(&str) -> String) {
        self.script.lock().unwrap().canonicalize = Some(f);
    }
}

impl Validator for ScriptedValidator {
    async fn validate_and_reformat(&self, path: &Path) -> Result<ValidationOutcome, CoreError> {
        self.journal.record("validate");
        let mut script = self.script.lock().unwrap();
        let outcome = script
            .outcomes
            .pop_front()
            .unwrap_or(ValidationOutcome::Valid);
        if outcome.is_valid() {
            if let Some(canonicalize) = script.canonicalize {
                let raw = std::fs::read_to_string(path)?;
                std::fs::write(path, canonicalize(&raw))?;
            }
        }
        Ok(outcome)
    }
}

// ── Version control ──────────────────────────────────────────────────

#[derive(Debug, Default)]
struct RepoState {
    committed: String,
    stash_error: Option<String>,
    commit_error: Option<String>,
    push_error: Option<String>,
}

/// A one-file "repository": HEAD is a string held in memory.
#[derive(Debug, Clone)]
pub struct FakeRepo {
    journal: Journal,
    path: PathBuf,
    state: Arc<Mutex<RepoState>>,
}

impl FakeRepo {
    pub fn new(journal: &Journal, path: &Path, committed: &str) -> Self {
        Self {
            journal: journal.clone(),
            path: path.to_path_buf(),
            state: Arc::new(Mutex::new(RepoState {
                committed: committed.to_owned(),
                ..RepoState::default()
            })),
        }
    }

    pub fn committed(&self) -> String {
        self.state.lock().unwrap().committed.clone()
    }

    pub fn fail_stash(&self, message: &str) {
        self.state.lock().unwrap().stash_error = Some(message.to_owned());
    }

    pub fn fail_commit(&self, message: &str) {
        self.state.lock().unwrap().commit_error = Some(message.to_owned());
    }

    pub fn fail_push(&self, message: &str) {
        self.state.lock().unwrap().push_error = Some(message.to_owned());
    }

    fn error(operation: &'static str, message: &str) -> CoreError {
        CoreError::VersionControl {
            operation,
            message: message.to_owned(),
        }
    }
}

impl VersionControl for FakeRepo {
    async fn has_changes(&self) -> Result<bool, CoreError> {
        self.journal.record("has_changes");
        let current = std::fs::read_to_string(&self.path)?;
        Ok(current != self.state.lock().unwrap().committed)
    }

    async fn stash(&self) -> Result<(), CoreError> {
        self.journal.record("stash");
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.stash_error {
            return Err(Self::error("stash", message));
        }
        std::fs::write(&self.path, &state.committed)?;
        Ok(())
    }

    async fn commit(&self) -> Result<(), CoreError> {
        self.journal.record("commit");
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.commit_error {
            return Err(Self::error("commit", message));
        }
        state.committed = std::fs::read_to_string(&self.path)?;
        Ok(())
    }

    async fn push(&self) -> Result<(), CoreError> {
        self.journal.record("push");
        match &self.state.lock().unwrap().push_error {
            Some(message) => Err(Self::error("push", message)),
            None => Ok(()),
        }
    }
}

// ── Remote ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FakeRemote {
    journal: Journal,
    save: bool,
    failure: Option<(DeployStage, String)>,
}

impl FakeRemote {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            save: false,
            failure: None,
        }
    }

    #[must_use]
    pub fn with_save(mut self) -> Self {
        self.save = true;
        self
    }

    #[must_use]
    pub fn failing_at(mut self, stage: DeployStage, message: &str) -> Self {
        self.failure = Some((stage, message.to_owned()));
        self
    }

    fn stage(&self, stage: DeployStage) -> Result<(), CoreError> {
        self.journal.record(&stage.to_string());
        match &self.failure {
            Some((failing, message)) if *failing == stage => Err(CoreError::Remote {
                message: message.clone(),
            }),
            _ => Ok(()),
        }
    }
}

impl RemoteDeploy for FakeRemote {
    async fn reload(&self) -> Result<(), CoreError> {
        self.stage(DeployStage::Reload)
    }

    async fn apply(&self) -> Result<(), CoreError> {
        self.stage(DeployStage::Apply)
    }

    async fn save(&self) -> Result<(), CoreError> {
        self.stage(DeployStage::Save)
    }

    fn supports_save(&self) -> bool {
        self.save
    }
}

// ── Prompt ───────────────────────────────────────────────────────────

/// Answers with queued choices; an empty queue is a broken terminal.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    choices: VecDeque<RecoveryChoice>,
    seen: Vec<(String, Option<NonZeroUsize>)>,
}

impl ScriptedPrompt {
    pub fn new(choices: impl IntoIterator<Item = RecoveryChoice>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
            seen: Vec::new(),
        }
    }

    pub fn seen(&self) -> Vec<(String, Option<NonZeroUsize>)> {
        self.seen.clone()
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn recover(
        &mut self,
        message: &str,
        line: Option<NonZeroUsize>,
    ) -> Result<RecoveryChoice, CoreError> {
        self.seen.push((message.to_owned(), line));
        self.choices.pop_front().ok_or_else(|| CoreError::Prompt {
            message: "terminal closed".into(),
        })
    }
}

// ── Fixture ──────────────────────────────────────────────────────────

/// A committed configuration file in a temp dir plus one of each fake.
pub struct Fixture {
    _dir: tempfile::TempDir,
    pub path: PathBuf,
    pub journal: Journal,
    pub editor: ScriptedEditor,
    pub validator: ScriptedValidator,
    pub vcs: FakeRepo,
    pub remote: FakeRemote,
}

impl Fixture {
    pub fn new(committed: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dynamic");
        std::fs::write(&path, committed).unwrap();
        let journal = Journal::default();
        Self {
            editor: ScriptedEditor::new(&journal),
            validator: ScriptedValidator::new(&journal),
            vcs: FakeRepo::new(&journal, &path, committed),
            remote: FakeRemote::new(&journal),
            journal,
            path,
            _dir: dir,
        }
    }

    #[must_use]
    pub fn with_canonicalizer(self, f: fn(&str) -> String) -> Self {
        self.validator.set_canonicalizer(f);
        self
    }

    #[must_use]
    pub fn with_save(mut self) -> Self {
        self.remote = self.remote.with_save();
        self
    }

    #[must_use]
    pub fn with_remote_failure(mut self, stage: DeployStage, message: &str) -> Self {
        self.remote = self.remote.failing_at(stage, message);
        self
    }

    pub fn session(&self) -> EditSession<'_, ScriptedEditor, ScriptedValidator, FakeRepo, FakeRemote> {
        EditSession::new(
            &self.path,
            &self.editor,
            &self.validator,
            &self.vcs,
            &self.remote,
        )
    }

    pub fn lifecycle(
        &self,
    ) -> DeploymentLifecycle<ScriptedEditor, ScriptedValidator, FakeRepo, FakeRemote> {
        DeploymentLifecycle::new(
            self.path.clone(),
            self.editor.clone(),
            self.validator.clone(),
            self.vcs.clone(),
            self.remote.clone(),
        )
    }

    pub fn file_content(&self) -> String {
        std::fs::read_to_string(&self.path).unwrap()
    }
}

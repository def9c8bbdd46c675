//! Subcommand handlers.

pub mod config_cmd;
pub mod menu;

use owo_colors::OwoColorize;

use fwsh_core::SessionOutcome;

use crate::app;
use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::prompt::DialoguerPrompt;

/// One edit session outside the menu.
pub async fn edit(global: &GlobalOpts) -> Result<(), CliError> {
    let (_, lifecycle) = app::open(&global.config_path())?;
    let outcome = lifecycle.edit_configuration(&mut DialoguerPrompt).await;
    finish(&outcome)
}

/// Print a successful outcome, or hand a failed one back as the command's
/// error so `main` renders it once.
fn finish(outcome: &SessionOutcome) -> Result<(), CliError> {
    if outcome.is_success() {
        report_outcome(outcome);
        Ok(())
    } else {
        Err(CliError::Session {
            message: outcome.to_string(),
        })
    }
}

pub async fn rollback(global: &GlobalOpts) -> Result<(), CliError> {
    let (_, lifecycle) = app::open(&global.config_path())?;
    lifecycle.rollback_and_redeploy().await?;
    report_ok();
    Ok(())
}

pub async fn commit(global: &GlobalOpts) -> Result<(), CliError> {
    let (_, lifecycle) = app::open(&global.config_path())?;
    lifecycle.commit_and_push().await?;
    report_ok();
    Ok(())
}

// ── Output ──────────────────────────────────────────────────────────

pub fn report_ok() {
    eprintln!("{}", "OK!".green().bold());
}

pub fn report_error(err: &dyn std::fmt::Display) {
    eprintln!("{}", err.to_string().red());
}

pub fn report_outcome(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Deployed { push_error: None } => report_ok(),
        SessionOutcome::Deployed {
            push_error: Some(_),
        }
        | SessionOutcome::Cancelled {
            stash_error: Some(_),
        } => eprintln!("{}", outcome.to_string().yellow()),
        SessionOutcome::NoChange | SessionOutcome::Cancelled { stash_error: None } => {
            eprintln!("{outcome}");
        }
        SessionOutcome::Failed(_) => report_error(outcome),
    }
}

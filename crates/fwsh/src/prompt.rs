//! Terminal prompt shown after a rejected configuration.

use std::num::NonZeroUsize;

use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use owo_colors::OwoColorize;

use fwsh_core::{CoreError, OperatorPrompt, RecoveryChoice};

const CHOICES: [&str; 2] = ["Return to the editor", "Cancel the changes"];

/// Asks through `dialoguer`; Esc cancels.
#[derive(Debug, Default)]
pub struct DialoguerPrompt;

impl OperatorPrompt for DialoguerPrompt {
    fn recover(
        &mut self,
        message: &str,
        line: Option<NonZeroUsize>,
    ) -> Result<RecoveryChoice, CoreError> {
        eprintln!();
        eprintln!("{} {message}", "Error:".red().bold());
        if let Some(line) = line {
            eprintln!("  reopening at line {line}");
        }

        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("There are errors")
            .items(&CHOICES)
            .default(0)
            .interact_opt()
            .map_err(|e| CoreError::Prompt {
                message: e.to_string(),
            })?;

        Ok(match choice {
            Some(0) => RecoveryChoice::Retry,
            _ => RecoveryChoice::Cancel,
        })
    }
}

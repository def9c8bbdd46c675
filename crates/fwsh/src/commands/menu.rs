//! The interactive menu.
//!
//! Every entry runs to completion in the foreground and then reports
//! `OK!` or a one-line error before the menu comes back.

use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{info, warn};

use fwsh_config::ShellCommands;
use fwsh_core::{CoreError, process};

use crate::app;
use crate::cli::GlobalOpts;
use crate::commands::{report_error, report_ok, report_outcome};
use crate::error::{CliError, prompt_err};
use crate::prompt::DialoguerPrompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
enum Entry {
    #[strum(to_string = "config terminal")]
    ConfigTerminal,
    #[strum(to_string = "show interfaces")]
    ShowInterfaces,
    #[strum(to_string = "show arp")]
    ShowArp,
    /// Commit the running file and push.
    #[strum(to_string = "copy running-config startup-config")]
    CommitRunning,
    /// Roll back to the committed revision and redeploy it.
    #[strum(to_string = "copy startup-config running-config")]
    RestoreStartup,
    #[strum(to_string = "linux terminal")]
    LinuxTerminal,
    #[strum(to_string = "exit")]
    Exit,
}

pub async fn run(global: &GlobalOpts) -> Result<(), CliError> {
    let (cfg, lifecycle) = app::open(&global.config_path())?;
    let entries: Vec<Entry> = Entry::iter().collect();
    let labels: Vec<String> = entries.iter().map(ToString::to_string).collect();
    let mut selected = 0;

    loop {
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("fwsh")
            .items(&labels)
            .default(selected)
            .interact_opt()
            .map_err(prompt_err)?;
        let Some(index) = choice else {
            return Ok(());
        };
        selected = index;
        let Some(&entry) = entries.get(index) else {
            continue;
        };
        info!(%entry, "menu");

        match entry {
            Entry::ConfigTerminal => {
                let outcome = lifecycle.edit_configuration(&mut DialoguerPrompt).await;
                report_outcome(&outcome);
            }
            Entry::ShowInterfaces => report(process::run_shell(&cfg.shell.show_interfaces).await),
            Entry::ShowArp => report(process::run_shell(&cfg.shell.show_arp).await),
            Entry::CommitRunning => report(lifecycle.commit_and_push().await),
            Entry::RestoreStartup => report(lifecycle.rollback_and_redeploy().await),
            Entry::LinuxTerminal => report(linux_terminal(&cfg.shell).await),
            Entry::Exit => return Ok(()),
        }
    }
}

fn report(result: Result<(), CoreError>) {
    match result {
        Ok(()) => report_ok(),
        Err(e) => {
            warn!(error = %e, "menu action failed");
            report_error(&e);
        }
    }
}

/// Attach to the shared session; if that fails, clear stale sessions and
/// start a new one.
async fn linux_terminal(shell: &ShellCommands) -> Result<(), CoreError> {
    if process::run_shell(&shell.terminal_attach).await.is_ok() {
        return Ok(());
    }
    process::run_shell_quiet(&shell.terminal_cleanup).await;
    process::run_shell(&shell.terminal_create).await
}

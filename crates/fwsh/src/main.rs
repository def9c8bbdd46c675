mod app;
mod cli;
mod commands;
mod error;
mod progress;
mod prompt;

use std::path::{Path, PathBuf};

use clap::Parser;
use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::error::{CliError, exit_code};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let guard = init_tracing(cli.global.verbose, cli.global.log_file.as_deref());

    let code = match run(cli).await {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            tracing::error!(error = %err, code, "fwsh failed");
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    // `exit` skips destructors; flush the log writer first.
    drop(guard);
    std::process::exit(code);
}

fn default_log_file() -> PathBuf {
    ProjectDirs::from("org", "fwsh", "fwsh").map_or_else(
        || std::env::temp_dir().join("fwsh.log"),
        |dirs| dirs.cache_dir().join("fwsh.log"),
    )
}

/// File-only tracing: stdout and stderr belong to the editor, the pager
/// and the menu. Logging is skipped if the file can't be opened.
fn init_tracing(verbosity: u8, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fwsh={level},fwsh_core={level},fwsh_api={level},fwsh_config={level}"
        ))
    });

    let path = log_file.map_or_else(default_log_file, Path::to_path_buf);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .map_or_else(|| "fwsh.log".into(), |n| n.to_string_lossy().into_owned());

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .ok()?;
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Some(guard)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => commands::menu::run(&cli.global).await,
        Command::Edit => commands::edit(&cli.global).await,
        Command::Rollback => commands::rollback(&cli.global).await,
        Command::Commit => commands::commit(&cli.global).await,

        // Config commands don't need the device
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "fwsh", &mut std::io::stdout());
            Ok(())
        }
    }
}

//! Wiring: configuration in, a ready [`DeploymentLifecycle`] out.

use std::io::IsTerminal;
use std::path::Path;

use tracing::{debug, info};

use fwsh_api::DeployClient;
use fwsh_config::{Config, ConfigError, RemoteProfile};
use fwsh_core::{CommandEditor, ConfiguredValidator, DeploymentLifecycle, Git};

use crate::commands::config_cmd;
use crate::error::CliError;
use crate::progress::WithSpinner;

pub type Lifecycle =
    DeploymentLifecycle<CommandEditor, ConfiguredValidator, Git, WithSpinner<DeployClient>>;

/// Load the config, bootstrapping the device profile when it is missing or
/// unusable and a terminal is available. A broken validator setting is
/// reported before any prompting.
pub fn load_with_profile(path: &Path) -> Result<(Config, DeployClient), CliError> {
    let mut cfg = fwsh_config::load_config(path)?;
    cfg.validator.build()?;

    match cfg.remote.as_ref().map(RemoteProfile::deploy_client) {
        Some(Ok(client)) => return Ok((cfg, client)),
        Some(Err(
            err @ (ConfigError::Validation { .. } | ConfigError::NoCredentials { .. }),
        )) => {
            debug!(error = %err, "device profile incomplete");
            if !std::io::stdin().is_terminal() {
                return Err(err.into());
            }
        }
        Some(Err(err)) => return Err(err.into()),
        None => {
            if !std::io::stdin().is_terminal() {
                return Err(CliError::NoProfile {
                    path: path.display().to_string(),
                });
            }
        }
    }

    config_cmd::wizard(&mut cfg, path)?;
    let client = cfg
        .remote
        .as_ref()
        .ok_or_else(|| CliError::NoProfile {
            path: path.display().to_string(),
        })?
        .deploy_client()?;
    Ok((cfg, client))
}

/// Build the lifecycle for the configured workspace.
pub fn lifecycle(cfg: &Config, client: DeployClient) -> Result<Lifecycle, CliError> {
    let validator = cfg.validator.build()?;
    let file = cfg.workspace.config_file.clone();
    let editor = CommandEditor::resolve(cfg.workspace.editor.as_deref());
    let git = Git::for_file(&file)?
        .with_commit_message(cfg.workspace.commit_message.clone())
        .with_push(cfg.workspace.push_policy());

    info!(
        file = %file.display(),
        editor = editor.program(),
        api = %client.base_url(),
        save = client.supports_save(),
        "lifecycle ready"
    );
    Ok(DeploymentLifecycle::new(
        file,
        editor,
        validator,
        git,
        WithSpinner::new(client),
    ))
}

pub fn open(path: &Path) -> Result<(Config, Lifecycle), CliError> {
    let (cfg, client) = load_with_profile(path)?;
    let lifecycle = lifecycle(&cfg, client)?;
    Ok((cfg, lifecycle))
}

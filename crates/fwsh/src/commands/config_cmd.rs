//! Config subcommand handlers and the device profile wizard.

use std::path::Path;

use dialoguer::{Input, Select};
use owo_colors::OwoColorize;

use fwsh_config::{Config, RemoteProfile, profile_fields, server};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::{CliError, prompt_err};

const REDACTED: &str = "********";

// ── Wizard ──────────────────────────────────────────────────────────

/// Prompt for every profile field, re-asking until each value passes its
/// check, then save `cfg` to `path`.
///
/// Existing values are offered as defaults, so an incomplete profile only
/// needs the missing parts.
pub fn wizard(cfg: &mut Config, path: &Path) -> Result<(), CliError> {
    eprintln!("fwsh: device API profile");
    eprintln!("   Config path: {}\n", path.display());

    let mut profile = cfg.remote.clone().unwrap_or_default();

    for field in profile_fields() {
        loop {
            let input = if field.secret {
                prompt_secret(field.prompt, &profile)?
            } else {
                let current = field.current(&profile);
                let default = if current.is_empty() {
                    field.default.to_owned()
                } else {
                    current
                };
                Input::<String>::new()
                    .with_prompt(field.prompt)
                    .default(default)
                    .interact_text()
                    .map_err(prompt_err)?
            };

            match field.apply(&mut profile, &input) {
                Ok(()) => break,
                Err(e) => eprintln!("   {} {e}", "✗".red()),
            }
        }
    }

    offer_keyring(&mut profile)?;
    cfg.remote = Some(profile);
    fwsh_config::save_config(cfg, path)?;

    eprintln!("\n{} Configuration written to {}", "✓".green(), path.display());
    Ok(())
}

/// Read a password without echo. Empty input keeps the stored password or
/// falls back to the API server's default for this user.
fn prompt_secret(label: &str, profile: &RemoteProfile) -> Result<String, CliError> {
    let fallback = match profile.password.clone() {
        Some(pw) => Some(pw),
        None => discover_default(profile),
    };
    let hint = if fallback.is_some() {
        " (empty keeps the default)"
    } else {
        ""
    };
    let input = rpassword::prompt_password(format!("{label}{hint}: ")).map_err(prompt_err)?;
    Ok(if input.is_empty() {
        fallback.unwrap_or_default()
    } else {
        input
    })
}

fn discover_default(profile: &RemoteProfile) -> Option<String> {
    let path = profile.server_config.as_deref()?;
    match server::default_password(path, &profile.user) {
        Ok(pw) => pw,
        Err(e) => {
            tracing::debug!(error = %e, "no default password from server config");
            None
        }
    }
}

fn offer_keyring(profile: &mut RemoteProfile) -> Result<(), CliError> {
    let Some(password) = profile.password.clone() else {
        return Ok(());
    };

    let store_choices = &[
        "Store password in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if store_selection == 0 {
        fwsh_config::store_password(profile, &password)?;
        profile.password = None;
        eprintln!("   {} Password stored in system keyring", "✓".green());
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = global.config_path();
    match args.command {
        ConfigCommand::Init => {
            let mut cfg = fwsh_config::load_config(&path)?;
            wizard(&mut cfg, &path)
        }

        ConfigCommand::Show => {
            let cfg = fwsh_config::load_config(&path)?;
            print!("{}", render(&cfg)?);
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = fwsh_config::load_config(&path)?;
            let profile = cfg.remote.as_ref().ok_or_else(|| CliError::NoProfile {
                path: path.display().to_string(),
            })?;

            let secret = rpassword::prompt_password(format!(
                "Password for {}: ",
                profile.keyring_key()
            ))
            .map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }

            fwsh_config::store_password(profile, &secret)?;
            eprintln!(
                "{} Password stored in system keyring for {}",
                "✓".green(),
                profile.keyring_key()
            );
            Ok(())
        }
    }
}

/// TOML view of `cfg` with the plaintext password masked.
pub fn render(cfg: &Config) -> Result<String, CliError> {
    let mut shown = cfg.clone();
    if let Some(remote) = shown.remote.as_mut() {
        if remote.password.is_some() {
            remote.password = Some(REDACTED.into());
        }
    }
    Ok(toml::to_string_pretty(&shown)?)
}

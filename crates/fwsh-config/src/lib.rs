//! Configuration for the fwsh shell.
//!
//! One TOML file holds the workspace (which file, which editor, how to
//! commit), the validator, the remote device profile and the shell menu
//! commands. Loading layers defaults, the file and `FWSH_` environment
//! variables. Credentials resolve through env, keyring and plaintext, and
//! the remote profile translates into a ready [`fwsh_api::DeployClient`].

pub mod schema;
pub mod server;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use fwsh_api::{Credentials, DeployClient, TlsMode, TransportConfig};
use fwsh_core::{CommandValidator, ConfiguredValidator, JsonValidator, PushPolicy};

pub use schema::{ProfileField, profile_fields};

/// Keyring service name for stored device passwords.
pub const KEYRING_SERVICE: &str = "fwsh";

/// Environment variable consulted before the keyring.
pub const PASSWORD_ENV: &str = "FWSH_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for {user}@{host}")]
    NoCredentials { user: String, host: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error(transparent)]
    Client(#[from] fwsh_api::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub workspace: Workspace,

    #[serde(default)]
    pub validator: ValidatorSettings,

    /// Device API profile. Absent until the bootstrap wizard has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteProfile>,

    #[serde(default)]
    pub shell: ShellCommands,
}

/// The git working tree and the file under edit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Workspace {
    /// Configuration file inside a git working tree.
    #[serde(default = "default_config_file")]
    pub config_file: PathBuf,

    /// Editor command line; falls back to `$VISUAL`, `$EDITOR`, `editor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Commit message template (`{timestamp}` is expanded). Without one,
    /// git opens the editor for the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,

    #[serde(default = "default_true")]
    pub push: bool,

    /// Push to `<remote> HEAD` instead of the branch upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_remote: Option<String>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            config_file: default_config_file(),
            editor: None,
            commit_message: None,
            push: true,
            push_remote: None,
        }
    }
}

impl Workspace {
    pub fn push_policy(&self) -> PushPolicy {
        match (&self.push_remote, self.push) {
            (_, false) => PushPolicy::Disabled,
            (Some(remote), true) => PushPolicy::Remote(remote.clone()),
            (None, true) => PushPolicy::Upstream,
        }
    }
}

fn default_config_file() -> PathBuf {
    PathBuf::from("/etc/fwsm/dynamic")
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorKind {
    /// External program, see [`CommandValidator`].
    Command,
    /// Built-in JSON canonicalizer.
    #[default]
    Json,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValidatorSettings {
    #[serde(default)]
    pub kind: ValidatorKind,

    /// `["program", "arg", ...]`; the file path is appended.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}

impl ValidatorSettings {
    pub fn build(&self) -> Result<ConfiguredValidator, ConfigError> {
        match self.kind {
            ValidatorKind::Json => Ok(ConfiguredValidator::Json(JsonValidator)),
            ValidatorKind::Command => CommandValidator::from_argv(&self.command)
                .map(ConfiguredValidator::Command)
                .ok_or_else(|| ConfigError::Validation {
                    field: "validator.command".into(),
                    reason: "kind = \"command\" needs a non-empty command".into(),
                }),
        }
    }
}

/// Connection profile for the device management API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteProfile {
    pub host: String,
    pub port: u16,
    pub user: String,

    /// Plaintext password. Prefer the keyring or `password_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable holding the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// "http" or "https".
    pub scheme: String,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Accept self-signed certificates.
    pub insecure: bool,

    /// PEM file with a custom CA.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// The device persists its running configuration with `save`.
    pub save: bool,

    /// The API server's own INI config, used to discover the default
    /// password during bootstrap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_config: Option<PathBuf>,
}

impl Default for RemoteProfile {
    fn default() -> Self {
        Self {
            host: schema::DEFAULT_HOST.into(),
            port: schema::DEFAULT_PORT,
            user: schema::DEFAULT_USER.into(),
            password: None,
            password_env: None,
            scheme: schema::DEFAULT_SCHEME.into(),
            timeout: 30,
            insecure: false,
            ca_cert: None,
            save: false,
            server_config: None,
        }
    }
}

impl RemoteProfile {
    /// `{scheme}://{host}:{port}/`
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = format!("{}://{}:{}/", self.scheme, self.host, self.port);
        raw.parse().map_err(|e| ConfigError::Validation {
            field: "remote".into(),
            reason: format!("invalid API URL '{raw}': {e}"),
        })
    }

    /// Run every schema check over the stored values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for field in profile_fields() {
            if field.secret {
                continue;
            }
            field.check(&field.current(self))?;
        }
        Ok(())
    }

    /// Keyring entry name for this profile's password.
    pub fn keyring_key(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca) = self.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };
        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout),
        }
    }

    /// Build the API client with the resolved password.
    pub fn deploy_client(&self) -> Result<DeployClient, ConfigError> {
        self.validate()?;
        let password = resolve_password(self)?;
        let credentials = Credentials::new(self.user.clone(), password);
        let client = DeployClient::new(self.base_url()?, credentials, &self.transport())?;
        Ok(client.with_save(self.save))
    }
}

/// Shell snippets behind the non-lifecycle menu entries (`sh -c`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShellCommands {
    pub show_interfaces: String,
    pub show_arp: String,
    /// Attach to the shared terminal session.
    pub terminal_attach: String,
    /// Run when attaching fails, before creating a new session.
    pub terminal_cleanup: String,
    pub terminal_create: String,
}

impl Default for ShellCommands {
    fn default() -> Self {
        Self {
            show_interfaces: "clear; ifconfig | less".into(),
            show_arp: "clear; arp -na | sort | less".into(),
            terminal_attach: "reset; screen -x -S fwshTerminal".into(),
            terminal_cleanup: "kill $(ls /var/run/screen/*/*.fwshTerminal 2>/dev/null \
                               | sed -e 's%.*/%%g' -e 's%\\..*%%g') 2>/dev/null"
                .into(),
            terminal_create: "screen -S fwshTerminal /bin/bash".into(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "fwsh", "fwsh").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fwsh");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then `FWSH_*` variables
/// (`FWSH_REMOTE__HOST` sets `remote.host`).
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading configuration");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("FWSH_")
                .ignore(&["config", "password", "log_file"])
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize to TOML and write `path`, readable by the owner only.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        // `mode` only applies on creation.
        if path.exists() {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
    }
    let mut file = options.open(path)?;
    file.write_all(toml_str.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// `password_env` → `FWSH_PASSWORD` → keyring → plaintext.
pub fn resolve_password(profile: &RemoteProfile) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Shared env var
    if let Ok(val) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &profile.keyring_key()) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        user: profile.user.clone(),
        host: profile.host.clone(),
    })
}

/// Store the profile's password in the system keyring.
pub fn store_password(profile: &RemoteProfile, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &profile.keyring_key())?;
    entry.set_password(password)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn jail_err(e: ConfigError) -> figment::Error {
        figment::Error::from(e.to_string())
    }

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|_jail| {
            let cfg = load_config(Path::new("missing.toml")).map_err(jail_err)?;
            assert_eq!(cfg.workspace.config_file, PathBuf::from("/etc/fwsm/dynamic"));
            assert!(cfg.workspace.push);
            assert_eq!(cfg.validator.kind, ValidatorKind::Json);
            assert!(cfg.remote.is_none());
            assert!(cfg.shell.show_arp.contains("arp -na"));
            Ok(())
        });
    }

    #[test]
    fn file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    [workspace]
                    config_file = "/srv/fw/dynamic"
                    commit_message = "deploy {timestamp}"
                    push_remote = "origin"

                    [validator]
                    kind = "command"
                    command = ["fwsm-check", "--reformat"]

                    [remote]
                    host = "10.0.0.1"
                    save = true
                "#,
            )?;
            jail.set_env("FWSH_REMOTE__PORT", "9443");
            jail.set_env("FWSH_PASSWORD", "ignored-by-figment");

            let cfg = load_config(Path::new("config.toml")).map_err(jail_err)?;
            let remote = cfg.remote.unwrap();
            assert_eq!(remote.host, "10.0.0.1");
            assert_eq!(remote.port, 9443);
            assert_eq!(remote.user, schema::DEFAULT_USER);
            assert!(remote.save);
            assert_eq!(
                cfg.workspace.push_policy(),
                PushPolicy::Remote("origin".into())
            );
            assert!(matches!(
                cfg.validator.build().unwrap(),
                ConfiguredValidator::Command(_)
            ));
            Ok(())
        });
    }

    #[test]
    fn push_disabled_wins_over_remote() {
        let ws = Workspace {
            push: false,
            push_remote: Some("origin".into()),
            ..Workspace::default()
        };
        assert_eq!(ws.push_policy(), PushPolicy::Disabled);
        assert_eq!(Workspace::default().push_policy(), PushPolicy::Upstream);
    }

    #[test]
    fn command_validator_needs_command() {
        let settings = ValidatorSettings {
            kind: ValidatorKind::Command,
            command: Vec::new(),
        };
        assert!(matches!(
            settings.build(),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn base_url_from_parts() {
        let profile = RemoteProfile {
            host: "fw.example".into(),
            port: 9000,
            scheme: "https".into(),
            ..RemoteProfile::default()
        };
        assert_eq!(profile.base_url().unwrap().as_str(), "https://fw.example:9000/");
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let profile = RemoteProfile {
            host: String::new(),
            ..RemoteProfile::default()
        };
        assert!(profile.validate().is_err());

        let profile = RemoteProfile {
            scheme: "ftp".into(),
            ..RemoteProfile::default()
        };
        assert!(profile.validate().is_err());
        assert!(RemoteProfile::default().validate().is_ok());
    }

    #[test]
    fn insecure_beats_custom_ca() {
        let profile = RemoteProfile {
            insecure: true,
            ca_cert: Some("/etc/ssl/fw.pem".into()),
            ..RemoteProfile::default()
        };
        assert!(matches!(profile.transport().tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn password_env_beats_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env("FWSH_TEST_DEVICE_PW", "from-env");
            let profile = RemoteProfile {
                password: Some("plain".into()),
                password_env: Some("FWSH_TEST_DEVICE_PW".into()),
                ..RemoteProfile::default()
            };
            let pw = resolve_password(&profile).map_err(jail_err)?;
            assert_eq!(pw.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn shared_env_var_is_used() {
        Jail::expect_with(|jail| {
            jail.set_env(PASSWORD_ENV, "shared");
            let pw = resolve_password(&RemoteProfile::default()).map_err(jail_err)?;
            assert_eq!(pw.expose_secret(), "shared");
            Ok(())
        });
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            remote: Some(RemoteProfile {
                password: Some("secret".into()),
                ..RemoteProfile::default()
            }),
            ..Config::default()
        };

        save_config(&cfg, &path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[remote]"));
        assert!(text.contains("password = \"secret\""));
    }

    #[test]
    fn saved_config_loads_back() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("config.toml");
            let cfg = Config {
                workspace: Workspace {
                    editor: Some("vim".into()),
                    ..Workspace::default()
                },
                remote: Some(RemoteProfile::default()),
                ..Config::default()
            };
            save_config(&cfg, &path).map_err(jail_err)?;

            let loaded = load_config(&path).map_err(jail_err)?;
            assert_eq!(loaded.workspace.editor.as_deref(), Some("vim"));
            assert_eq!(loaded.remote.unwrap().port, schema::DEFAULT_PORT);
            Ok(())
        });
    }
}

// Default password discovery from the API server's own config.
//
// The server keeps its accounts in an INI file:
//
//   [prod]
//   user0.login = fwsh
//   user0.password = hunter2
//
// Accounts are numbered from 0 without gaps; the first missing or empty
// login ends the list.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::ConfigError;

const ACCOUNTS_SECTION: &str = "prod";

/// Key/value pairs of one INI section. Later keys override earlier ones.
fn section(text: &str, name: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    let mut inside = false;
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            inside = header.trim() == name;
            continue;
        }
        if !inside {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim().to_owned(), unquote(value.trim()).to_owned());
        }
    }
    values
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// The password configured for `user`, if the server defines that account.
pub fn password_for(text: &str, user: &str) -> Option<String> {
    let accounts = section(text, ACCOUNTS_SECTION);
    let mut found = None;
    for id in 0.. {
        let Some(login) = accounts.get(&format!("user{id}.login")) else {
            break;
        };
        if login.is_empty() {
            break;
        }
        if login == user {
            found = accounts.get(&format!("user{id}.password")).cloned();
        }
    }
    found
}

/// Read `path` and look up `user`'s password.
pub fn default_password(path: &Path, user: &str) -> Result<Option<String>, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    let password = password_for(&text, user);
    debug!(path = %path.display(), found = password.is_some(), "server account lookup");
    Ok(password)
}

// ── Remote profile schema ──
//
// The fields the bootstrap wizard asks for, in order. Each field knows its
// default, how to read the current value and how to check and store a new
// one, so the prompt loop needs no knowledge of `RemoteProfile` itself.

use crate::{ConfigError, RemoteProfile};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_USER: &str = "fwsh";
pub const DEFAULT_SCHEME: &str = "http";

/// One prompted profile field.
#[derive(Clone, Copy)]
pub struct ProfileField {
    pub key: &'static str,
    pub prompt: &'static str,
    /// Read without echo and never shown back.
    pub secret: bool,
    pub default: &'static str,
    parse: fn(&str) -> Result<(), String>,
    read: fn(&RemoteProfile) -> String,
    write: fn(&mut RemoteProfile, String),
}

impl ProfileField {
    /// Validate `input` (trimmed) without storing it.
    pub fn check(&self, input: &str) -> Result<(), ConfigError> {
        (self.parse)(input.trim()).map_err(|reason| ConfigError::Validation {
            field: self.key.into(),
            reason,
        })
    }

    /// Validate `input` and store it in `profile`.
    pub fn apply(&self, profile: &mut RemoteProfile, input: &str) -> Result<(), ConfigError> {
        self.check(input)?;
        (self.write)(profile, input.trim().to_owned());
        Ok(())
    }

    /// The value currently held by `profile`, as text.
    pub fn current(&self, profile: &RemoteProfile) -> String {
        (self.read)(profile)
    }
}

impl std::fmt::Debug for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileField")
            .field("key", &self.key)
            .field("secret", &self.secret)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// The remote profile fields in prompt order.
pub fn profile_fields() -> &'static [ProfileField] {
    &FIELDS
}

static FIELDS: [ProfileField; 5] = [
    ProfileField {
        key: "host",
        prompt: "Host",
        secret: false,
        default: DEFAULT_HOST,
        parse: non_empty,
        read: |p| p.host.clone(),
        write: |p, v| p.host = v,
    },
    ProfileField {
        key: "port",
        prompt: "Port",
        secret: false,
        default: "9000",
        parse: |v| parse_port(v).map(drop),
        read: |p| p.port.to_string(),
        write: |p, v| {
            if let Ok(port) = parse_port(&v) {
                p.port = port;
            }
        },
    },
    ProfileField {
        key: "user",
        prompt: "User",
        secret: false,
        default: DEFAULT_USER,
        parse: non_empty,
        read: |p| p.user.clone(),
        write: |p, v| p.user = v,
    },
    ProfileField {
        key: "password",
        prompt: "Password",
        secret: true,
        default: "",
        parse: |_| Ok(()),
        read: |p| p.password.clone().unwrap_or_default(),
        write: |p, v| p.password = (!v.is_empty()).then_some(v),
    },
    ProfileField {
        key: "scheme",
        prompt: "Scheme",
        secret: false,
        default: DEFAULT_SCHEME,
        parse: |v| match v {
            "http" | "https" => Ok(()),
            other => Err(format!("expected 'http' or 'https', got '{other}'")),
        },
        read: |p| p.scheme.clone(),
        write: |p, v| p.scheme = v,
    },
];

fn non_empty(v: &str) -> Result<(), String> {
    if v.is_empty() {
        Err("cannot be empty".into())
    } else {
        Ok(())
    }
}

fn parse_port(v: &str) -> Result<u16, String> {
    match v.parse::<u16>() {
        Ok(0) | Err(_) => Err(format!("expected a port between 1 and 65535, got '{v}'")),
        Ok(port) => Ok(port),
    }
}

/// Look up a field by key.
pub fn field(key: &str) -> Option<&'static ProfileField> {
    FIELDS.iter().find(|f| f.key == key)
}

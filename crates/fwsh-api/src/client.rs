// Management API HTTP client
//
// Wraps `reqwest::Client` with URL construction, basic auth and error
// body unwrapping. Each deploy stage is a bodiless POST; the server acts
// on the configuration file it already shares with the shell.

use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Error bodies come as `{"error": "..."}` or `{"message": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Raw HTTP client for the device management API.
pub struct DeployClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    save_supported: bool,
}

impl DeployClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `http://localhost:9000`.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: Credentials) -> Self {
        Self {
            http,
            base_url,
            credentials,
            save_supported: false,
        }
    }

    /// Advertise (or withdraw) the `save` stage for this deployment.
    #[must_use]
    pub fn with_save(mut self, supported: bool) -> Self {
        self.save_supported = supported;
        self
    }

    /// Whether this deployment persists the active configuration.
    pub fn supports_save(&self) -> bool {
        self.save_supported
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Deploy stages ────────────────────────────────────────────────

    /// Re-read the configuration file into the device's staging area.
    ///
    /// `POST /reload`
    pub async fn reload(&self) -> Result<(), Error> {
        self.post("reload").await
    }

    /// Activate the staged configuration on the live device.
    ///
    /// `POST /apply`
    pub async fn apply(&self) -> Result<(), Error> {
        self.post("apply").await
    }

    /// Persist the active configuration as the boot-time configuration.
    ///
    /// `POST /save`
    pub async fn save(&self) -> Result<(), Error> {
        if !self.save_supported {
            return Err(Error::Remote {
                status: 501,
                message: "save is not supported by this deployment".into(),
            });
        }
        self.post("save").await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Build `{base}/{path}`, keeping any path prefix on the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    async fn post(&self, path: &str) -> Result<(), Error> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let builder = self.credentials.apply(self.http.post(url));
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::check_response(resp).await
    }

    async fn check_response(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            trace!(%status, "request succeeded");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("HTTP {status}"),
            });
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_else(|| preview(&body));
        let message = if message.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_owned()
        } else {
            message
        };

        Err(Error::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

/// First 200 characters of a response body, trimmed.
fn preview(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_owned(),
    }
}

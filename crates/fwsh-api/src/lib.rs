//! Async client for the firewall management API.
//!
//! The device exposes three ordered, non-transactional operations:
//! `reload` stages the configuration file, `apply` activates the staged
//! configuration, and `save` (not available on every deployment) persists
//! the active configuration as the boot-time one.

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;

pub use auth::Credentials;
pub use client::DeployClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};

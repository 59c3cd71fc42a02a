//! Upload server configuration.
//!
//! Provides [`UploadConfig`], loaded from `HTTPUP_*` environment variables.

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::ConfigError;

/// Upload server configuration.
///
/// # Examples
///
/// ```
/// use httpup_core::config::UploadConfig;
///
/// let config = UploadConfig::default();
/// assert_eq!(config.listen_address, "0.0.0.0:8889");
/// assert_eq!(config.storage_path, "data");
/// assert!(config.secret.is_empty());
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadConfig {
    /// Bind address for the HTTP listener.
    #[builder(default = String::from("0.0.0.0:8889"))]
    pub listen_address: String,

    /// Secret shared with the upload issuer. Never serialized.
    #[serde(skip_serializing)]
    #[builder(default)]
    pub secret: String,

    /// Directory where uploaded objects are stored.
    #[builder(default = String::from("data"))]
    pub storage_path: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0:8889"),
            secret: String::new(),
            storage_path: String::from("data"),
            log_level: String::from("info"),
        }
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("listen_address", &self.listen_address)
            .field("secret", &"...")
            .field("storage_path", &self.storage_path)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl UploadConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `HTTPUP_LISTEN_ADDRESS` | `0.0.0.0:8889` |
    /// | `HTTPUP_SECRET` | *(empty)* |
    /// | `HTTPUP_STORAGE_PATH` | `data` |
    /// | `HTTPUP_LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("HTTPUP_LISTEN_ADDRESS") {
            config.listen_address = v;
        }
        if let Some(v) = lookup("HTTPUP_SECRET") {
            config.secret = v;
        }
        if let Some(v) = lookup("HTTPUP_STORAGE_PATH") {
            config.storage_path = v;
        }
        if let Some(v) = lookup("HTTPUP_LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Check the configuration and create the storage directory.
    ///
    /// Returns the address to hand to `tokio::net::TcpListener::bind`.
    /// Host names are kept as given and resolved at bind time; a bare
    /// `:<port>` binds every interface.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidListenAddress`] if the address has no valid port.
    /// - [`ConfigError::EmptySecret`] if no secret is set.
    /// - [`ConfigError::StoragePath`] if the storage directory cannot be created.
    pub fn validate(&self) -> Result<String, ConfigError> {
        let addr = bind_address(&self.listen_address)
            .ok_or_else(|| ConfigError::InvalidListenAddress(self.listen_address.clone()))?;

        if self.secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        let storage = Path::new(&self.storage_path);
        std::fs::create_dir_all(storage).map_err(|source| ConfigError::StoragePath {
            path: storage.to_path_buf(),
            source,
        })?;

        Ok(addr)
    }
}

/// Normalize a `host:port` listen address.
///
/// Socket addresses pass through unchanged, `:<port>` becomes
/// `0.0.0.0:<port>`, and `<host>:<port>` is kept for resolution at bind
/// time. Returns `None` when there is no numeric port.
fn bind_address(listen_address: &str) -> Option<String> {
    if let Ok(addr) = listen_address.parse::<SocketAddr>() {
        return Some(addr.to_string());
    }

    let (host, port) = listen_address.rsplit_once(':')?;
    let port: u16 = port.parse().ok()?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        Some(format!("0.0.0.0:{port}"))
    } else if host.contains(':') || host.contains(char::is_whitespace) {
        None
    } else {
        Some(format!("{host}:{port}"))
    }
}

//! Error types for configuration and storage.
//!
//! [`StoreError`] separates the outcomes the HTTP layer must tell apart:
//! a path that already holds an object (`409`), a write aimed at the storage
//! root (`403`), a missing object on download (`404`), and genuine filesystem
//! failures (`500`).

use std::path::PathBuf;

use http::StatusCode;

/// Storage error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request path normalizes to the storage root itself.
    #[error("Refusing to use the storage root as an object path")]
    RootPath,

    /// An object already exists at this path.
    #[error("Object already exists: {path}")]
    AlreadyExists {
        /// The normalized object path.
        path: String,
    },

    /// No regular file exists at this path.
    #[error("No such object: {path}")]
    NotFound {
        /// The normalized object path.
        path: String,
    },

    /// A filesystem operation failed.
    #[error("Failed to {op} {}: {source}", path.display())]
    Io {
        /// What was being attempted.
        op: &'static str,
        /// The full filesystem path involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RootPath => StatusCode::FORBIDDEN,
            Self::AlreadyExists { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Invalid server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The listen address is empty or has no valid port.
    #[error("listen-address must be host:port or :port, found '{0}'")]
    InvalidListenAddress(String),

    /// No signing secret was configured.
    #[error("secret must be non empty")]
    EmptySecret,

    /// The storage directory could not be created.
    #[error("could not create storage path '{}': {source}", path.display())]
    StoragePath {
        /// The configured storage path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

//! The shared signing secret.

use std::fmt;
use std::sync::Arc;

/// HMAC key shared between the upload issuer and this server.
///
/// Cloning is cheap: the bytes live behind an [`Arc`] and are never mutated.
/// The `Debug` output is redacted so the secret cannot leak through logs.
///
/// # Examples
///
/// ```
/// use httpup_auth::Secret;
///
/// let secret = Secret::new("s3cr3t");
/// assert_eq!(secret.as_bytes(), b"s3cr3t");
/// assert_eq!(format!("{secret:?}"), "Secret(<redacted>)");
/// ```
#[derive(Clone)]
pub struct Secret(Arc<[u8]>);

impl Secret {
    /// Wrap the given key material.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(key.into()))
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

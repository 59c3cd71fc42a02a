//! Canonical payload construction for the upload signature schemes.
//!
//! The issuer and this server must agree byte-for-byte on what is signed:
//!
//! ```text
//! v1: <path> 0x20 <content-length>
//! v2: <path> 0x00 <content-length> 0x00 <content-type>
//! ```
//!
//! `<path>` is the percent-decoded request path exactly as received (no `.`
//! or `..` resolution) and `<content-length>` is the header value as sent by
//! the client, so `"010"` and `"10"` sign differently.

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::error::AuthError;

/// Which canonicalization scheme produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureVersion {
    /// Path and content length, separated by a space.
    V1,
    /// Path, content length and content type, separated by NUL bytes.
    V2,
}

impl SignatureVersion {
    /// The query parameter that carries a token of this version.
    #[must_use]
    pub fn query_param(self) -> &'static str {
        match self {
            Self::V1 => "v",
            Self::V2 => "v2",
        }
    }

    /// Short lowercase name, used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent-decode a raw URI path into the form that gets signed and stored.
///
/// # Errors
///
/// Returns [`AuthError::MalformedPath`] if the decoded bytes are not UTF-8.
///
/// # Examples
///
/// ```
/// use httpup_auth::canonical::decode_path;
///
/// assert_eq!(decode_path("/a%20b/c.png").unwrap(), "/a b/c.png");
/// ```
pub fn decode_path(raw: &str) -> Result<String, AuthError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| AuthError::MalformedPath)
}

/// Validate a `Content-Length` value and return it unchanged.
///
/// Only ASCII digits are accepted and the value must fit in a `u64`; signs,
/// whitespace and empty strings are rejected.
///
/// # Errors
///
/// Returns [`AuthError::InvalidContentLength`] for anything else.
pub fn validate_content_length(value: &str) -> Result<&str, AuthError> {
    let digits_only = !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit());
    if digits_only && value.parse::<u64>().is_ok() {
        Ok(value)
    } else {
        Err(AuthError::InvalidContentLength(value.to_owned()))
    }
}

/// Build the byte payload that is fed to the HMAC for the given scheme.
///
/// `content_type` is ignored by [`SignatureVersion::V1`]; for
/// [`SignatureVersion::V2`] an absent header signs as the empty string.
#[must_use]
pub fn build_payload(
    version: SignatureVersion,
    path: &str,
    content_length: &str,
    content_type: Option<&[u8]>,
) -> Vec<u8> {
    match version {
        SignatureVersion::V1 => {
            let mut payload = Vec::with_capacity(path.len() + 1 + content_length.len());
            payload.extend_from_slice(path.as_bytes());
            payload.push(b' ');
            payload.extend_from_slice(content_length.as_bytes());
            payload
        }
        SignatureVersion::V2 => {
            let content_type = content_type.unwrap_or_default();
            let mut payload =
                Vec::with_capacity(path.len() + content_length.len() + content_type.len() + 2);
            payload.extend_from_slice(path.as_bytes());
            payload.push(0);
            payload.extend_from_slice(content_length.as_bytes());
            payload.push(0);
            payload.extend_from_slice(content_type);
            payload
        }
    }
}

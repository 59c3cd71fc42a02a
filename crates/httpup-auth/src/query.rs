//! Query string parsing and signature token selection.
//!
//! Parsing is strict: a `;` separator or a `%` not followed by two hex digits
//! makes the whole query invalid, which the HTTP layer reports as
//! `400 Bad Request`.

use crate::canonical::SignatureVersion;
use crate::error::AuthError;

/// Decoded query parameters in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// First value for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First value for `name`, treating an empty value as absent.
    #[must_use]
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    /// Pick the single token that will be verified.
    ///
    /// A non-empty `v2` always wins; `v` is only looked at when `v2` is
    /// absent or empty.
    #[must_use]
    pub fn signature_token(&self) -> Option<(SignatureVersion, &str)> {
        [SignatureVersion::V2, SignatureVersion::V1]
            .into_iter()
            .find_map(|version| {
                self.get_non_empty(version.query_param())
                    .map(|token| (version, token))
            })
    }
}

/// Parse an `application/x-www-form-urlencoded` query string.
///
/// # Errors
///
/// Returns [`AuthError::MalformedQuery`] on a `;` separator or an invalid
/// percent escape.
///
/// # Examples
///
/// ```
/// use httpup_auth::query::parse_query;
///
/// let params = parse_query("v=abc&x=1+2").unwrap();
/// assert_eq!(params.get("v"), Some("abc"));
/// assert_eq!(params.get("x"), Some("1 2"));
/// ```
pub fn parse_query(query: &str) -> Result<QueryParams, AuthError> {
    if query.contains(';') {
        return Err(AuthError::MalformedQuery(
            "invalid semicolon separator".to_owned(),
        ));
    }
    check_percent_escapes(query)?;

    let pairs = form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    Ok(QueryParams { pairs })
}

/// Reject `%` sequences that are not followed by two hex digits.
fn check_percent_escapes(query: &str) -> Result<(), AuthError> {
    let bytes = query.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(AuthError::MalformedQuery(format!(
                    "invalid escape at offset {i}"
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

//! HMAC-SHA256 signing and token comparison.

use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::secret::Secret;

type HmacSha256 = Hmac<Sha256>;

/// Compute the lowercase hex HMAC-SHA256 of `payload` keyed with `secret`.
///
/// # Examples
///
/// ```
/// use httpup_auth::Secret;
/// use httpup_auth::signature::compute_signature;
///
/// let sig = compute_signature(&Secret::new("key"), b"The quick brown fox jumps over the lazy dog");
/// assert_eq!(sig, "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8");
/// ```
#[must_use]
pub fn compute_signature(secret: &Secret, payload: &[u8]) -> String {
    hex::encode(hmac_sha256(secret.as_bytes(), payload))
}

/// Compare a provided token against the expected hex digest.
///
/// The whole string is compared in constant time; tokens of a different
/// length never match.
#[must_use]
pub fn tokens_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

/// Compute HMAC-SHA256 and return the raw bytes.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

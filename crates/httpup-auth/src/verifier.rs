//! Upload request verification.
//!
//! [`Verifier::authenticate`] runs the full check against an HTTP request:
//!
//! 1. The method must be `PUT`.
//! 2. The query string must parse.
//! 3. Exactly one token is selected (`v2` before `v`).
//! 4. `Content-Length` must be present and a valid decimal integer.
//! 5. The payload for the selected scheme is signed and compared in constant
//!    time against the token.
//!
//! [`Verifier::verify`] is the pure core of steps 3 to 5 over a
//! [`SignedRequest`] and performs no I/O.

use tracing::debug;

use crate::canonical::{SignatureVersion, build_payload, decode_path, validate_content_length};
use crate::error::AuthError;
use crate::query::parse_query;
use crate::secret::Secret;
use crate::signature::{compute_signature, tokens_match};

/// The inputs of one signature check.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    /// Percent-decoded request path.
    pub path: &'a str,
    /// Raw `Content-Length` header value, if present.
    pub content_length: Option<&'a str>,
    /// Raw `Content-Type` header value, if present.
    pub content_type: Option<&'a [u8]>,
    /// The selected token and the scheme it claims to use.
    pub token: Option<(SignatureVersion, &'a str)>,
}

/// The result of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    /// The scheme that validated the request.
    pub version: SignatureVersion,
    /// The percent-decoded request path that was signed.
    pub path: String,
}

/// Verifies upload tokens against a shared secret.
///
/// The verifier holds no mutable state and can be shared freely between
/// connections.
#[derive(Debug, Clone)]
pub struct Verifier {
    secret: Secret,
}

impl Verifier {
    /// Create a verifier for the given secret.
    #[must_use]
    pub fn new(secret: Secret) -> Self {
        Self { secret }
    }

    /// Authenticate an HTTP upload request.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] describing the first check that failed; use
    /// [`AuthError::status_code`] to pick the response status.
    pub fn authenticate(&self, parts: &http::request::Parts) -> Result<AuthResult, AuthError> {
        if parts.method != http::Method::PUT {
            return Err(AuthError::MethodNotAllowed(parts.method.clone()));
        }

        let params = parse_query(parts.uri.query().unwrap_or(""))?;
        let path = decode_path(parts.uri.path())?;

        let content_length = parts
            .headers
            .get(http::header::CONTENT_LENGTH)
            .map(|value| {
                value
                    .to_str()
                    .map_err(|_| AuthError::InvalidContentLength("<non-ascii>".to_owned()))
            })
            .transpose()?;

        let request = SignedRequest {
            path: &path,
            content_length,
            content_type: parts
                .headers
                .get(http::header::CONTENT_TYPE)
                .map(http::HeaderValue::as_bytes),
            token: params.signature_token(),
        };

        let version = self.verify(&request)?;
        Ok(AuthResult { version, path })
    }

    /// Check the token of a [`SignedRequest`].
    ///
    /// Only the scheme named by the token is evaluated.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingSignature`] if there is no token.
    /// - [`AuthError::MissingContentLength`] / [`AuthError::InvalidContentLength`]
    ///   if the length cannot be used; no signature is computed in that case.
    /// - [`AuthError::SignatureDoesNotMatch`] if the token is wrong.
    pub fn verify(&self, request: &SignedRequest<'_>) -> Result<SignatureVersion, AuthError> {
        let (version, token) = request.token.ok_or(AuthError::MissingSignature)?;
        let content_length = request
            .content_length
            .ok_or(AuthError::MissingContentLength)
            .and_then(validate_content_length)?;

        let payload = build_payload(version, request.path, content_length, request.content_type);
        let expected = compute_signature(&self.secret, &payload);

        if tokens_match(&expected, token) {
            debug!(%version, path = request.path, "upload signature verified");
            Ok(version)
        } else {
            debug!(%version, path = request.path, "upload signature mismatch");
            Err(AuthError::SignatureDoesNotMatch(version))
        }
    }

    /// Produce a v1 token for `path` and `content_length`.
    ///
    /// This is the issuer side of the protocol.
    #[must_use]
    pub fn sign_v1(&self, path: &str, content_length: u64) -> String {
        let length = content_length.to_string();
        let payload = build_payload(SignatureVersion::V1, path, &length, None);
        compute_signature(&self.secret, &payload)
    }

    /// Produce a v2 token for `path`, `content_length` and `content_type`.
    #[must_use]
    pub fn sign_v2(&self, path: &str, content_length: u64, content_type: Option<&str>) -> String {
        let length = content_length.to_string();
        let payload = build_payload(
            SignatureVersion::V2,
            path,
            &length,
            content_type.map(str::as_bytes),
        );
        compute_signature(&self.secret, &payload)
    }
}

//! Error types for upload request authentication.
//!
//! Every failure is an [`AuthError`]. Callers pick the response status with
//! [`AuthError::status_code`]; the message itself is meant for server-side
//! logs and is never sent to the client.

use http::StatusCode;

use crate::canonical::SignatureVersion;

/// Errors that can occur while authenticating an upload request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Only `PUT` requests can be authenticated.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(http::Method),

    /// The query string is not valid form data.
    #[error("Malformed query string: {0}")]
    MalformedQuery(String),

    /// The request path does not percent-decode to UTF-8.
    #[error("Malformed request path")]
    MalformedPath,

    /// Neither a `v` nor a `v2` token is present.
    #[error("Missing signature token")]
    MissingSignature,

    /// The `Content-Length` header is absent.
    #[error("Missing Content-Length header")]
    MissingContentLength,

    /// The `Content-Length` header is not a non-negative decimal integer.
    #[error("Invalid Content-Length header: {0}")]
    InvalidContentLength(String),

    /// The computed signature does not match the provided token.
    #[error("Signature does not match ({0})")]
    SignatureDoesNotMatch(SignatureVersion),
}

impl AuthError {
    /// HTTP status the caller should answer with.
    ///
    /// Everything that is not a method or syntax problem collapses into
    /// `403 Forbidden` so clients cannot tell which check failed.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::MalformedQuery(_) | Self::MalformedPath => StatusCode::BAD_REQUEST,
            Self::MissingSignature
            | Self::MissingContentLength
            | Self::InvalidContentLength(_)
            | Self::SignatureDoesNotMatch(_) => StatusCode::FORBIDDEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_method_error_to_405() {
        let err = AuthError::MethodNotAllowed(http::Method::POST);
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_should_map_syntax_errors_to_400() {
        assert_eq!(
            AuthError::MalformedQuery("bad escape".to_owned()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::MalformedPath.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_should_map_signature_failures_to_403() {
        for err in [
            AuthError::MissingSignature,
            AuthError::MissingContentLength,
            AuthError::InvalidContentLength("-1".to_owned()),
            AuthError::SignatureDoesNotMatch(SignatureVersion::V2),
        ] {
            assert_eq!(err.status_code(), StatusCode::FORBIDDEN, "{err}");
        }
    }
}

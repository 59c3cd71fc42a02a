//! Status-only responses and the mapping from domain errors to them.
//!
//! Error responses carry no body: the client learns the status code and
//! nothing about which check failed. The details go to the server log.

use http::StatusCode;
use http::header::HeaderValue;
use httpup_auth::AuthError;
use httpup_core::StoreError;
use tracing::{debug, error, info, warn};

use crate::body::UploadResponseBody;

/// Methods accepted on object paths, advertised with `405` responses.
const ALLOWED_METHODS: &str = "GET, HEAD, PUT";

/// Build a response with the given status and an empty body.
#[must_use]
pub fn status_response(status: StatusCode) -> http::Response<UploadResponseBody> {
    let mut response = http::Response::new(UploadResponseBody::empty());
    *response.status_mut() = status;
    if status == StatusCode::METHOD_NOT_ALLOWED {
        response
            .headers_mut()
            .insert(http::header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    }
    response
}

/// Log an authentication failure and turn it into a response.
#[must_use]
pub fn auth_error_response(
    err: &AuthError,
    request_id: &str,
) -> http::Response<UploadResponseBody> {
    let status = err.status_code();
    warn!(error = %err, status = status.as_u16(), request_id, "upload rejected");
    status_response(status)
}

/// Log a storage failure at a level matching its severity and turn it into
/// a response.
#[must_use]
pub fn store_error_response(
    err: &StoreError,
    request_id: &str,
) -> http::Response<UploadResponseBody> {
    let status = err.status_code();
    match err {
        StoreError::AlreadyExists { path } => {
            info!(%path, request_id, "upload conflicts with existing object");
        }
        StoreError::RootPath => {
            warn!(request_id, "refused write to storage root");
        }
        StoreError::NotFound { path } => {
            debug!(%path, request_id, "object not found");
        }
        StoreError::Io { .. } => {
            error!(error = %err, request_id, "storage failure");
        }
    }
    status_response(status)
}

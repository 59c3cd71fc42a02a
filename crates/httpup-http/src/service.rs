//! The upload HTTP service implementing hyper's `Service` trait.
//!
//! [`UploadHttpService`] ties together routing, authentication, storage and
//! downloads into a single hyper-compatible service. For every request it:
//!
//! 1. Assigns a request id.
//! 2. Resolves the [`Route`].
//! 3. For uploads, verifies the signed URL, claims the path in the store, and
//!    streams the body to disk.
//! 4. For downloads, streams the stored object back.
//! 5. Adds common response headers (`x-request-id`, `Server`).

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body::Body;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use tracing::{debug, error, info};
use uuid::Uuid;

use httpup_auth::Verifier;
use httpup_core::WriteOnceStore;

use crate::body::UploadResponseBody;
use crate::download::serve_object;
use crate::response::{auth_error_response, status_response, store_error_response};
use crate::router::Route;

/// The upload HTTP service.
///
/// Cloning is cheap; clones share the verifier and the store.
#[derive(Debug, Clone)]
pub struct UploadHttpService {
    verifier: Arc<Verifier>,
    store: Arc<WriteOnceStore>,
}

impl UploadHttpService {
    /// Create a service from a verifier and a store.
    #[must_use]
    pub fn new(verifier: Verifier, store: WriteOnceStore) -> Self {
        Self {
            verifier: Arc::new(verifier),
            store: Arc::new(store),
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &WriteOnceStore {
        &self.store
    }

    /// Handle one request end to end.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<UploadResponseBody>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let request_id = Uuid::new_v4().to_string();
        let response = self.process_request(req, &request_id).await;
        add_common_headers(response, &request_id)
    }

    async fn process_request<B>(
        &self,
        req: http::Request<B>,
        request_id: &str,
    ) -> http::Response<UploadResponseBody>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let route = Route::resolve(&method, req.uri().path());
        debug!(%method, path = req.uri().path(), %route, request_id, "processing request");

        match route {
            Route::Root => status_response(StatusCode::NOT_FOUND),
            Route::Download => {
                let (parts, _body) = req.into_parts();
                serve_object(&self.store, &parts, request_id).await
            }
            Route::Upload => self.upload(req, request_id).await,
        }
    }

    async fn upload<B>(
        &self,
        req: http::Request<B>,
        request_id: &str,
    ) -> http::Response<UploadResponseBody>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();

        let auth = match self.verifier.authenticate(&parts) {
            Ok(auth) => auth,
            Err(err) => return auth_error_response(&err, request_id),
        };
        debug!(version = %auth.version, path = %auth.path, request_id, "upload authenticated");

        let object = match self.store.create_file(&auth.path).await {
            Ok(object) => object,
            Err(err) => return store_error_response(&err, request_id),
        };

        match object.write_stream(body.into_data_stream()).await {
            Ok(result) => {
                info!(path = %result.path, size = result.size, request_id, "upload stored");
                status_response(StatusCode::CREATED)
            }
            Err(err) => {
                error!(error = %err, request_id, "upload body copy failed");
                status_response(err.status_code())
            }
        }
    }
}

impl Service<http::Request<Incoming>> for UploadHttpService {
    type Response = http::Response<UploadResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { Ok(this.handle(req).await) })
    }
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: http::Response<UploadResponseBody>,
    request_id: &str,
) -> http::Response<UploadResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::header::HeaderValue::from_str(request_id) {
        headers.insert("x-request-id", hv);
    }
    headers.insert(
        http::header::SERVER,
        http::header::HeaderValue::from_static("httpup"),
    );

    response
}

//! End-to-end tests for the httpup server.
//!
//! Each test starts its own server in-process on an ephemeral port, backed by
//! a fresh temporary storage root, and talks to it over real HTTP.

use std::net::SocketAddr;
use std::sync::Once;

use httpup_auth::{Secret, Verifier};
use httpup_core::WriteOnceStore;
use httpup_http::UploadHttpService;
use tokio::net::TcpListener;

#[cfg(test)]
mod test_download;
#[cfg(test)]
mod test_upload;

/// Secret shared by the test server and [`TestServer::sign_v1`] / [`TestServer::sign_v2`].
pub const SECRET: &str = "s3cr3t";

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A running in-process server.
///
/// The server task and the storage root live as long as this value.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    root: tempfile::TempDir,
    verifier: Verifier,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a server on `127.0.0.1` with an ephemeral port.
    pub async fn start() -> Self {
        init_tracing();

        let root = tempfile::tempdir().expect("create storage root");
        let verifier = Verifier::new(Secret::new(SECRET));
        let service = UploadHttpService::new(verifier.clone(), WriteOnceStore::new(root.path()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");

        tokio::spawn(httpup_http::serve(listener, service, std::future::pending()));

        Self {
            addr,
            root,
            verifier,
            client: reqwest::Client::new(),
        }
    }

    /// Absolute URL for a raw path and query.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{path_and_query}", self.addr)
    }

    /// The storage root on disk.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        self.root.path()
    }

    /// HTTP client for talking to the server.
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// A `v1` token for `path` and `len`.
    #[must_use]
    pub fn sign_v1(&self, path: &str, len: u64) -> String {
        self.verifier.sign_v1(path, len)
    }

    /// A `v2` token for `path`, `len` and `content_type`.
    #[must_use]
    pub fn sign_v2(&self, path: &str, len: u64, content_type: Option<&str>) -> String {
        self.verifier.sign_v2(path, len, content_type)
    }

    /// PUT `body` to `path` with a valid `v1` token.
    pub async fn put_v1(&self, path: &str, body: &'static [u8]) -> reqwest::Response {
        let token = self.sign_v1(path, body.len() as u64);
        self.client
            .put(self.url(&format!("{path}?v={token}")))
            .body(body)
            .send()
            .await
            .expect("send PUT")
    }
}

//! httpup server - stores files uploaded through pre-signed PUT URLs.
//!
//! An upload issuer signs `<path> <content-length>` (or, for `v2`, the path,
//! length and content type) with a shared secret and hands the client a URL.
//! The server checks the signature, stores the body exactly once, and serves
//! stored files back over GET.
//!
//! # Usage
//!
//! ```text
//! HTTPUP_SECRET=s3cr3t HTTPUP_STORAGE_PATH=/srv/uploads httpup-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HTTPUP_LISTEN_ADDRESS` | `0.0.0.0:8889` | Bind address (`host:port` or `:port`) |
//! | `HTTPUP_SECRET` | *(required)* | Shared signing secret |
//! | `HTTPUP_STORAGE_PATH` | `data` | Storage root directory |
//! | `HTTPUP_LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `HTTPUP_LOG_LEVEL`) |

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use httpup_auth::{Secret, Verifier};
use httpup_core::{UploadConfig, WriteOnceStore};
use httpup_http::UploadHttpService;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the configured log level.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the HTTP service from a validated configuration.
fn build_service(config: &UploadConfig) -> UploadHttpService {
    let verifier = Verifier::new(Secret::from(config.secret.clone()));
    let store = WriteOnceStore::new(&config.storage_path);
    UploadHttpService::new(verifier, store)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = UploadConfig::from_env();

    init_tracing(&config.log_level)?;

    let addr = config.validate().context("invalid configuration")?;

    info!(
        listen_address = %config.listen_address,
        storage_path = %config.storage_path,
        version = VERSION,
        "starting httpup server",
    );

    let service = build_service(&config);

    let listener = TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to read bound address")?;

    info!(%local_addr, "listening for connections");

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    httpup_http::serve(listener, service, shutdown).await;
    info!("exiting");

    Ok(())
}

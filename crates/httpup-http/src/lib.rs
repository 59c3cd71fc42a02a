//! HTTP layer for the httpup upload server.
//!
//! Wraps [`httpup_auth::Verifier`] and [`httpup_core::WriteOnceStore`] in a
//! hyper [`Service`](hyper::service::Service):
//!
//! - `PUT <path>?v=<hex>` / `PUT <path>?v2=<hex>` stores the body once.
//! - `GET` / `HEAD <path>` serves a stored object.
//! - `/` answers `404` for every method.
//!
//! # Modules
//!
//! - [`body`] - Response body type
//! - [`download`] - Streaming downloads
//! - [`response`] - Status responses and error mapping
//! - [`router`] - Request routing
//! - [`server`] - Accept loop with graceful shutdown
//! - [`service`] - The hyper service

pub mod body;
pub mod download;
pub mod response;
pub mod router;
pub mod server;
pub mod service;

pub use body::UploadResponseBody;
pub use router::Route;
pub use server::serve;
pub use service::UploadHttpService;

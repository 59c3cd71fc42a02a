//! Request authentication for external upload URLs.
//!
//! An upload issuer (typically a chat server) hands out pre-signed PUT URLs of
//! the form `<path>?v=<hex>` or `<path>?v2=<hex>`. This crate verifies that the
//! token in the URL was produced with the shared secret, without any session
//! state.
//!
//! # Schemes
//!
//! | Query parameter | Signed payload |
//! |-----------------|----------------|
//! | `v`  | `<path> " " <content-length>` |
//! | `v2` | `<path> "\0" <content-length> "\0" <content-type>` |
//!
//! Both schemes use HMAC-SHA256 keyed with the secret and compare the
//! lowercase hex digest against the token in constant time. When `v2` is
//! present only `v2` is evaluated, so a valid `v` token can never rescue a
//! request whose `v2` token fails.
//!
//! # Usage
//!
//! ```rust
//! use httpup_auth::{Secret, Verifier};
//!
//! let verifier = Verifier::new(Secret::new("s3cr3t"));
//! let token = verifier.sign_v1("/a/b.png", 10);
//!
//! let (parts, ()) = http::Request::builder()
//!     .method(http::Method::PUT)
//!     .uri(format!("/a/b.png?v={token}"))
//!     .header(http::header::CONTENT_LENGTH, "10")
//!     .body(())
//!     .unwrap()
//!     .into_parts();
//!
//! let result = verifier.authenticate(&parts).unwrap();
//! assert_eq!(result.path, "/a/b.png");
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Path decoding, content-length validation and payload construction
//! - [`error`] - Authentication error types and their HTTP status mapping
//! - [`query`] - Strict query string parsing and token selection
//! - [`secret`] - The shared signing secret
//! - [`signature`] - HMAC computation and token comparison
//! - [`verifier`] - The [`Verifier`] entry point

pub mod canonical;
pub mod error;
pub mod query;
pub mod secret;
pub mod signature;
pub mod verifier;

pub use canonical::SignatureVersion;
pub use error::AuthError;
pub use secret::Secret;
pub use verifier::{AuthResult, SignedRequest, Verifier};

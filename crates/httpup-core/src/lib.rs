//! Configuration and write-once storage for the httpup upload server.
//!
//! # Architecture
//!
//! ```text
//! authenticated PUT
//!        |
//!        v
//!   ObjectPath::parse (lexical `.` / `..` resolution, root rejected)
//!        |
//!        v
//!   WriteOnceStore::create_file (store-wide lock: mkdir, stat, create_new)
//!        |
//!        v
//!   NewObject::write_stream (body copy, outside the lock)
//! ```

pub mod config;
pub mod error;
pub mod path;
pub mod storage;

pub use config::UploadConfig;
pub use error::{ConfigError, StoreError};
pub use path::ObjectPath;
pub use storage::{NewObject, StoredObject, WriteOnceStore, WriteResult};

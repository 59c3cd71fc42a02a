//! Write-once filesystem storage for uploaded objects.
//!
//! [`WriteOnceStore`] keeps every object as a regular file under a storage
//! root. An object is created at most once: the "does it exist, and if not,
//! create it" decision for every path is serialized behind a single
//! store-wide lock, and the file itself is opened with `create_new` so the
//! filesystem rejects a racing creator as well.
//!
//! The lock only covers that decision. Copying the request body into the new
//! file happens afterwards through [`NewObject::write_stream`], so a slow
//! upload never blocks other uploads.
//!
//! A body copy that fails half-way leaves the truncated file in place; it is
//! not removed or rolled back.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::error::StoreError;
use crate::path::ObjectPath;

// ---------------------------------------------------------------------------
// WriteResult
// ---------------------------------------------------------------------------

/// Result of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    /// The normalized object path.
    pub path: ObjectPath,
    /// Number of body bytes written.
    pub size: u64,
}

// ---------------------------------------------------------------------------
// NewObject
// ---------------------------------------------------------------------------

/// A freshly created, still empty object.
///
/// Only [`WriteOnceStore::create_file`] hands these out, and only to the one
/// caller that won the creation race for the path.
#[derive(Debug)]
pub struct NewObject {
    file: fs::File,
    path: ObjectPath,
    full_path: PathBuf,
}

impl NewObject {
    /// The normalized object path.
    #[must_use]
    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    /// Copy `body` into the object and flush it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the body stream yields an error or the
    /// file cannot be written. Bytes written before the failure stay on disk.
    pub async fn write_stream<S, E>(self, body: S) -> Result<WriteResult, StoreError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let Self {
            mut file,
            path,
            full_path,
        } = self;

        let mut body = std::pin::pin!(body);
        let mut size: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                StoreError::io("read body for", &full_path, std::io::Error::other(e))
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|e| StoreError::io("write", &full_path, e))?;
            size += chunk.len() as u64;
            trace!(path = %path, size, "wrote body chunk");
        }

        file.flush()
            .await
            .map_err(|e| StoreError::io("flush", &full_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| StoreError::io("sync", &full_path, e))?;

        debug!(path = %path, size, "stored object");
        Ok(WriteResult { path, size })
    }
}

// ---------------------------------------------------------------------------
// StoredObject
// ---------------------------------------------------------------------------

/// An existing object opened for reading.
#[derive(Debug)]
pub struct StoredObject {
    /// The open file, positioned at the start.
    pub file: fs::File,
    /// The normalized object path.
    pub path: ObjectPath,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time, if the platform reports one.
    pub modified: Option<SystemTime>,
}

// ---------------------------------------------------------------------------
// WriteOnceStore
// ---------------------------------------------------------------------------

/// Filesystem store where every path can be written exactly once.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use httpup_core::storage::WriteOnceStore;
///
/// # tokio_test::block_on(async {
/// let dir = tempfile::tempdir().unwrap();
/// let store = WriteOnceStore::new(dir.path());
///
/// let body = futures::stream::iter([Ok::<_, std::io::Error>(Bytes::from("hello"))]);
/// let result = store.create_if_absent("/greeting.txt", body).await.unwrap();
/// assert_eq!(result.size, 5);
///
/// let again = futures::stream::iter([Ok::<_, std::io::Error>(Bytes::from("bye"))]);
/// assert!(store.create_if_absent("/greeting.txt", again).await.is_err());
/// # });
/// ```
#[derive(Debug)]
pub struct WriteOnceStore {
    root: PathBuf,
    /// Serializes the existence check and file creation for all paths.
    create_lock: Mutex<()>,
}

impl WriteOnceStore {
    /// Create a store rooted at `root`. The directory is not touched.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        debug!(root = %root.display(), "creating WriteOnceStore");
        Self {
            root,
            create_lock: Mutex::new(()),
        }
    }

    /// The storage root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the object at `path` and copy `body` into it.
    ///
    /// # Errors
    ///
    /// - [`StoreError::RootPath`] if `path` normalizes to the root.
    /// - [`StoreError::AlreadyExists`] if an object is already there; `body`
    ///   is not consumed in that case.
    /// - [`StoreError::Io`] for any filesystem failure.
    pub async fn create_if_absent<S, E>(
        &self,
        path: &str,
        body: S,
    ) -> Result<WriteResult, StoreError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let object = self.create_file(path).await?;
        object.write_stream(body).await
    }

    /// Atomically check that nothing exists at `path` and create an empty
    /// file there.
    ///
    /// Parent directories are created as needed. All of this runs under the
    /// store-wide lock, which is released before this function returns.
    ///
    /// # Errors
    ///
    /// Same as [`create_if_absent`](Self::create_if_absent).
    pub async fn create_file(&self, path: &str) -> Result<NewObject, StoreError> {
        let path = ObjectPath::parse(path)?;
        let full_path = path.resolve(&self.root);

        let _guard = self.create_lock.lock().await;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io("create directory for", &full_path, e))?;
        }

        match fs::metadata(&full_path).await {
            Ok(_) => {
                return Err(StoreError::AlreadyExists {
                    path: path.to_string(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::io("stat", &full_path, e)),
        }

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    StoreError::AlreadyExists {
                        path: path.to_string(),
                    }
                } else {
                    StoreError::io("create", &full_path, e)
                }
            })?;

        debug!(path = %path, "created object file");
        Ok(NewObject {
            file,
            path,
            full_path,
        })
    }

    /// Open the object at `path` for reading.
    ///
    /// # Errors
    ///
    /// - [`StoreError::RootPath`] if `path` normalizes to the root.
    /// - [`StoreError::NotFound`] if there is no regular file at `path`.
    /// - [`StoreError::Io`] for other filesystem failures.
    pub async fn open(&self, path: &str) -> Result<StoredObject, StoreError> {
        let path = ObjectPath::parse(path)?;
        let full_path = path.resolve(&self.root);

        let metadata = match fs::metadata(&full_path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => {
                return Err(StoreError::NotFound {
                    path: path.to_string(),
                });
            }
            Err(e) if is_not_found(&e) => {
                return Err(StoreError::NotFound {
                    path: path.to_string(),
                });
            }
            Err(e) => return Err(StoreError::io("stat", &full_path, e)),
        };

        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| StoreError::io("open", &full_path, e))?;

        Ok(StoredObject {
            file,
            path,
            size: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// `NotFound`, or a path component that is a file rather than a directory.
fn is_not_found(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}

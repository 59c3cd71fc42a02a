//! Lexical normalization of request paths into object paths.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// A normalized, non-empty object path relative to the storage root.
///
/// `.` and empty segments are dropped and `..` removes the previous segment,
/// never climbing above the root. The filesystem is not consulted.
///
/// # Examples
///
/// ```
/// use httpup_core::path::ObjectPath;
///
/// let path = ObjectPath::parse("/a/./b/../c.png").unwrap();
/// assert_eq!(path.to_string(), "/a/c.png");
///
/// let escaped = ObjectPath::parse("/../../etc/passwd").unwrap();
/// assert_eq!(escaped.to_string(), "/etc/passwd");
///
/// assert!(ObjectPath::parse("/a/..").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    segments: Vec<String>,
}

impl ObjectPath {
    /// Normalize a decoded request path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RootPath`] if nothing is left after normalization.
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let mut segments: Vec<String> = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other.to_owned()),
            }
        }

        if segments.is_empty() {
            return Err(StoreError::RootPath);
        }
        Ok(Self { segments })
    }

    /// The filesystem location of this object under `root`.
    #[must_use]
    pub fn resolve(&self, root: &Path) -> PathBuf {
        let mut full = root.to_path_buf();
        full.extend(&self.segments);
        full
    }

    /// The last path segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

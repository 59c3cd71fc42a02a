//! Request routing.
//!
//! | Request | Route |
//! |---------|-------|
//! | any method on `/` | [`Route::Root`] (404) |
//! | `GET` / `HEAD` | [`Route::Download`] (unauthenticated) |
//! | anything else | [`Route::Upload`] (authenticated, only `PUT` passes) |

use std::fmt;

/// Where a request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The bare root path; nothing is served or stored there.
    Root,
    /// Serve a stored object.
    Download,
    /// Authenticate and store an upload.
    Upload,
}

impl Route {
    /// Resolve the route for a method and raw URI path.
    #[must_use]
    pub fn resolve(method: &http::Method, path: &str) -> Self {
        if path == "/" {
            Self::Root
        } else if *method == http::Method::GET || *method == http::Method::HEAD {
            Self::Download
        } else {
            Self::Upload
        }
    }

    /// Short lowercase name, used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Download => "download",
            Self::Upload => "upload",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Response body type supporting empty and streaming modes.
//!
//! - **Empty**: status-only answers (201, 403, 409, ...) and HEAD responses.
//! - **Streaming**: stored objects read from disk in chunks.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

/// A boxed stream of body chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Response body used by the upload service.
///
/// Implements [`http_body::Body`] so it can be used directly with hyper responses.
#[derive(Default)]
pub enum UploadResponseBody {
    /// Chunked body read lazily, with its total length.
    Streaming {
        /// The chunk source.
        stream: ChunkStream,
        /// Total number of bytes the stream yields.
        len: u64,
    },
    /// Empty body.
    #[default]
    Empty,
}

impl UploadResponseBody {
    /// Create an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Create a streaming body of `len` bytes.
    pub fn from_stream(
        stream: impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static,
        len: u64,
    ) -> Self {
        Self::Streaming {
            stream: Box::pin(stream),
            len,
        }
    }
}

impl fmt::Debug for UploadResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Streaming { len, .. } => f.debug_struct("Streaming").field("len", len).finish(),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

impl http_body::Body for UploadResponseBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Streaming { stream, .. } => stream
                .as_mut()
                .poll_next(cx)
                .map(|chunk| chunk.map(|res| res.map(http_body::Frame::data))),
            Self::Empty => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Streaming { .. } => false,
            Self::Empty => true,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Streaming { len, .. } => http_body::SizeHint::with_exact(*len),
            Self::Empty => http_body::SizeHint::with_exact(0),
        }
    }
}

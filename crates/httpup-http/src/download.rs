//! Unauthenticated GET/HEAD of stored objects.
//!
//! Objects are streamed from disk in fixed-size chunks. Directories and the
//! storage root are never listed; both answer `404`.
//!
//! A single `Range: bytes=...` is honoured with `206`, an unsatisfiable one
//! answers `416`. Multiple ranges and malformed headers are ignored and the
//! whole object is sent. `If-Modified-Since` answers `304` when the object
//! is not newer, compared at one-second resolution.

use std::io::SeekFrom;
use std::time::SystemTime;

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::Stream;
use http::header::{self, HeaderMap, HeaderValue};
use http::{Method, StatusCode};
use httpup_auth::canonical::decode_path;
use httpup_core::{StoreError, StoredObject, WriteOnceStore};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tracing::{debug, error, warn};

use crate::body::UploadResponseBody;
use crate::response::{status_response, store_error_response};

/// Read size for streamed downloads.
const CHUNK_SIZE: usize = 64 * 1024;

/// HTTP date format (RFC 7231 IMF-fixdate).
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// The part of an object a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteRange {
    /// The whole object.
    Full,
    /// Inclusive byte offsets `start..=end`.
    Partial { start: u64, end: u64 },
    /// A range that starts past the end of the object.
    Unsatisfiable,
}

/// Serve the object named by the request path.
pub async fn serve_object(
    store: &WriteOnceStore,
    parts: &http::request::Parts,
    request_id: &str,
) -> http::Response<UploadResponseBody> {
    let path = match decode_path(parts.uri.path()) {
        Ok(path) => path,
        Err(err) => {
            warn!(error = %err, request_id, "undecodable download path");
            return status_response(err.status_code());
        }
    };

    let object = match store.open(&path).await {
        Ok(object) => object,
        Err(StoreError::RootPath) => return status_response(StatusCode::NOT_FOUND),
        Err(err) => return store_error_response(&err, request_id),
    };

    let StoredObject {
        mut file,
        path,
        size,
        modified,
    } = object;
    debug!(%path, size, request_id, "serving object");

    if not_modified_since(&parts.headers, modified) {
        let mut response = status_response(StatusCode::NOT_MODIFIED);
        insert_last_modified(response.headers_mut(), modified);
        return response;
    }

    let (status, start, len) = match parse_range(&parts.headers, size) {
        ByteRange::Full => (StatusCode::OK, 0, size),
        ByteRange::Partial { start, end } => {
            (StatusCode::PARTIAL_CONTENT, start, end - start + 1)
        }
        ByteRange::Unsatisfiable => {
            let mut response = status_response(StatusCode::RANGE_NOT_SATISFIABLE);
            if let Ok(hv) = HeaderValue::from_str(&format!("bytes */{size}")) {
                response.headers_mut().insert(header::CONTENT_RANGE, hv);
            }
            return response;
        }
    };

    let mut response = if parts.method == Method::HEAD {
        status_response(status)
    } else {
        if start > 0 {
            if let Err(e) = file.seek(SeekFrom::Start(start)).await {
                error!(%path, error = %e, request_id, "failed to seek object");
                return status_response(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
        let body = UploadResponseBody::from_stream(chunk_stream(file.take(len)), len);
        let mut response = http::Response::new(body);
        *response.status_mut() = status;
        response
    };

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if status == StatusCode::PARTIAL_CONTENT {
        let content_range = format!("bytes {start}-{}/{size}", start + len - 1);
        if let Ok(hv) = HeaderValue::from_str(&content_range) {
            headers.insert(header::CONTENT_RANGE, hv);
        }
    }
    let content_type = guess_content_type(path.file_name());
    if let Ok(hv) = HeaderValue::from_str(content_type.as_ref()) {
        headers.insert(header::CONTENT_TYPE, hv);
    }
    insert_last_modified(headers, modified);
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    response
}

/// Insert `Last-Modified` when the platform reports a modification time.
fn insert_last_modified(headers: &mut HeaderMap, modified: Option<SystemTime>) {
    if let Some(modified) = modified {
        if let Ok(hv) = HeaderValue::from_str(&http_date(modified)) {
            headers.insert(header::LAST_MODIFIED, hv);
        }
    }
}

/// Whether `If-Modified-Since` says the client copy is current.
fn not_modified_since(headers: &HeaderMap, modified: Option<SystemTime>) -> bool {
    let Some(modified) = modified else {
        return false;
    };
    let Some(since) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| NaiveDateTime::parse_from_str(v.trim(), HTTP_DATE_FORMAT).ok())
    else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.and_utc().timestamp()
}

/// Parse a single-range `Range` header against an object of `size` bytes.
fn parse_range(headers: &HeaderMap, size: u64) -> ByteRange {
    let Some(spec) = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().strip_prefix("bytes="))
    else {
        return ByteRange::Full;
    };
    if spec.contains(',') {
        return ByteRange::Full;
    }
    let Some((first, last)) = spec.split_once('-') else {
        return ByteRange::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        // Suffix range: the final `last` bytes.
        let Ok(suffix) = last.parse::<u64>() else {
            return ByteRange::Full;
        };
        if suffix == 0 || size == 0 {
            return ByteRange::Unsatisfiable;
        }
        return ByteRange::Partial {
            start: size.saturating_sub(suffix),
            end: size - 1,
        };
    }

    let Ok(start) = first.parse::<u64>() else {
        return ByteRange::Full;
    };
    let end = if last.is_empty() {
        u64::MAX
    } else {
        match last.parse::<u64>() {
            Ok(end) if end >= start => end,
            _ => return ByteRange::Full,
        }
    };
    if start >= size {
        return ByteRange::Unsatisfiable;
    }
    ByteRange::Partial {
        start,
        end: end.min(size - 1),
    }
}

/// Turn a reader into a stream of chunks of at most [`CHUNK_SIZE`] bytes.
fn chunk_stream<R>(reader: R) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send
where
    R: AsyncRead + Unpin + Send + 'static,
{
    futures::stream::try_unfold(reader, |mut reader| async move {
        let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
        let n = reader.read_buf(&mut buf).await?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some((buf.freeze(), reader)))
        }
    })
}

/// Format a timestamp as an HTTP date.
fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format(HTTP_DATE_FORMAT)
        .to_string()
}

/// Guess a content type from the file extension.
fn guess_content_type(file_name: &str) -> mime::Mime {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let essence = match ext.as_str() {
        "txt" | "log" => return mime::TEXT_PLAIN_UTF_8,
        "html" | "htm" => return mime::TEXT_HTML_UTF_8,
        "css" => return mime::TEXT_CSS_UTF_8,
        "csv" => return mime::TEXT_CSV_UTF_8,
        "js" => return mime::APPLICATION_JAVASCRIPT_UTF_8,
        "json" => return mime::APPLICATION_JSON,
        "xml" => return mime::TEXT_XML,
        "pdf" => return mime::APPLICATION_PDF,
        "png" => return mime::IMAGE_PNG,
        "jpg" | "jpeg" => return mime::IMAGE_JPEG,
        "gif" => return mime::IMAGE_GIF,
        "bmp" => return mime::IMAGE_BMP,
        "svg" => return mime::IMAGE_SVG,
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "zip" => "application/zip",
        _ => return mime::APPLICATION_OCTET_STREAM,
    };
    essence.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

//! HTTP response building module
//!
//! Builders for JSON bodies, error bodies and stored-file bodies.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG,
    LAST_MODIFIED,
};
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::range::ByteRange;
use crate::errors::Error;
use crate::logger;

const JSON: &str = "application/json";

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON)
        .header(CONTENT_LENGTH, json.len())
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// `{"message": ...}` body with the given status
pub fn message_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "message": message }).to_string();
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON)
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Map a handler error onto its JSON response
pub fn error_response(err: &Error) -> Response<Full<Bytes>> {
    let mut response = message_response(err.status_code(), &err.user_message());
    if let Error::MethodNotAllowed { allow } = *err {
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static(allow));
    }
    response
}

/// Validators attached to every stored-file response
pub struct FileHeaders<'a> {
    pub content_type: &'static str,
    pub etag: &'a str,
    pub last_modified: Option<&'a str>,
}

/// 200 with the whole file
pub fn file_response(data: Vec<u8>, headers: &FileHeaders<'_>, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { Bytes::from(data) };

    file_builder(StatusCode::OK, headers)
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::OK, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// 206 with one byte range of the file
pub fn partial_response(
    data: &[u8],
    range: ByteRange,
    headers: &FileHeaders<'_>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let total = data.len() as u64;
    let body = if is_head {
        Bytes::new()
    } else {
        // range was resolved against data.len(), so both bounds fit usize
        let start = usize::try_from(range.start).unwrap_or(usize::MAX);
        let end = usize::try_from(range.end).unwrap_or(usize::MAX);
        data.get(start..=end).map_or_else(Bytes::new, Bytes::copy_from_slice)
    };

    file_builder(StatusCode::PARTIAL_CONTENT, headers)
        .header(CONTENT_LENGTH, range.len())
        .header(CONTENT_RANGE, range.content_range(total))
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::PARTIAL_CONTENT, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// 304 Not Modified
pub fn not_modified_response(headers: &FileHeaders<'_>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, headers.etag);
    if let Some(date) = headers.last_modified {
        builder = builder.header(LAST_MODIFIED, date);
    }
    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error(StatusCode::NOT_MODIFIED, &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// 416 Range Not Satisfiable
pub fn range_not_satisfiable_response(total: u64) -> Response<Full<Bytes>> {
    let mut response = message_response(StatusCode::RANGE_NOT_SATISFIABLE, "Range Not Satisfiable");
    if let Ok(value) = format!("bytes */{total}").parse() {
        response.headers_mut().insert(CONTENT_RANGE, value);
    }
    response
}

fn file_builder(status: StatusCode, headers: &FileHeaders<'_>) -> hyper::http::response::Builder {
    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, headers.content_type)
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, headers.etag);
    if let Some(date) = headers.last_modified {
        builder = builder.header(LAST_MODIFIED, date);
    }
    builder
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}

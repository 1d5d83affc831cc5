//! Cross-origin resource sharing
//!
//! Preflight answers and the headers added to ordinary responses, driven
//! entirely by [`CorsConfig`].

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, ORIGIN, VARY,
};
use hyper::{Method, Response, StatusCode};

use crate::config::CorsConfig;
use crate::errors::Error;
use crate::logger;

/// Methods advertised when every method is allowed
const ALL_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";

/// Request headers that never need to be listed
const SAFELISTED_HEADERS: [&str; 4] = ["accept", "accept-language", "content-language", "content-type"];

/// An OPTIONS request carrying both `Origin` and `Access-Control-Request-Method`
pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(ORIGIN)
        && headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

/// Answer a preflight, or reject it with 400
pub fn preflight_response(cors: &CorsConfig, headers: &HeaderMap) -> Result<Response<Full<Bytes>>, Error> {
    let origin = header_str(headers, ORIGIN).unwrap_or_default();
    if !cors.is_origin_allowed(origin) {
        logger::log_debug(&format!("CORS preflight rejected for origin '{origin}'"));
        return Err(Error::DisallowedCors { what: "origin" });
    }

    let requested_method = header_str(headers, ACCESS_CONTROL_REQUEST_METHOD).unwrap_or_default();
    if !method_allowed(cors, requested_method) {
        return Err(Error::DisallowedCors { what: "method" });
    }

    let requested_headers = header_str(headers, ACCESS_CONTROL_REQUEST_HEADERS).unwrap_or_default();
    if !headers_allowed(cors, requested_headers) {
        return Err(Error::DisallowedCors { what: "headers" });
    }

    let allow_methods = if cors.allows_any_method() {
        ALL_METHODS.to_string()
    } else {
        cors.allow_methods.join(", ")
    };
    let allow_headers = if cors.allows_any_header() {
        requested_headers.to_string()
    } else {
        cors.allow_headers.join(", ")
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(ACCESS_CONTROL_ALLOW_METHODS, allow_methods)
        .header(ACCESS_CONTROL_MAX_AGE, cors.max_age);
    if !allow_headers.is_empty() {
        builder = builder.header(ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
    }

    let mut response = builder
        .body(Full::new(Bytes::from_static(b"OK")))
        .map_err(|e| Error::BadRequest {
            message: format!("Invalid preflight request: {e}"),
        })?;
    add_origin_headers(cors, origin, response.headers_mut());
    Ok(response)
}

/// Add `Access-Control-Allow-*` headers to a non-preflight response when
/// the request came from an allowed origin
pub fn apply(cors: &CorsConfig, origin: Option<&str>, response: &mut Response<Full<Bytes>>) {
    if let Some(origin) = origin {
        if cors.is_origin_allowed(origin) {
            add_origin_headers(cors, origin, response.headers_mut());
        }
    }
}

fn add_origin_headers(cors: &CorsConfig, origin: &str, headers: &mut HeaderMap) {
    // With credentials the wildcard is not honoured by browsers, so echo
    let wildcard = cors.allows_any_origin() && !cors.allow_credentials;
    if wildcard {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    } else if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }
    if cors.allow_credentials {
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    }
}

fn method_allowed(cors: &CorsConfig, method: &str) -> bool {
    cors.allows_any_method()
        || cors
            .allow_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method.trim()))
}

fn headers_allowed(cors: &CorsConfig, requested: &str) -> bool {
    if cors.allows_any_header() {
        return true;
    }
    requested
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .all(|h| {
            SAFELISTED_HEADERS.iter().any(|s| s.eq_ignore_ascii_case(h))
                || cors.allow_headers.iter().any(|a| a.eq_ignore_ascii_case(h))
        })
}

fn header_str(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: CORS preflight, route matching,
//! method validation, error mapping and access logging.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, ORIGIN, SERVER};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::{cors, files, upload};
use crate::config::{AppState, RoutesConfig, StorageConfig};
use crate::errors::Error;
use crate::http::{self, path};
use crate::logger::{self, AccessLogEntry};

const UPLOAD_ALLOW: &str = "POST, OPTIONS";
const READ_ALLOW: &str = "GET, HEAD, OPTIONS";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range_header: Option<String>,
}

/// Which handler a path belongs to
#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Upload,
    List,
    /// Percent-encoded filename segment
    Download(&'a str),
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_log = state.config.logging.access_log;

    let mut entry = access_log.then(|| access_entry(&req, remote_addr));
    let origin = header_string(&req, ORIGIN.as_str());

    let result = if state.config.cors.enabled && cors::is_preflight(req.method(), req.headers()) {
        cors::preflight_response(&state.config.cors, req.headers())
    } else {
        dispatch(req, &state).await
    };

    let mut response = result.unwrap_or_else(|err| {
        if err.is_server_error() {
            logger::log_error(&format!("Request failed: {err}"));
        } else {
            logger::log_debug(&format!("Request rejected: {err}"));
        }
        http::error_response(&err)
    });

    if state.config.cors.enabled {
        cors::apply(&state.config.cors, origin.as_deref(), &mut response);
    }
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route the request and run its handler
async fn dispatch<B>(req: Request<B>, state: &AppState) -> Result<Response<Full<Bytes>>, Error>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let route = match_route(req.uri().path(), &state.config.routes, &state.config.storage)
        .ok_or(Error::RouteNotFound)?;

    let method = req.method().clone();
    match route {
        Route::Upload => match method {
            Method::POST => {
                upload::check_declared_size(&req, state.config.http.max_body_size)?;
                upload::upload_file(req, state).await
            }
            Method::OPTIONS => Ok(options_response(UPLOAD_ALLOW)),
            _ => Err(Error::MethodNotAllowed {
                allow: UPLOAD_ALLOW,
            }),
        },
        Route::List | Route::Download(_) => {
            if method == Method::OPTIONS {
                return Ok(options_response(READ_ALLOW));
            }
            if method != Method::GET && method != Method::HEAD {
                return Err(Error::MethodNotAllowed { allow: READ_ALLOW });
            }

            match route {
                Route::Download(name) => {
                    let ctx = RequestContext {
                        path: req.uri().path(),
                        is_head: method == Method::HEAD,
                        if_none_match: header_string(&req, "if-none-match"),
                        if_modified_since: header_string(&req, "if-modified-since"),
                        range_header: header_string(&req, "range"),
                    };
                    logger::log_debug(&format!("Download requested: {}", ctx.path));
                    files::download_file(&ctx, state, name).await
                }
                _ => files::list_files(state).await,
            }
        }
    }
}

/// Match `path` against the configured routes. Upload wins over list,
/// list wins over download.
fn match_route<'a>(
    request_path: &'a str,
    routes: &RoutesConfig,
    storage: &StorageConfig,
) -> Option<Route<'a>> {
    let normalized = normalize(request_path);

    if normalized == normalize(&routes.upload_path) {
        return Some(Route::Upload);
    }
    if normalized == normalize(&routes.list_path) {
        return Some(Route::List);
    }

    storage.download_prefixes.iter().find_map(|prefix| {
        path::strip_route_prefix(request_path, prefix)
            .filter(|name| !name.is_empty())
            .map(Route::Download)
    })
}

/// Drop trailing slashes so `/upload` and `/upload/` are the same route
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// 204 answer to a plain (non-CORS) OPTIONS request
fn options_response(allow: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
        .headers_mut()
        .insert(hyper::header::ALLOW, HeaderValue::from_static(allow));
    response
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header_string(req, "referer");
    entry.user_agent = header_string(req, "user-agent");
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::FileStore;
    use http_body_util::BodyExt;
    use hyper::header::{
        ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_REQUEST_METHOD, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG,
        IF_NONE_MATCH, RANGE,
    };
    use hyper::body::Frame;
    use std::collections::{HashSet, VecDeque};
    use std::pin::Pin;
    use std::task::{Context, Poll};

    const BOUNDARY: &str = "----fileserver-test-boundary";

    struct TestServer {
        _dir: tempfile::TempDir,
        state: Arc<AppState>,
    }

    impl TestServer {
        async fn new() -> Self {
            Self::with_config(|_| {}).await
        }

        async fn with_config(tweak: impl FnOnce(&mut Config)) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut config = Config::load_from("definitely-not-a-config-file").unwrap();
            config.logging.access_log = false;
            tweak(&mut config);
            let store = FileStore::open(dir.path().join("uploads")).await.unwrap();
            Self {
                _dir: dir,
                state: Arc::new(AppState::new(&config, store)),
            }
        }

        async fn send<B>(&self, req: Request<B>) -> (StatusCode, hyper::HeaderMap, Bytes)
        where
            B: Body<Data = Bytes> + Send + 'static,
            B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
        {
            let addr: SocketAddr = "127.0.0.1:50000".parse().unwrap();
            let resp = handle_request(req, Arc::clone(&self.state), addr).await.unwrap();
            let (parts, body) = resp.into_parts();
            let bytes = body.collect().await.unwrap().to_bytes();
            (parts.status, parts.headers, bytes)
        }

        async fn upload(&self, filename: &str, content: &[u8]) -> (StatusCode, serde_json::Value) {
            let (status, _, body) = self.send(upload_request("/upload/", "file", Some(filename), content)).await;
            (status, serde_json::from_slice(&body).unwrap())
        }

        async fn get(&self, path: &str) -> (StatusCode, hyper::HeaderMap, Bytes) {
            self.send(get_request(path)).await
        }
    }

    /// Body that hands out `frame_size` pieces and returns `Pending` before
    /// each one, like a chunked upload arriving off the socket
    struct Chunks {
        frames: VecDeque<Bytes>,
        ready: bool,
    }

    impl Chunks {
        fn new(data: Vec<u8>, frame_size: usize) -> Self {
            let data = Bytes::from(data);
            let frames = (0..data.len())
                .step_by(frame_size)
                .map(|i| data.slice(i..(i + frame_size).min(data.len())))
                .collect();
            Self { frames, ready: false }
        }
    }

    impl Body for Chunks {
        type Data = Bytes;
        type Error = Infallible;

        fn poll_frame(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
            let this = self.get_mut();
            if !this.ready {
                this.ready = true;
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
            this.ready = false;
            Poll::Ready(this.frames.pop_front().map(|b| Ok(Frame::data(b))))
        }
    }

    fn chunked_upload_request(body: Vec<u8>) -> Request<Chunks> {
        Request::builder()
            .method(Method::POST)
            .uri("/upload/")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Chunks::new(body, 64))
            .unwrap()
    }

    fn multipart_body(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
        let disposition = match filename {
            Some(f) => format!("form-data; name=\"{field}\"; filename=\"{f}\""),
            None => format!("form-data; name=\"{field}\""),
        };
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"note\"\r\n\r\nignored\r\n");
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(path: &str, field: &str, filename: Option<&str>, content: &[u8]) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Full::new(Bytes::from(multipart_body(field, filename, content))))
            .unwrap()
    }

    fn get_request(path: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn json(body: &Bytes) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    #[test]
    fn test_match_route() {
        fn m(p: &str) -> Option<Route<'_>> {
            let config = Config::load_from("definitely-not-a-config-file").unwrap();
            match_route(p, &config.routes, &config.storage)
        }

        assert_eq!(m("/upload/"), Some(Route::Upload));
        assert_eq!(m("/upload"), Some(Route::Upload));
        assert_eq!(m("/files"), Some(Route::List));
        assert_eq!(m("/files/"), Some(Route::List));
        assert_eq!(m("/files/a.txt"), Some(Route::Download("a.txt")));
        assert_eq!(m("/tiff/dem.tif"), Some(Route::Download("dem.tif")));
        assert_eq!(m("/tiff/"), None);
        assert_eq!(m("/"), None);
        assert_eq!(m("/filesystem"), None);
    }

    #[tokio::test]
    async fn test_upload_then_download() {
        let server = TestServer::new().await;

        let (status, body) = server.upload("a.txt", b"hello").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"filename": "a.txt", "url": "/files/a.txt"}));

        let (status, headers, body) = server.get("/files/a.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"hello");
        assert_eq!(headers[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(headers[CONTENT_LENGTH], "5");
        assert!(headers.contains_key(ETAG));
        assert!(headers.contains_key(hyper::header::LAST_MODIFIED));
    }

    #[tokio::test]
    async fn test_upload_overwrites() {
        let server = TestServer::new().await;
        server.upload("a.txt", b"first, longer content").await;
        server.upload("a.txt", b"second").await;

        let (_, _, body) = server.get("/files/a.txt").await;
        assert_eq!(&body[..], b"second");
    }

    #[tokio::test]
    async fn test_download_missing() {
        let server = TestServer::new().await;
        let (status, headers, body) = server.get("/files/missing.bin").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(json(&body), serde_json::json!({"message": "File not found"}));
    }

    #[tokio::test]
    async fn test_tiff_prefix_serves_same_store() {
        let server = TestServer::new().await;
        server.upload("dem.tif", b"II*\0raster").await;

        let (status, headers, body) = server.get("/tiff/dem.tif").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_TYPE], "image/tiff");
        assert_eq!(&body[..], b"II*\0raster");

        let (status, _, body) = server.get("/tiff/other.tif").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["message"], "File not found");
    }

    #[tokio::test]
    async fn test_list_files() {
        let server = TestServer::new().await;

        let (status, _, body) = server.get("/files").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), serde_json::json!([]));

        server.upload("x.txt", b"x").await;
        server.upload("y.txt", b"y").await;
        std::fs::create_dir(server.state.store.root().join("stray-dir")).unwrap();

        let (_, _, body) = server.get("/files").await;
        let names: HashSet<String> = serde_json::from_slice(&body).unwrap();
        let expected: HashSet<String> = ["x.txt", "y.txt"].iter().map(ToString::to_string).collect();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn test_percent_encoded_name() {
        let server = TestServer::new().await;
        server.upload("my map.tif", b"data").await;

        let (status, _, body) = server.get("/files/my%20map.tif").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"data");
    }

    #[tokio::test]
    async fn test_traversal_upload_rejected() {
        let server = TestServer::new().await;
        let (status, body) = server.upload("../escape.txt", b"x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid filename");
        assert!(!server.state.store.root().join("../escape.txt").exists());

        let (status, _, _) = server.get("/files/..%2Fescape.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let server = TestServer::new().await;

        let req = upload_request("/upload/", "document", Some("a.txt"), b"x");
        let (status, _, body) = server.send(req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json(&body)["message"], "Missing file field");

        let req = upload_request("/upload/", "file", None, b"x");
        let (status, _, _) = server.send(req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_upload_requires_multipart() {
        let server = TestServer::new().await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/upload/")
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        let (status, _, _) = server.send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let server = TestServer::with_config(|c| c.http.max_body_size = 64).await;

        // whole body in a single frame
        let (status, _) = server.upload("big.bin", &[7u8; 256]).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        // declared size check
        let mut req = upload_request("/upload/", "file", Some("big.bin"), b"x");
        req.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from_static("100000"));
        let (status, _, _) = server.send(req).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_oversize_chunked_upload_keeps_stored_file() {
        let server = TestServer::with_config(|c| c.http.max_body_size = 2048).await;
        let (status, _) = server.upload("a.txt", b"hello").await;
        assert_eq!(status, StatusCode::OK);

        let body = multipart_body("file", Some("a.txt"), &[b'Z'; 4096]);
        let (status, _, body) = server.send(chunked_upload_request(body)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json(&body)["message"], "Payload Too Large");

        let (status, _, content) = server.get("/files/a.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&content[..], b"hello");

        let (_, _, listing) = server.get("/files").await;
        assert_eq!(json(&listing), serde_json::json!(["a.txt"]));
    }

    #[tokio::test]
    async fn test_truncated_multipart_keeps_stored_file() {
        let server = TestServer::new().await;
        server.upload("a.txt", b"hello").await;

        let mut body = multipart_body("file", Some("a.txt"), &[b'Z'; 1024]);
        // cut inside the file content, before the closing boundary
        body.truncate(body.len() - 200);
        let (status, _, _) = server.send(chunked_upload_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, _, content) = server.get("/files/a.txt").await;
        assert_eq!(&content[..], b"hello");
        let (_, _, listing) = server.get("/files").await;
        assert_eq!(json(&listing), serde_json::json!(["a.txt"]));
    }

    #[tokio::test]
    async fn test_chunked_upload_is_stored_whole() {
        let server = TestServer::new().await;
        let content: Vec<u8> = (0..5000u32).map(|i| u8::try_from(i % 251).unwrap()).collect();

        let body = multipart_body("file", Some("data.bin"), &content);
        let (status, _, _) = server.send(chunked_upload_request(body)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, stored) = server.get("/files/data.bin").await;
        assert_eq!(&stored[..], &content[..]);
    }

    #[tokio::test]
    async fn test_upload_url_keeps_raw_filename() {
        let server = TestServer::new().await;
        let (status, body) = server.upload("50% off.txt", b"sale").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "/files/50% off.txt");

        // clients must encode the name themselves to fetch it back
        let (status, _, content) = server.get("/files/50%25%20off.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&content[..], b"sale");
    }

    #[tokio::test]
    async fn test_method_not_allowed_and_unknown_route() {
        let server = TestServer::new().await;

        let (status, headers, body) = server.get("/upload/").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers[ALLOW], UPLOAD_ALLOW);
        assert_eq!(json(&body)["message"], "Method Not Allowed");

        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/files/a.txt")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, headers, _) = server.send(req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers[ALLOW], READ_ALLOW);

        let (status, _, body) = server.get("/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["message"], "Not Found");
    }

    #[tokio::test]
    async fn test_head_download() {
        let server = TestServer::new().await;
        server.upload("a.txt", b"hello").await;

        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/files/a.txt")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, headers, body) = server.send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_LENGTH], "5");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_conditional_and_range_download() {
        let server = TestServer::new().await;
        server.upload("a.txt", b"hello world").await;

        let (_, headers, _) = server.get("/files/a.txt").await;
        let etag = headers[ETAG].clone();

        let mut req = get_request("/files/a.txt");
        req.headers_mut().insert(IF_NONE_MATCH, etag);
        let (status, _, body) = server.send(req).await;
        assert_eq!(status, StatusCode::NOT_MODIFIED);
        assert!(body.is_empty());

        let mut req = get_request("/files/a.txt");
        req.headers_mut().insert(RANGE, HeaderValue::from_static("bytes=6-"));
        let (status, headers, body) = server.send(req).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(headers[CONTENT_RANGE], "bytes 6-10/11");
        assert_eq!(&body[..], b"world");

        let mut req = get_request("/files/a.txt");
        req.headers_mut().insert(RANGE, HeaderValue::from_static("bytes=50-"));
        let (status, _, _) = server.send(req).await;
        assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[tokio::test]
    async fn test_cors_headers_on_simple_requests() {
        let server = TestServer::new().await;

        let mut req = get_request("/files");
        req.headers_mut().insert(ORIGIN, HeaderValue::from_static("http://localhost:3000"));
        let (_, headers, _) = server.send(req).await;
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

        let mut req = get_request("/files");
        req.headers_mut().insert(ORIGIN, HeaderValue::from_static("http://evil.example"));
        let (_, headers, _) = server.send(req).await;
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let server = TestServer::new().await;

        let preflight = |origin: &'static str| {
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/upload/")
                .header(ORIGIN, origin)
                .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Full::new(Bytes::new()))
                .unwrap()
        };

        let (status, headers, _) = server.send(preflight("http://localhost:3000")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");

        let (status, headers, body) = server.send(preflight("http://evil.example")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(json(&body)["message"], "Disallowed CORS origin");
    }

    #[tokio::test]
    async fn test_cors_disabled() {
        let server = TestServer::with_config(|c| c.cors.enabled = false).await;

        let mut req = get_request("/files");
        req.headers_mut().insert(ORIGIN, HeaderValue::from_static("http://localhost:3000"));
        let (_, headers, _) = server.send(req).await;
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/upload/")
            .header(ORIGIN, "http://localhost:3000")
            .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, headers, _) = server.send(req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(headers[ALLOW], UPLOAD_ALLOW);
    }

    #[tokio::test]
    async fn test_custom_storage_layout() {
        let server = TestServer::with_config(|c| {
            c.storage.download_prefixes = vec!["/tiff".to_string()];
        })
        .await;

        let (_, body) = server.upload("dem.tif", b"tif").await;
        assert_eq!(body["url"], "/tiff/dem.tif");

        let (status, _, _) = server.get("/files/dem.tif").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = server.get("/tiff/dem.tif").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_access_log_follows_config() {
        let server = TestServer::with_config(|c| c.logging.access_log = true).await;
        assert!(server.state.config.logging.access_log);

        let (status, _, body) = server.get("/files").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_server_header() {
        let server = TestServer::new().await;
        let (_, headers, _) = server.get("/files").await;
        assert_eq!(headers[SERVER], "rust-fileserver/0.1");
    }
}

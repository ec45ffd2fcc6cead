//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching, and dispatching.

use crate::config::AppState;
use crate::handler::files;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub debug: bool,
}

/// Main entry point for HTTP request handling
///
/// The request body is never read; both endpoints take their input from the query string.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: Option<SocketAddr>,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    drop(body);

    let mut access_entry = state.config.logging.access_log.then(|| {
        AccessLogEntry::from_request(
            peer_addr,
            &parts.method,
            &parts.uri,
            parts.version,
            &parts.headers,
        )
    });

    let mut response = dispatch(&parts, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }
    if state.config.http.enable_cors {
        response
            .headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }

    if let Some(entry) = access_entry.as_mut() {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes, started.elapsed());
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch(parts: &Parts, state: &Arc<AppState>) -> Response<ResponseBody> {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&parts.method, state.config.http.enable_cors) {
        return resp;
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(parts, state.config.http.max_body_size) {
        return resp;
    }

    // 3. Log headers if enabled
    logger::log_headers_count(parts.headers.len(), state.config.logging.show_headers);

    let ctx = RequestContext {
        path: parts.uri.path(),
        query: parts.uri.query(),
        is_head: parts.method == Method::HEAD,
        debug: state.config.logging.is_debug(),
    };

    route_request(&ctx, state).await
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<ResponseBody>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(parts: &Parts, max_body_size: u64) -> Option<Response<ResponseBody>> {
    let content_length = parts.headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Route request based on path and configuration
async fn route_request(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<ResponseBody> {
    // Health check endpoints
    let health = &state.config.health;
    if health.enabled {
        if ctx.path == health.liveness_path {
            return http::build_health_response(hyper::StatusCode::OK, "ok");
        }
        if ctx.path == health.readiness_path {
            return files::serve_readiness(state).await;
        }
    }

    // Trailing slash is accepted for both file endpoints
    match ctx.path.trim_end_matches('/') {
        "/files/download" => files::serve_download(ctx, state).await,
        "/files/read" => files::serve_read(ctx, state).await,
        _ => http::build_404_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::files::RangeFileServer;
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("job123.log"), b"hello world").unwrap();

        let mut config = Config::load_from("does-not-exist/fileserver").unwrap();
        config.logging.access_log = false;
        let files = RangeFileServer::new(dir.path()).unwrap();
        (dir, Arc::new(AppState::with_files(&config, files)))
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str) -> Response<ResponseBody> {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        handle_request(req, Arc::clone(state), None).await.unwrap()
    }

    async fn body_string(resp: Response<ResponseBody>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_read_endpoint() {
        let (_dir, state) = setup();

        let resp = send(&state, Method::GET, "/files/read?path=job123.log&offset=6").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"data": "world", "length": 5, "offset": 6})
        );

        let resp = send(&state, Method::GET, "/files/read/?path=job123.log&offset=0&length=5").await;
        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"data": "hello", "length": 5, "offset": 0})
        );
    }

    #[tokio::test]
    async fn test_read_past_end() {
        let (_dir, state) = setup();

        let resp = send(&state, Method::GET, "/files/read?path=job123.log&offset=50").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(json, serde_json::json!({"data": "", "length": 0, "offset": 50}));

        let resp = send(
            &state,
            Method::GET,
            "/files/read?path=job123.log&offset=18446744073709551615",
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"data": "", "length": 0, "offset": u64::MAX})
        );
    }

    #[tokio::test]
    async fn test_download_endpoint() {
        let (_dir, state) = setup();

        let resp = send(&state, Method::GET, "/files/download?path=job123.log").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()["Content-Disposition"],
            "attachment; filename=job123.log"
        );
        assert_eq!(resp.headers()["Content-Length"], "11");
        assert_eq!(resp.headers()["Content-Type"], "text/plain; charset=utf-8");
        assert_eq!(resp.headers()["Server"], "fileserver");
        assert_eq!(body_string(resp).await, "hello world");
    }

    #[tokio::test]
    async fn test_head_download_has_headers_only() {
        let (_dir, state) = setup();

        let resp = send(&state, Method::HEAD, "/files/download/?path=job123.log").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Length"], "11");
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn test_missing_path() {
        let (_dir, state) = setup();

        for uri in ["/files/read", "/files/download", "/files/read?offset=3"] {
            let resp = send(&state, Method::GET, uri).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body_string(resp).await, "ERROR: No path given");
        }
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (_dir, state) = setup();

        let resp = send(&state, Method::GET, "/files/read?path=missing.log").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, "ERROR: File missing.log not found");

        let resp = send(&state, Method::GET, "/files/download?path=missing.log").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let (_dir, state) = setup();

        for uri in [
            "/files/read?path=../../etc/passwd",
            "/files/download?path=..%2F..%2Fetc%2Fpasswd",
            "/files/download?path=%2Fetc%2Fpasswd",
        ] {
            let resp = send(&state, Method::GET, uri).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_invalid_offset() {
        let (_dir, state) = setup();

        let resp = send(&state, Method::GET, "/files/read?path=job123.log&offset=-1").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = send(&state, Method::GET, "/files/read?path=job123.log&length=ten").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_method_and_route_handling() {
        let (_dir, state) = setup();

        let resp = send(&state, Method::POST, "/files/read?path=job123.log").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let resp = send(&state, Method::OPTIONS, "/files/read").await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = send(&state, Method::GET, "/files/list").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (dir, state) = setup();

        let resp = send(&state, Method::GET, "/healthz").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = send(&state, Method::GET, "/readyz").await;
        assert_eq!(resp.status(), StatusCode::OK);

        drop(dir);
        let resp = send(&state, Method::GET, "/readyz").await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

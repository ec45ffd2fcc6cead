//! HTTP response building module
//!
//! Provides builders for various HTTP status code responses, decoupled from specific business logic.

use super::body::{empty, full, ResponseBody};
use crate::error::FileServerError;
use crate::files::Download;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Build 404 Not Found response for unknown routes
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(full("404 Not Found"))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(full("404 Not Found"))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full("405 Method Not Allowed"))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS");

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, HEAD, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(empty()).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(empty())
    })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<ResponseBody> {
    Response::builder()
        .status(413)
        .header("Content-Type", "text/plain")
        .body(full("413 Payload Too Large"))
        .unwrap_or_else(|e| {
            log_build_error("413", &e);
            Response::new(full("413 Payload Too Large"))
        })
}

/// Build plain-text response for a failed file request
pub fn build_error_response(error: &FileServerError) -> Response<ResponseBody> {
    let message = format!("ERROR: {error}");
    Response::builder()
        .status(error.status())
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", message.len())
        .body(full(message))
        .unwrap_or_else(|e| {
            log_build_error(error.status().as_str(), &e);
            Response::new(empty())
        })
}

/// Build health check response
pub fn build_health_response(status: StatusCode, body: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-cache")
        .body(full(body))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(full(body))
        })
}

/// Build JSON response
pub fn build_json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
    is_head: bool,
) -> Response<ResponseBody> {
    let json = match serde_json::to_vec(value) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "text/plain")
                .body(full("ERROR: Internal server error"))
                .unwrap_or_else(|_| Response::new(empty()));
        }
    };

    let content_length = json.len();
    let body = if is_head { empty() } else { full(json) };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .header("Cache-Control", "no-cache")
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("JSON", &e);
            Response::new(empty())
        })
}

/// Build 200 response streaming a file as an attachment
pub fn build_attachment_response(
    download: Download,
    content_type: &str,
    is_head: bool,
) -> Response<ResponseBody> {
    let disposition = content_disposition(&download.file_name);
    let body = if is_head {
        empty()
    } else {
        download.body.boxed()
    };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", download.len)
        .header("Content-Disposition", disposition)
        .header("Cache-Control", "no-cache")
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(empty())
        })
}

/// `attachment; filename=...` header value
///
/// Token-safe names are sent bare; anything else is quoted with non-ASCII
/// and control characters replaced so the header stays valid.
pub fn content_disposition(file_name: &str) -> String {
    let is_token = !file_name.is_empty()
        && file_name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b));
    if is_token {
        return format!("attachment; filename={file_name}");
    }

    let quoted: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => format!("\\{c}"),
            c if c.is_ascii() && !c.is_ascii_control() => c.to_string(),
            _ => "_".to_string(),
        })
        .collect();
    format!("attachment; filename=\"{quoted}\"")
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

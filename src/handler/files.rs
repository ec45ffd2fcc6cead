//! File endpoints
//!
//! Query-string shell around `RangeFileServer`: parses parameters, invokes
//! the operation, and turns the outcome into a response.

use crate::config::AppState;
use crate::error::Result;
use crate::files::ReadRequest;
use crate::handler::router::RequestContext;
use crate::http::{self, mime, QueryParams, ResponseBody};
use crate::logger;
use hyper::{Response, StatusCode};
use std::sync::Arc;

/// `GET /files/download?path=...`
pub async fn serve_download(
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
) -> Response<ResponseBody> {
    download(ctx, state).await.unwrap_or_else(|e| {
        logger::log_request_failed("download", &e);
        http::build_error_response(&e)
    })
}

/// `GET /files/read?path=...&offset=...&length=...`
pub async fn serve_read(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<ResponseBody> {
    read(ctx, state).await.unwrap_or_else(|e| {
        logger::log_request_failed("read", &e);
        http::build_error_response(&e)
    })
}

/// Ready while the root directory is still reachable
pub async fn serve_readiness(state: &Arc<AppState>) -> Response<ResponseBody> {
    match tokio::fs::metadata(state.files.root()).await {
        Ok(m) if m.is_dir() => http::build_health_response(StatusCode::OK, "ok"),
        _ => {
            logger::log_warning(&format!(
                "Root directory unavailable: {}",
                state.files.root().display()
            ));
            http::build_health_response(StatusCode::SERVICE_UNAVAILABLE, "root unavailable")
        }
    }
}

async fn download(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Result<Response<ResponseBody>> {
    let params = QueryParams::parse(ctx.query);
    let path = params.required("path")?;

    let download = state.files.download(path).await?;
    logger::log_debug(
        &format!("download {} ({} bytes)", download.path.display(), download.len),
        ctx.debug,
    );

    let content_type = mime::get_content_type(download.path.extension().and_then(|e| e.to_str()));
    Ok(http::build_attachment_response(download, content_type, ctx.is_head))
}

async fn read(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Result<Response<ResponseBody>> {
    let params = QueryParams::parse(ctx.query);
    let request = ReadRequest {
        path: params.required("path")?.to_string(),
        offset: params.u64_or("offset", 0)?,
        length: params.optional_u64("length")?,
    };

    let result = state.files.read_range(&request).await?;
    logger::log_debug(
        &format!(
            "read {} offset={} requested={:?} returned={}",
            request.path, request.offset, request.length, result.length
        ),
        ctx.debug,
    );

    Ok(http::build_json_response(StatusCode::OK, &result, ctx.is_head))
}

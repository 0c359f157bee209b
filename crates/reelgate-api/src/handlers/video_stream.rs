use crate::auth::models::TenantContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use futures::StreamExt;
use reelgate_core::{AppError, StreamRange};
use reelgate_storage::ByteStream;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/tenants/{tenant}/videos/{id}/stream",
    tag = "videos",
    params(
        ("tenant" = String, Path, description = "Target tenant id"),
        ("id" = Uuid, Path, description = "Upload id"),
        ("Range" = Option<String>, Header, description = "Optional byte range, e.g. bytes=0-1023")
    ),
    responses(
        (status = 200, description = "Full video bytes"),
        (status = 206, description = "Requested byte range"),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Credential issued for a different tenant", body = ErrorResponse),
        (status = 404, description = "Upload not found", body = ErrorResponse),
        (status = 416, description = "Range outside the blob", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, tenant_ctx, headers), fields(tenant_id = %tenant, video_id = %id))]
pub async fn stream_video(
    tenant_ctx: TenantContext,
    Path((tenant, id)): Path<(String, Uuid)>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    tenant_ctx.require_tenant(&tenant).map_err(HttpAppError)?;

    // Cross-tenant and nonexistent ids are indistinguishable here.
    let record = state
        .registry
        .get(&tenant, id)
        .await
        .ok_or_else(|| HttpAppError(AppError::NotFound("Video not found".to_string())))?;

    let total = record.file_size;
    let range_header = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let range = StreamRange::parse(range_header, total).map_err(HttpAppError)?;

    match range {
        None => {
            let stream = state
                .storage
                .read_stream(record.storage_key())
                .await
                .map_err(HttpAppError::from)?;

            build_response(StatusCode::OK, &record.content_type, total, None, stream)
        }
        Some(range) => {
            let stream = state
                .storage
                .read_range(record.storage_key(), range.start, range.end)
                .await
                .map_err(HttpAppError::from)?;

            tracing::debug!(
                start = range.start,
                end = range.end,
                total,
                "Serving partial content"
            );

            build_response(
                StatusCode::PARTIAL_CONTENT,
                &record.content_type,
                range.len(),
                Some(range),
                stream,
            )
        }
    }
}

fn build_response(
    status: StatusCode,
    content_type: &str,
    content_length: u64,
    range: Option<StreamRange>,
    stream: ByteStream,
) -> Result<Response, HttpAppError> {
    // Storage errors mid-stream surface as IO errors on the body; the
    // connection drops rather than sending a corrupt tail.
    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::ACCEPT_RANGES, "bytes");

    if let Some(range) = range {
        builder = builder.header(header::CONTENT_RANGE, range.content_range());
    }

    builder
        .body(Body::from_stream(body_stream))
        .map_err(|e| HttpAppError(AppError::Internal(format!("Failed to build response: {}", e))))
}

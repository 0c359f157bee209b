use crate::auth::models::TenantContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use reelgate_core::{AppError, UploadResponse};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/tenants/{tenant}/videos",
    tag = "videos",
    params(
        ("tenant" = String, Path, description = "Target tenant id")
    ),
    responses(
        (status = 200, description = "Uploads for the tenant in insertion order", body = Vec<UploadResponse>),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Credential issued for a different tenant", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, tenant_ctx), fields(tenant_id = %tenant))]
pub async fn list_videos(
    tenant_ctx: TenantContext,
    Path(tenant): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UploadResponse>>, HttpAppError> {
    tenant_ctx.require_tenant(&tenant).map_err(HttpAppError)?;

    let records = state.registry.list(&tenant).await;
    Ok(Json(records.into_iter().map(UploadResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v0/tenants/{tenant}/videos/{id}",
    tag = "videos",
    params(
        ("tenant" = String, Path, description = "Target tenant id"),
        ("id" = Uuid, Path, description = "Upload id")
    ),
    responses(
        (status = 200, description = "Upload record", body = UploadResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Credential issued for a different tenant", body = ErrorResponse),
        (status = 404, description = "Upload not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, tenant_ctx), fields(tenant_id = %tenant, video_id = %id))]
pub async fn get_video(
    tenant_ctx: TenantContext,
    Path((tenant, id)): Path<(String, Uuid)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    tenant_ctx.require_tenant(&tenant).map_err(HttpAppError)?;

    let record = state
        .registry
        .get(&tenant, id)
        .await
        .ok_or_else(|| HttpAppError(AppError::NotFound("Video not found".to_string())))?;

    Ok(Json(UploadResponse::from(record)))
}

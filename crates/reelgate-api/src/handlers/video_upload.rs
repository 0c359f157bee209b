use crate::auth::models::TenantContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Utc;
use futures::TryStreamExt;
use reelgate_core::{AppError, UploadAck, UploadRecord, UploadState, Verdict};
use std::sync::Arc;
use tokio_util::io::StreamReader;
use uuid::Uuid;

/// Multipart field carrying the video payload.
const UPLOAD_FIELD: &str = "video";

#[utoipa::path(
    post,
    path = "/api/v0/tenants/{tenant}/videos",
    tag = "videos",
    params(
        ("tenant" = String, Path, description = "Target tenant id")
    ),
    request_body(content_type = "multipart/form-data", description = "Video file in the 'video' field"),
    responses(
        (status = 200, description = "Upload accepted; processing runs asynchronously", body = UploadAck),
        (status = 400, description = "Missing or non-video payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Wrong tenant or insufficient role", body = ErrorResponse),
        (status = 413, description = "Payload exceeds the size cap", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, tenant_ctx, multipart), fields(tenant_id = %tenant, user_id = %tenant_ctx.user_id))]
pub async fn upload_video(
    tenant_ctx: TenantContext,
    Path(tenant): Path<String>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadAck>, HttpAppError> {
    tenant_ctx.require_tenant(&tenant).map_err(HttpAppError)?;
    tenant_ctx.require_upload_role().map_err(HttpAppError)?;

    let max_bytes = state.config.max_video_size_bytes();
    let type_prefix = state.config.video_content_type_prefix().to_string();

    let mut stored: Option<(Uuid, String, String, String, u64)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidPayload(format!("Malformed multipart body: {}", e)))
        .map_err(HttpAppError)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_default();
        if !content_type.starts_with(&type_prefix) {
            return Err(HttpAppError(AppError::InvalidPayload(format!(
                "Only video uploads are accepted, got '{}'",
                content_type
            ))));
        }

        let filename = sanitize_filename(field.file_name().unwrap_or("upload"));

        let id = Uuid::new_v4();
        // The id prefixes the stored name so two uploads of the same file
        // never collide on disk.
        let stored_name = format!("{}_{}", id, filename);

        // Spool the field to storage as it arrives instead of buffering the
        // whole payload; the backend enforces the size cap and discards the
        // partial blob on breach.
        let body = field.map_err(std::io::Error::other);
        let mut reader = StreamReader::new(Box::pin(body));

        let (storage_key, file_size) = state
            .storage
            .store_stream(
                &tenant,
                &stored_name,
                &content_type,
                max_bytes as u64,
                &mut reader,
            )
            .await
            .map_err(HttpAppError::from)?;

        stored = Some((id, filename, content_type, storage_key, file_size));
        break;
    }

    let (id, filename, content_type, storage_key, file_size) = stored.ok_or_else(|| {
        HttpAppError(AppError::InvalidPayload(format!(
            "Missing '{}' field in multipart body",
            UPLOAD_FIELD
        )))
    })?;

    let record = UploadRecord {
        id,
        filename,
        storage_key: storage_key.clone(),
        content_type,
        file_size,
        tenant_id: tenant.clone(),
        uploaded_by: tenant_ctx.user_id,
        state: UploadState::Processing,
        verdict: Verdict::Unknown,
        verdict_reason: None,
        progress: 0,
        created_at: Utc::now(),
    };

    if let Err(err) = state.registry.register(record.clone()).await {
        // Intake failed after the bytes were written; drop the orphan blob.
        if let Err(delete_err) = state.storage.delete(&storage_key).await {
            tracing::warn!(
                storage_key = %storage_key,
                error = %delete_err,
                "Failed to clean up orphaned blob"
            );
        }
        return Err(HttpAppError(err));
    }

    tracing::info!(
        video_id = %id,
        file_size,
        "Upload registered, processing started"
    );

    // The ack returns now; the verdict arrives later over the event channel.
    state.pipeline.start(record).await;

    Ok(Json(UploadAck {
        id,
        message: "Upload received, processing started".to_string(),
    }))
}

/// Keep only the final path component and drop separator characters.
fn sanitize_filename(raw: &str) -> String {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw)
        .replace(['\0'], "");
    if name.is_empty() || name == "." || name == ".." {
        "upload".to_string()
    } else {
        name
    }
}

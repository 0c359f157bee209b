use crate::auth::models::TenantContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use reelgate_core::AppError;
use std::sync::Arc;

/// Authenticate a request and attach its `TenantContext` to the extensions.
///
/// Authentication runs before any tenant or role check; those are enforced
/// per-operation by the handlers once an identity exists.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()) {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(err) => HttpAppError(err).into_response(),
    }
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<TenantContext, AppError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    let claims = state.jwt.validate(token)?;

    Ok(TenantContext {
        user_id: claims.sub,
        username: claims.username,
        tenant_id: claims.tenant_id,
        role: claims.role,
    })
}

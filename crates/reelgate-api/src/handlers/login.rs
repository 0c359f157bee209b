use crate::auth::models::UserRole;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginUser {
    pub id: Uuid,
    pub username: String,
    pub tenant_id: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

#[utoipa::path(
    post,
    path = "/api/v0/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credential issued", body = LoginResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(username = %request.0.username))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    request: ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpAppError> {
    let ValidatedJson(request) = request;

    let account = state.users.verify(&request.username, &request.password)?;

    let token = state
        .jwt
        .issue(account.id, &account.username, &account.tenant_id, account.role)?;

    tracing::info!(
        user_id = %account.id,
        tenant_id = %account.tenant_id,
        "Login successful"
    );

    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            id: account.id,
            username: account.username.clone(),
            tenant_id: account.tenant_id.clone(),
            role: account.role,
        },
    }))
}

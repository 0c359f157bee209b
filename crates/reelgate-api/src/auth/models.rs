use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use reelgate_core::AppError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// User role for authorization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    Viewer,
}

impl UserRole {
    /// Roles allowed to register new uploads.
    pub fn can_upload(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Editor)
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Editor => write!(f, "editor"),
            UserRole::Viewer => write!(f, "viewer"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub username: String,
    pub tenant_id: String,
    pub role: UserRole,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Tenant context extracted from a validated JWT and stored in request extensions
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub user_id: Uuid,
    pub username: String,
    pub tenant_id: String,
    pub role: UserRole,
}

impl TenantContext {
    /// Reject requests whose credential was issued for a different tenant.
    ///
    /// Pure check, safe to evaluate repeatedly; runs after authentication and
    /// independently of the role check.
    pub fn require_tenant(&self, target_tenant: &str) -> Result<(), AppError> {
        if self.tenant_id == target_tenant {
            Ok(())
        } else {
            Err(AppError::TenantMismatch(format!(
                "Credential issued for tenant '{}' cannot access tenant '{}'",
                self.tenant_id, target_tenant
            )))
        }
    }

    /// Reject callers whose role may not register uploads.
    pub fn require_upload_role(&self) -> Result<(), AppError> {
        if self.role.can_upload() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role '{}' is not allowed to upload videos",
                self.role
            )))
        }
    }
}

// Implement FromRequestParts for TenantContext to work with Multipart
// Extension cannot be used with Multipart, so we extract directly from request parts
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::new(
                        "Missing tenant context",
                        "MISSING_TENANT_CONTEXT",
                    )),
                )
            })
    }
}

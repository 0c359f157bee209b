//! OpenAPI documentation

use crate::error::ErrorResponse;
use crate::handlers;
use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login::login,
        handlers::video_get::list_videos,
        handlers::video_get::get_video,
        handlers::video_upload::upload_video,
        handlers::video_stream::stream_video,
    ),
    components(schemas(
        handlers::login::LoginRequest,
        handlers::login::LoginResponse,
        handlers::login::LoginUser,
        ErrorResponse,
        reelgate_core::UploadAck,
        reelgate_core::UploadResponse,
        reelgate_core::UploadState,
        reelgate_core::Verdict,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Credential issuance"),
        (name = "videos", description = "Upload intake, listing, and playback")
    ),
    info(
        title = "Reelgate API",
        description = "Multi-tenant video intake and playback service"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

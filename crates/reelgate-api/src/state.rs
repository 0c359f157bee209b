//! Shared application state

use crate::auth::jwt::JwtService;
use crate::auth::users::UserDirectory;
use crate::events::TenantEventBus;
use crate::pipeline::ProcessingPipeline;
use crate::registry::UploadRegistry;
use reelgate_core::Config;
use reelgate_storage::Storage;
use std::sync::Arc;

/// Application state shared across all request handlers.
pub struct AppState {
    pub config: Config,
    pub registry: Arc<UploadRegistry>,
    pub events: Arc<TenantEventBus>,
    pub storage: Arc<dyn Storage>,
    pub pipeline: Arc<ProcessingPipeline>,
    pub users: UserDirectory,
    pub jwt: JwtService,
}

//! Application initialization

pub mod routes;
pub mod server;

use crate::auth::jwt::JwtService;
use crate::auth::users::UserDirectory;
use crate::events::TenantEventBus;
use crate::pipeline::{ProcessingPipeline, SimulatedVerdictSource};
use crate::registry::UploadRegistry;
use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use reelgate_core::Config;
use reelgate_storage::LocalStorage;
use std::sync::Arc;

// Development and test servers skip the production bcrypt work factor.
const DEV_BCRYPT_COST: u32 = 4;

/// Build all components and the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let storage = LocalStorage::new(config.local_storage_path()).await?;
    tracing::info!(path = %config.local_storage_path(), "Local storage initialized");

    let registry = Arc::new(UploadRegistry::new());
    let events = Arc::new(TenantEventBus::new(config.event_bus_capacity()));
    let pipeline = Arc::new(ProcessingPipeline::new(
        Arc::clone(&registry),
        Arc::clone(&events),
        Arc::new(SimulatedVerdictSource::new(config.verdict_latency_ms())),
        config.verdict_timeout_secs(),
    ));

    let bcrypt_cost = if config.is_production() {
        bcrypt::DEFAULT_COST
    } else {
        DEV_BCRYPT_COST
    };
    let users = UserDirectory::seeded(bcrypt_cost)?;
    let jwt = JwtService::new(config.jwt_secret(), config.jwt_expiry_hours());

    let state = Arc::new(AppState {
        config: config.clone(),
        registry,
        events,
        storage: Arc::new(storage),
        pipeline,
        users,
        jwt,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

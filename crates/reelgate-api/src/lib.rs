//! Reelgate API server
//!
//! Multi-tenant video intake and playback: authenticated clients upload
//! videos, an asynchronous safety pass decides their fate, and clients stream
//! the bytes back with HTTP range support while lifecycle events fan out to
//! the owning tenant's subscribers.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod events;
pub mod handlers;
pub mod pipeline;
pub mod registry;
pub mod setup;
pub mod state;
pub mod telemetry;

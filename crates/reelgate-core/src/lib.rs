//! Core domain types for the Reelgate video intake service.
//!
//! This crate holds the pieces shared by every other crate: the error
//! taxonomy, environment-driven configuration, the upload record model and
//! its lifecycle types, and byte-range math for partial playback. It has no
//! HTTP or I/O dependencies.

pub mod config;
pub mod error;
pub mod models;
pub mod range;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{LifecycleEvent, UploadAck, UploadRecord, UploadResponse, UploadState, Verdict};
pub use range::StreamRange;

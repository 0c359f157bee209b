//! API constants

/// API version prefix for all routes
pub const API_PREFIX: &str = "/api/v0";

/// Slack added on top of the configured video size cap so multipart framing
/// never trips the transport-level body limit before the intake check runs.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

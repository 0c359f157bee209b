//! Configuration module
//!
//! Environment-driven configuration for the API server, storage backend,
//! authentication, and the processing pipeline.

use std::env;

const DEFAULT_SERVER_PORT: u16 = 5000;
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
const DEFAULT_MAX_VIDEO_SIZE_BYTES: usize = 100 * 1024 * 1024;
const DEFAULT_VERDICT_LATENCY_MS: u64 = 4000;
const DEFAULT_VERDICT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_EVENT_BUS_CAPACITY: usize = 64;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    environment: String,
    cors_origins: Vec<String>,
    jwt_secret: String,
    jwt_expiry_hours: i64,
    local_storage_path: String,
    max_video_size_bytes: usize,
    video_content_type_prefix: String,
    verdict_latency_ms: u64,
    verdict_timeout_secs: u64,
    event_bus_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `JWT_SECRET` is the only required variable; everything else has a
    /// development-friendly default.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;
        if jwt_secret.len() < 16 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 16 characters long"
            ));
        }

        Ok(Self {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            jwt_secret,
            jwt_expiry_hours: env_parse("JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./uploads".to_string()),
            max_video_size_bytes: env_parse("MAX_VIDEO_SIZE_BYTES", DEFAULT_MAX_VIDEO_SIZE_BYTES),
            video_content_type_prefix: env::var("VIDEO_CONTENT_TYPE_PREFIX")
                .unwrap_or_else(|_| "video/".to_string()),
            verdict_latency_ms: env_parse("VERDICT_LATENCY_MS", DEFAULT_VERDICT_LATENCY_MS),
            verdict_timeout_secs: env_parse("VERDICT_TIMEOUT_SECS", DEFAULT_VERDICT_TIMEOUT_SECS),
            event_bus_capacity: env_parse("EVENT_BUS_CAPACITY", DEFAULT_EVENT_BUS_CAPACITY),
        })
    }

    /// Build a configuration without touching the environment (tests, tools).
    pub fn for_testing(jwt_secret: impl Into<String>, storage_path: impl Into<String>) -> Self {
        Self {
            server_port: 0,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            jwt_secret: jwt_secret.into(),
            jwt_expiry_hours: 1,
            local_storage_path: storage_path.into(),
            max_video_size_bytes: DEFAULT_MAX_VIDEO_SIZE_BYTES,
            video_content_type_prefix: "video/".to_string(),
            verdict_latency_ms: 10,
            verdict_timeout_secs: 5,
            event_bus_capacity: DEFAULT_EVENT_BUS_CAPACITY,
        }
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.jwt_expiry_hours
    }

    pub fn local_storage_path(&self) -> &str {
        &self.local_storage_path
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.max_video_size_bytes
    }

    /// Content-type prefix accepted at intake (`video/` by default).
    pub fn video_content_type_prefix(&self) -> &str {
        &self.video_content_type_prefix
    }

    /// Simulated latency of the stand-in verdict source.
    pub fn verdict_latency_ms(&self) -> u64 {
        self.verdict_latency_ms
    }

    /// Upper bound on a single verdict evaluation before the pipeline
    /// degrades the record to a rejected terminal state.
    pub fn verdict_timeout_secs(&self) -> u64 {
        self.verdict_timeout_secs
    }

    pub fn event_bus_capacity(&self) -> usize {
        self.event_bus_capacity
    }

    pub fn set_max_video_size_bytes(&mut self, bytes: usize) {
        self.max_video_size_bytes = bytes;
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of an upload record.
///
/// `Processing` is the only non-terminal state; a record transitions exactly
/// once, to `Accepted` or `Rejected`, and never leaves a terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    Processing,
    Accepted,
    Rejected,
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadState::Processing)
    }
}

impl Display for UploadState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadState::Processing => write!(f, "processing"),
            UploadState::Accepted => write!(f, "accepted"),
            UploadState::Rejected => write!(f, "rejected"),
        }
    }
}

/// Outcome of the safety evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Unknown,
    Accepted,
    Rejected,
}

impl Verdict {
    /// The terminal lifecycle state implied by this verdict.
    ///
    /// Only meaningful for decided verdicts; `Unknown` never reaches the
    /// registry's completion path.
    pub fn terminal_state(&self) -> UploadState {
        match self {
            Verdict::Accepted => UploadState::Accepted,
            Verdict::Unknown | Verdict::Rejected => UploadState::Rejected,
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Verdict::Unknown => write!(f, "unknown"),
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::Rejected => write!(f, "rejected"),
        }
    }
}

/// A registered upload and its processing status.
///
/// Records live in the in-memory registry for the process lifetime; they are
/// never deleted. The `id` doubles as the storage key component, so it must
/// stay a filesystem-safe opaque token (UUID).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: Uuid,
    pub filename: String,
    pub storage_key: String,
    pub content_type: String,
    pub file_size: u64,
    pub tenant_id: String,
    pub uploaded_by: Uuid,
    pub state: UploadState,
    pub verdict: Verdict,
    pub verdict_reason: Option<String>,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
}

impl UploadRecord {
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

/// Client-facing view of an upload record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub file_size: u64,
    pub state: UploadState,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict_reason: Option<String>,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
}

impl From<UploadRecord> for UploadResponse {
    fn from(record: UploadRecord) -> Self {
        UploadResponse {
            id: record.id,
            filename: record.filename,
            content_type: record.content_type,
            file_size: record.file_size,
            state: record.state,
            verdict: record.verdict,
            verdict_reason: record.verdict_reason,
            progress: record.progress,
            created_at: record.created_at,
        }
    }
}

/// Immediate acknowledgment returned by the upload endpoint, before the
/// verdict is known.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadAck {
    pub id: Uuid,
    pub message: String,
}

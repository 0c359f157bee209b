use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::upload::Verdict;

/// A state-transition notification delivered over the tenant event bus.
///
/// For a given upload, `Started` is always published before `Completed`, and
/// the registry's terminal update is applied before `Completed` goes out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LifecycleEvent {
    Started {
        upload_id: Uuid,
    },
    Completed {
        upload_id: Uuid,
        verdict: Verdict,
        reason: String,
    },
}

impl LifecycleEvent {
    pub fn upload_id(&self) -> Uuid {
        match self {
            LifecycleEvent::Started { upload_id } => *upload_id,
            LifecycleEvent::Completed { upload_id, .. } => *upload_id,
        }
    }
}

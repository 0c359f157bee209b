//! In-memory upload registry
//!
//! The catalog of every upload accepted by this process. Records are created
//! in `processing`, mutated exactly once by the pipeline's completion step,
//! and never deleted. Nothing here is durable; a restart starts empty.

use reelgate_core::{AppError, UploadRecord, Verdict};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

struct RegistryInner {
    // Insertion order drives listing; the index gives O(1) lookup by id.
    records: Vec<UploadRecord>,
    index: HashMap<Uuid, usize>,
}

/// Tenant-scoped catalog of upload records.
pub struct UploadRegistry {
    inner: RwLock<RegistryInner>,
}

impl Default for UploadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                records: Vec::new(),
                index: HashMap::new(),
            }),
        }
    }

    /// Store a freshly built record.
    ///
    /// Ids are caller-generated UUIDs; a collision means the caller reused an
    /// id and is rejected rather than silently overwriting.
    pub async fn register(&self, record: UploadRecord) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if inner.index.contains_key(&record.id) {
            return Err(AppError::Internal(format!(
                "Upload id {} already registered",
                record.id
            )));
        }
        let position = inner.records.len();
        inner.index.insert(record.id, position);
        inner.records.push(record);
        Ok(())
    }

    /// Tenant-scoped lookup.
    ///
    /// A record owned by another tenant is reported exactly like a missing
    /// one, so existence never leaks across the tenant boundary.
    pub async fn get(&self, tenant_id: &str, id: Uuid) -> Option<UploadRecord> {
        let inner = self.inner.read().await;
        inner
            .index
            .get(&id)
            .map(|&position| &inner.records[position])
            .filter(|record| record.tenant_id == tenant_id)
            .cloned()
    }

    /// Snapshot of a tenant's records in insertion order.
    pub async fn list(&self, tenant_id: &str) -> Vec<UploadRecord> {
        let inner = self.inner.read().await;
        inner
            .records
            .iter()
            .filter(|record| record.tenant_id == tenant_id)
            .cloned()
            .collect()
    }

    /// Raise a record's progress. Regressions are ignored so observed
    /// progress is monotonically non-decreasing.
    pub async fn advance_progress(&self, id: Uuid, progress: u8) {
        let mut inner = self.inner.write().await;
        if let Some(&position) = inner.index.get(&id) {
            let record = &mut inner.records[position];
            if !record.state.is_terminal() && progress > record.progress {
                record.progress = progress.min(100);
            }
        }
    }

    /// Apply the pipeline's terminal transition as one atomic replacement.
    ///
    /// Readers holding snapshots are unaffected; new readers see either the
    /// old record or the fully terminal one, never a half-applied mix. A
    /// second completion attempt for the same id is an error.
    pub async fn complete(
        &self,
        id: Uuid,
        verdict: Verdict,
        reason: String,
    ) -> Result<UploadRecord, AppError> {
        let mut inner = self.inner.write().await;
        let position = *inner
            .index
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Upload {} not registered", id)))?;

        let record = &mut inner.records[position];
        if record.state.is_terminal() {
            return Err(AppError::Internal(format!(
                "Upload {} already reached terminal state {}",
                id, record.state
            )));
        }

        let mut updated = record.clone();
        updated.state = verdict.terminal_state();
        updated.verdict = verdict;
        updated.verdict_reason = Some(reason);
        updated.progress = 100;
        *record = updated.clone();

        Ok(updated)
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }
}

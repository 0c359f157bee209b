//! Asynchronous processing pipeline
//!
//! Drives each upload from `processing` to a terminal state. `start` returns
//! before the verdict is known; the outcome reaches clients only through the
//! registry mutation and the tenant event bus, in that order.

use crate::events::TenantEventBus;
use crate::registry::UploadRegistry;
use async_trait::async_trait;
use rand::Rng;
use reelgate_core::{AppError, LifecycleEvent, UploadRecord, Verdict};
use std::sync::Arc;
use std::time::Duration;

const REASON_ACCEPTED: &str = "No violations detected";
const REASON_FLAGGED: &str = "Content flagged by automated safety check";
const REASON_EVALUATION_FAILED: &str = "Safety evaluation failed";

/// External safety decision source.
///
/// The pipeline only requires a verdict and a reason; whether that comes from
/// a real classifier or the simulated stand-in is invisible to it.
#[async_trait]
pub trait VerdictSource: Send + Sync {
    async fn evaluate(&self, record: &UploadRecord) -> Result<(Verdict, String), AppError>;
}

/// Stand-in verdict source: fixed latency, randomized outcome.
pub struct SimulatedVerdictSource {
    latency: Duration,
    accept_probability: f64,
}

impl SimulatedVerdictSource {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
            accept_probability: 0.7,
        }
    }
}

#[async_trait]
impl VerdictSource for SimulatedVerdictSource {
    async fn evaluate(&self, _record: &UploadRecord) -> Result<(Verdict, String), AppError> {
        tokio::time::sleep(self.latency).await;
        if rand::rng().random_bool(self.accept_probability) {
            Ok((Verdict::Accepted, REASON_ACCEPTED.to_string()))
        } else {
            Ok((Verdict::Rejected, REASON_FLAGGED.to_string()))
        }
    }
}

/// Per-upload processing driver.
pub struct ProcessingPipeline {
    registry: Arc<UploadRegistry>,
    events: Arc<TenantEventBus>,
    source: Arc<dyn VerdictSource>,
    timeout: Duration,
}

impl ProcessingPipeline {
    pub fn new(
        registry: Arc<UploadRegistry>,
        events: Arc<TenantEventBus>,
        source: Arc<dyn VerdictSource>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            registry,
            events,
            source,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Kick off processing for a freshly registered record.
    ///
    /// Publishes `started` before spawning so a subscriber connected at
    /// upload time always sees it, then detaches; the caller's response path
    /// never waits on the verdict.
    pub async fn start(self: &Arc<Self>, record: UploadRecord) {
        self.events
            .publish(
                &record.tenant_id,
                LifecycleEvent::Started {
                    upload_id: record.id,
                },
            )
            .await;

        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            pipeline.process(record).await;
        });
    }

    async fn process(&self, record: UploadRecord) {
        let upload_id = record.id;
        let tenant_id = record.tenant_id.clone();

        self.registry.advance_progress(upload_id, 50).await;

        // An indeterminate verdict must still terminate the record; timeouts
        // and evaluator errors degrade to rejection with a reason that is
        // distinguishable from flagged content.
        let (verdict, reason) =
            match tokio::time::timeout(self.timeout, self.source.evaluate(&record)).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(err)) => {
                    tracing::warn!(
                        upload_id = %upload_id,
                        error = %err,
                        "Verdict source failed"
                    );
                    (Verdict::Rejected, REASON_EVALUATION_FAILED.to_string())
                }
                Err(_) => {
                    tracing::warn!(upload_id = %upload_id, "Verdict evaluation timed out");
                    (Verdict::Rejected, REASON_EVALUATION_FAILED.to_string())
                }
            };

        // Update-then-publish: a listener reacting to `completed` by
        // re-listing must observe the terminal record.
        match self
            .registry
            .complete(upload_id, verdict, reason.clone())
            .await
        {
            Ok(updated) => {
                tracing::info!(
                    upload_id = %upload_id,
                    tenant_id = %tenant_id,
                    verdict = %updated.verdict,
                    "Upload processing complete"
                );
                self.events
                    .publish(
                        &tenant_id,
                        LifecycleEvent::Completed {
                            upload_id,
                            verdict: updated.verdict,
                            reason,
                        },
                    )
                    .await;
            }
            Err(err) => {
                tracing::error!(
                    upload_id = %upload_id,
                    error = %err,
                    "Failed to apply terminal state"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reelgate_core::{UploadState, Verdict};
    use uuid::Uuid;

    struct FixedVerdict(Verdict, &'static str);

    #[async_trait]
    impl VerdictSource for FixedVerdict {
        async fn evaluate(&self, _record: &UploadRecord) -> Result<(Verdict, String), AppError> {
            Ok((self.0, self.1.to_string()))
        }
    }

    struct FailingVerdict;

    #[async_trait]
    impl VerdictSource for FailingVerdict {
        async fn evaluate(&self, _record: &UploadRecord) -> Result<(Verdict, String), AppError> {
            Err(AppError::Internal("classifier unavailable".to_string()))
        }
    }

    struct HangingVerdict;

    #[async_trait]
    impl VerdictSource for HangingVerdict {
        async fn evaluate(&self, _record: &UploadRecord) -> Result<(Verdict, String), AppError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    fn record(tenant: &str) -> UploadRecord {
        UploadRecord {
            id: Uuid::new_v4(),
            filename: "clip.mp4".to_string(),
            storage_key: format!("media/{}/clip.mp4", tenant),
            content_type: "video/mp4".to_string(),
            file_size: 1000,
            tenant_id: tenant.to_string(),
            uploaded_by: Uuid::new_v4(),
            state: UploadState::Processing,
            verdict: Verdict::Unknown,
            verdict_reason: None,
            progress: 0,
            created_at: Utc::now(),
        }
    }

    fn pipeline(source: Arc<dyn VerdictSource>) -> (Arc<ProcessingPipeline>, Arc<UploadRegistry>, Arc<TenantEventBus>) {
        let registry = Arc::new(UploadRegistry::new());
        let events = Arc::new(TenantEventBus::new(8));
        let pipeline = Arc::new(ProcessingPipeline::new(
            Arc::clone(&registry),
            Arc::clone(&events),
            source,
            1,
        ));
        (pipeline, registry, events)
    }

    #[tokio::test]
    async fn test_started_precedes_completed_and_terminal_state() {
        let (pipeline, registry, events) =
            pipeline(Arc::new(FixedVerdict(Verdict::Accepted, "ok")));
        let r = record("tenant1");
        let id = r.id;
        registry.register(r.clone()).await.unwrap();

        let mut rx = events.subscribe("tenant1").await;
        pipeline.start(r).await;

        let first = rx.recv().await.unwrap();
        assert_eq!(first, LifecycleEvent::Started { upload_id: id });

        let second = rx.recv().await.unwrap();
        match second {
            LifecycleEvent::Completed {
                upload_id,
                verdict,
                reason,
            } => {
                assert_eq!(upload_id, id);
                assert_eq!(verdict, Verdict::Accepted);
                assert_eq!(reason, "ok");
            }
            other => panic!("expected completed, got {:?}", other),
        }

        // Completed was published after the registry update, so the record
        // must already be terminal.
        let fetched = registry.get("tenant1", id).await.unwrap();
        assert_eq!(fetched.state, UploadState::Accepted);
        assert_eq!(fetched.progress, 100);
    }

    #[tokio::test]
    async fn test_evaluator_error_degrades_to_rejected() {
        let (pipeline, registry, events) = pipeline(Arc::new(FailingVerdict));
        let r = record("tenant1");
        let id = r.id;
        registry.register(r.clone()).await.unwrap();

        let mut rx = events.subscribe("tenant1").await;
        pipeline.start(r).await;

        rx.recv().await.unwrap(); // started
        let completed = rx.recv().await.unwrap();
        match completed {
            LifecycleEvent::Completed {
                verdict, reason, ..
            } => {
                assert_eq!(verdict, Verdict::Rejected);
                assert_eq!(reason, REASON_EVALUATION_FAILED);
                assert_ne!(reason, REASON_FLAGGED);
            }
            other => panic!("expected completed, got {:?}", other),
        }
        assert_eq!(
            registry.get("tenant1", id).await.unwrap().state,
            UploadState::Rejected
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_rejected() {
        let (pipeline, registry, events) = pipeline(Arc::new(HangingVerdict));
        let r = record("tenant1");
        let id = r.id;
        registry.register(r.clone()).await.unwrap();

        let mut rx = events.subscribe("tenant1").await;
        pipeline.start(r).await;

        rx.recv().await.unwrap(); // started
        let completed = rx.recv().await.unwrap();
        match completed {
            LifecycleEvent::Completed {
                verdict, reason, ..
            } => {
                assert_eq!(verdict, Verdict::Rejected);
                assert_eq!(reason, REASON_EVALUATION_FAILED);
            }
            other => panic!("expected completed, got {:?}", other),
        }
        let fetched = registry.get("tenant1", id).await.unwrap();
        assert!(fetched.state.is_terminal());
        assert_eq!(fetched.progress, 100);
    }

    #[tokio::test]
    async fn test_events_stay_in_tenant_partition() {
        let (pipeline, registry, events) =
            pipeline(Arc::new(FixedVerdict(Verdict::Accepted, "ok")));
        let r = record("tenant1");
        registry.register(r.clone()).await.unwrap();

        let mut other = events.subscribe("tenant2").await;
        let mut own = events.subscribe("tenant1").await;
        pipeline.start(r).await;

        own.recv().await.unwrap();
        own.recv().await.unwrap();
        assert!(matches!(
            other.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
    }
}

//! Tenant-partitioned event fan-out
//!
//! One broadcast channel per tenant, created lazily on first use. Delivery is
//! best-effort and at-most-once per subscriber; there is no replay, so a
//! subscriber that joins after an event was published never sees it.

use reelgate_core::LifecycleEvent;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tokio::sync::Mutex;

/// Publish/subscribe bus keyed by tenant id.
pub struct TenantEventBus {
    capacity: usize,
    channels: Mutex<HashMap<String, broadcast::Sender<LifecycleEvent>>>,
}

impl TenantEventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: Mutex::new(HashMap::new()),
        }
    }

    async fn sender(&self, tenant_id: &str) -> broadcast::Sender<LifecycleEvent> {
        let mut channels = self.channels.lock().await;
        channels
            .entry(tenant_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Join a tenant's partition. The receiver only sees events published
    /// after this call; dropping it is the unsubscribe.
    pub async fn subscribe(&self, tenant_id: &str) -> broadcast::Receiver<LifecycleEvent> {
        self.sender(tenant_id).await.subscribe()
    }

    /// Deliver an event to every current subscriber of one tenant.
    ///
    /// Returns the number of subscribers reached; zero subscribers is normal,
    /// not an error.
    pub async fn publish(&self, tenant_id: &str, event: LifecycleEvent) -> usize {
        let sender = self.sender(tenant_id).await;
        let delivered = sender.send(event).unwrap_or(0);
        tracing::debug!(
            tenant_id = %tenant_id,
            delivered,
            "Published lifecycle event"
        );
        delivered
    }
}

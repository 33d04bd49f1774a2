use std::sync::Arc;

use crate::constants::QUEUE_LOCK_COUNTERS_KEY;
use crate::error::Result;
use crate::job::Job;
use crate::queue::QueueRuntime;
use crate::settings::LocketSettings;
use crate::store::SharedStore;

/// Starvation-avoidance filter over queue selection. Once the number of
/// consecutive lock rejections for a queue reaches the number of jobs still
/// visible in it, every job there has already been rejected this cycle and
/// polling the queue is wasted work until something changes.
#[derive(Clone)]
pub struct QueueGate {
    store: Arc<dyn SharedStore>,
    runtime: Arc<dyn QueueRuntime>,
    settings: LocketSettings,
}

impl QueueGate {
    pub fn new(
        store: Arc<dyn SharedStore>,
        runtime: Arc<dyn QueueRuntime>,
        settings: LocketSettings,
    ) -> Self {
        Self {
            store,
            runtime,
            settings,
        }
    }

    /// Blocked iff the contention counter has caught up with the queue's
    /// current length. An absent or zero counter never blocks.
    pub async fn is_blocked(&self, queue_name: &str) -> Result<bool> {
        let contended = self.counter(queue_name).await?;
        if contended == 0 {
            return Ok(false);
        }
        let queue_length = self.runtime.queue_length(queue_name).await?;
        Ok(contended >= queue_length)
    }

    async fn counter(&self, queue_name: &str) -> Result<i64> {
        let raw = self
            .store
            .get_hash_field(QUEUE_LOCK_COUNTERS_KEY, queue_name)
            .await?;
        Ok(raw
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or(0))
    }

    /// Called exactly once per contention-induced re-enqueue.
    pub async fn record_contention(&self, job: &Job) -> Result<i64> {
        let contended = self
            .store
            .increment_hash_field(QUEUE_LOCK_COUNTERS_KEY, &job.queue_name, 1)
            .await?;
        tracing::debug!(queue = %job.queue_name, contended, "recorded job lock contention");
        Ok(contended)
    }

    /// Drops every counter. Any successful non-contended retention, or a
    /// reservation pass that found nothing at all, makes the prior counts
    /// stale.
    pub async fn clear_all(&self) -> Result<()> {
        self.store.delete(QUEUE_LOCK_COUNTERS_KEY).await
    }

    /// A removed queue takes its counter field with it.
    pub async fn forget_queue(&self, queue_name: &str) -> Result<()> {
        self.store
            .delete_hash_field(QUEUE_LOCK_COUNTERS_KEY, queue_name)
            .await
    }

    /// The candidate queues minus the currently blocked ones; the input
    /// unchanged when the feature is disabled.
    pub async fn filter(&self, all_queues: &[String]) -> Result<Vec<String>> {
        if !self.settings.enabled {
            return Ok(all_queues.to_vec());
        }
        let blocked = self.blocked_queues().await?;
        Ok(all_queues
            .iter()
            .filter(|queue| !blocked.contains(*queue))
            .cloned()
            .collect())
    }

    async fn blocked_queues(&self) -> Result<Vec<String>> {
        let mut blocked = Vec::new();
        for queue_name in self.store.list_hash_fields(QUEUE_LOCK_COUNTERS_KEY).await? {
            if self.is_blocked(&queue_name).await? {
                blocked.push(queue_name);
            }
        }
        Ok(blocked)
    }
}

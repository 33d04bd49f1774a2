use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{LocketError, Result};
use crate::job::Job;
use crate::queue::QueueRuntime;
use crate::store::{MemoryStore, SharedStore};

/// In-memory queue runtime recording every enqueue and removal.
#[derive(Default)]
pub struct StubQueueRuntime {
    queues: Mutex<HashMap<String, Vec<Job>>>,
    candidate_order: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
}

impl StubQueueRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, job: Job) {
        let mut queues = self.queues.lock().await;
        queues.entry(job.queue_name.clone()).or_default().push(job);
    }

    pub async fn pop(&self, queue_name: &str) -> Option<Job> {
        let mut queues = self.queues.lock().await;
        let jobs = queues.get_mut(queue_name)?;
        if jobs.is_empty() {
            None
        } else {
            Some(jobs.remove(0))
        }
    }

    pub async fn set_candidates(&self, names: &[&str]) {
        let mut order = self.candidate_order.lock().await;
        *order = names.iter().map(|name| name.to_string()).collect();
    }

    pub async fn removed_queues(&self) -> Vec<String> {
        self.removed.lock().await.clone()
    }
}

#[async_trait]
impl QueueRuntime for StubQueueRuntime {
    async fn queue_length(&self, queue_name: &str) -> Result<i64> {
        let queues = self.queues.lock().await;
        Ok(queues.get(queue_name).map_or(0, |jobs| jobs.len() as i64))
    }

    async fn enqueue(&self, job: &Job) -> Result<()> {
        self.push(job.clone()).await;
        Ok(())
    }

    async fn remove_queue(&self, queue_name: &str) -> Result<()> {
        self.queues.lock().await.remove(queue_name);
        self.removed.lock().await.push(queue_name.to_string());
        Ok(())
    }

    async fn list_candidate_queues(&self) -> Result<Vec<String>> {
        let order = self.candidate_order.lock().await;
        if !order.is_empty() {
            return Ok(order.clone());
        }
        let mut names: Vec<String> = self.queues.lock().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

fn store_unreachable() -> LocketError {
    LocketError::Store(redis::RedisError::from((
        redis::ErrorKind::IoError,
        "store unreachable",
    )))
}

/// Memory store with a switchable outage: while down, every call fails the
/// way an unreachable Redis would.
#[derive(Default)]
pub struct OutageStore {
    inner: MemoryStore,
    down: AtomicBool,
}

impl OutageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(store_unreachable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SharedStore for OutageStore {
    async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: i64,
    ) -> Result<bool> {
        self.check()?;
        self.inner
            .set_if_absent_with_expiry(key, value, ttl_seconds)
            .await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: i64) -> Result<()> {
        self.check()?;
        self.inner.set_with_expiry(key, value, ttl_seconds).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn increment_hash_field(&self, map_key: &str, field: &str, delta: i64) -> Result<i64> {
        self.check()?;
        self.inner.increment_hash_field(map_key, field, delta).await
    }

    async fn get_hash_field(&self, map_key: &str, field: &str) -> Result<Option<String>> {
        self.check()?;
        self.inner.get_hash_field(map_key, field).await
    }

    async fn delete_hash_field(&self, map_key: &str, field: &str) -> Result<()> {
        self.check()?;
        self.inner.delete_hash_field(map_key, field).await
    }

    async fn list_hash_fields(&self, map_key: &str) -> Result<Vec<String>> {
        self.check()?;
        self.inner.list_hash_fields(map_key).await
    }
}

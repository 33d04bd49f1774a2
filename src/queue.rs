use async_trait::async_trait;

use crate::error::Result;
use crate::job::Job;

/// The slice of the embedding queue runtime that lock coordination consumes.
/// Queue storage, scheduling and job execution stay on the runtime's side.
#[async_trait]
pub trait QueueRuntime: Send + Sync {
    /// Number of jobs currently visible in the queue.
    async fn queue_length(&self, queue_name: &str) -> Result<i64>;

    /// Puts an equivalent job back onto its own queue. Used when a dequeued
    /// job loses the lock race.
    async fn enqueue(&self, job: &Job) -> Result<()>;

    /// Drops a queue. Route removals through [`crate::Locket::remove_queue`]
    /// so the queue's contention counter is cleared with it.
    async fn remove_queue(&self, queue_name: &str) -> Result<()>;

    /// Queues a worker may poll, in priority order.
    async fn list_candidate_queues(&self) -> Result<Vec<String>>;
}

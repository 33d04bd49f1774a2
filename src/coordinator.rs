use std::sync::Arc;

use crate::error::Result;
use crate::gate::QueueGate;
use crate::heartbeat::Heartbeat;
use crate::job::Job;
use crate::lock::{LockController, LockKeyDeriver};
use crate::queue::QueueRuntime;
use crate::settings::LocketSettings;
use crate::store::SharedStore;

/// Outcome of the pre-execution hook for one dequeued job.
pub enum PreExecution {
    /// The queue is not under lock tracking; run the job normally.
    Untracked,
    /// The lock was acquired. Run the job, then hand the outcome back to
    /// [`Locket::after_execution`] from the success or the failure path.
    Retained(JobLease),
    /// The lock is held elsewhere. An equivalent job was re-enqueued on the
    /// same queue and this instance must not run. Contention is expected
    /// control flow, not an error.
    Requeued,
}

impl std::fmt::Debug for PreExecution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreExecution::Untracked => f.write_str("Untracked"),
            PreExecution::Retained(_) => f.write_str("Retained(..)"),
            PreExecution::Requeued => f.write_str("Requeued"),
        }
    }
}

/// A held lock plus its running heartbeat. Dropping the lease without
/// completing it aborts the heartbeat and leaves the key to expire on its
/// own, which is the crash-recovery path.
pub struct JobLease {
    job: Job,
    lock: LockController,
    heartbeat: Heartbeat,
}

impl JobLease {
    async fn complete(mut self) -> Result<()> {
        // Stop first: a beat landing between release and stop would revive
        // the key for a job that already finished.
        self.heartbeat.stop().await;
        self.lock.release(&self.job).await
    }
}

/// Composition root: wires the lock controller, heartbeat and queue gate
/// into the worker's job lifecycle and queue selection.
pub struct Locket {
    settings: LocketSettings,
    lock: LockController,
    gate: QueueGate,
    runtime: Arc<dyn QueueRuntime>,
}

impl Locket {
    pub fn new(
        settings: LocketSettings,
        store: Arc<dyn SharedStore>,
        runtime: Arc<dyn QueueRuntime>,
    ) -> Self {
        let lock = LockController::new(store.clone(), settings.clone());
        let gate = QueueGate::new(store, runtime.clone(), settings.clone());
        Self {
            settings,
            lock,
            gate,
            runtime,
        }
    }

    pub fn with_lock_key_deriver(mut self, deriver: LockKeyDeriver) -> Self {
        self.lock = self.lock.with_deriver(deriver);
        self
    }

    pub fn settings(&self) -> &LocketSettings {
        &self.settings
    }

    /// Pre-execution hook: decides whether a dequeued job may run. A store
    /// error during acquisition propagates as-is; the lock state is then
    /// unknown and the attempt must not be treated as retained.
    pub async fn before_execution(&self, job: &Job) -> Result<PreExecution> {
        if !self.settings.locketed_queue(&job.queue_name) {
            return Ok(PreExecution::Untracked);
        }
        if self.lock.acquire(job).await? {
            self.retain(job).await.map(PreExecution::Retained)
        } else {
            self.requeue(job).await?;
            Ok(PreExecution::Requeued)
        }
    }

    /// Post-execution hook. Stops the heartbeat and releases the lock for a
    /// retained job; a no-op for one that never held a lock. Call it from
    /// both the success and the failure path.
    pub async fn after_execution(&self, outcome: PreExecution) -> Result<()> {
        match outcome {
            PreExecution::Retained(lease) => lease.complete().await,
            PreExecution::Untracked | PreExecution::Requeued => Ok(()),
        }
    }

    async fn retain(&self, job: &Job) -> Result<JobLease> {
        if let Err(err) = self.settings.validate_timing() {
            // The freshly created key would never be heartbeated; drop it
            // rather than stranding it until TTL expiry.
            let _ = self.lock.release(job).await;
            return Err(err);
        }
        self.gate.clear_all().await?;
        let heartbeat = Heartbeat::start(
            self.lock.clone(),
            job.clone(),
            self.settings.heartbeat_frequency(),
        );
        tracing::info!(queue = %job.queue_name, function = %job.function_name, "retained job lock");
        Ok(JobLease {
            job: job.clone(),
            lock: self.lock.clone(),
            heartbeat,
        })
    }

    async fn requeue(&self, job: &Job) -> Result<()> {
        self.runtime.enqueue(job).await?;
        self.gate.record_contention(job).await?;
        tracing::debug!(
            queue = %job.queue_name,
            function = %job.function_name,
            "job lock contended, re-enqueued"
        );
        Ok(())
    }

    /// The queues a worker should poll right now: the runtime's candidates
    /// minus the fully blocked ones.
    pub async fn eligible_queues(&self) -> Result<Vec<String>> {
        let candidates = self.runtime.list_candidate_queues().await?;
        self.gate.filter(&candidates).await
    }

    /// Queue-selection filter over an explicit candidate list.
    pub async fn filter_queues(&self, all_queues: &[String]) -> Result<Vec<String>> {
        self.gate.filter(all_queues).await
    }

    /// Reserve-time short-circuit: false when every job still visible in
    /// the queue has already been rejected for contention this cycle.
    pub async fn queue_reservable(&self, queue_name: &str) -> Result<bool> {
        if !self.settings.enabled {
            return Ok(true);
        }
        Ok(!self.gate.is_blocked(queue_name).await?)
    }

    /// Call after a reservation pass across every candidate queue found
    /// nothing. Blocked status must not outlive the queue lengths it was
    /// judged against.
    pub async fn on_empty_reservation(&self) -> Result<()> {
        if !self.settings.enabled {
            return Ok(());
        }
        self.gate.clear_all().await
    }

    /// Removes a queue from the runtime together with its contention
    /// counter.
    pub async fn remove_queue(&self, queue_name: &str) -> Result<()> {
        self.runtime.remove_queue(queue_name).await?;
        self.gate.forget_queue(queue_name).await
    }
}

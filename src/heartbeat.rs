use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};

use crate::job::Job;
use crate::lock::LockController;

/// Keeps a held lock alive for as long as its job actually runs, which may
/// well exceed the lock duration itself.
pub struct Heartbeat {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Spawns the renewal loop: sleep one frequency period, re-check the
    /// stop flag, extend, repeat.
    pub fn start(lock: LockController, job: Job, frequency: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let task_shutdown = shutdown.clone();
        let handle = tokio::spawn(async move {
            loop {
                sleep_with_shutdown(&task_shutdown, frequency).await;
                if task_shutdown.load(Ordering::SeqCst) {
                    break;
                }
                // A transient store outage must not end the renewal duty;
                // the next tick retries. The lease can still lapse if the
                // outage outlasts the lock duration.
                if let Err(err) = lock.extend(&job).await {
                    tracing::warn!(
                        queue = %job.queue_name,
                        "failed to extend job lock, retrying next beat: {err}"
                    );
                }
            }
        });
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Stops the renewal loop and waits it out; once this returns no further
    /// extension call is made. Safe to call more than once and from either
    /// completion path.
    pub async fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Heartbeat {
    // A heartbeat dropped without stop() must not keep renewing a lease for
    // a job that is gone; the key then expires on its own.
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn sleep_with_shutdown(shutdown: &Arc<AtomicBool>, duration: Duration) {
    let mut remaining = duration;
    let step = Duration::from_millis(100);
    while remaining > Duration::ZERO && !shutdown.load(Ordering::SeqCst) {
        let next = if remaining > step { step } else { remaining };
        sleep(next).await;
        remaining = remaining.saturating_sub(next);
    }
}

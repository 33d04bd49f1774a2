use std::sync::Arc;

use crate::error::Result;
use crate::job::Job;
use crate::settings::LocketSettings;
use crate::store::SharedStore;

/// Custom lock-key derivation, for callers whose default payload fingerprint
/// is either too coarse or too fine.
pub type LockKeyDeriver = Arc<dyn Fn(&Job) -> String + Send + Sync>;

/// Owns the acquire/extend/release protocol for one job's exclusivity key.
#[derive(Clone)]
pub struct LockController {
    store: Arc<dyn SharedStore>,
    settings: LocketSettings,
    deriver: Option<LockKeyDeriver>,
}

impl LockController {
    pub fn new(store: Arc<dyn SharedStore>, settings: LocketSettings) -> Self {
        Self {
            store,
            settings,
            deriver: None,
        }
    }

    pub fn with_deriver(mut self, deriver: LockKeyDeriver) -> Self {
        self.deriver = Some(deriver);
        self
    }

    pub fn lock_key(&self, job: &Job) -> String {
        match &self.deriver {
            Some(derive) => derive(job),
            None => job.default_lock_key(),
        }
    }

    /// True iff this call created the key and the caller now holds the lock.
    /// Relies on the store's atomic create-if-absent; a read followed by a
    /// write would race against concurrent acquirers.
    pub async fn acquire(&self, job: &Job) -> Result<bool> {
        let lock_key = self.lock_key(job);
        // The key's existence is the lock; its value carries nothing.
        let acquired = self
            .store
            .set_if_absent_with_expiry(&lock_key, "", self.settings.job_lock_duration_seconds)
            .await?;
        if !acquired {
            tracing::debug!(queue = %job.queue_name, lock_key = %lock_key, "job lock held elsewhere");
        }
        Ok(acquired)
    }

    /// Resets the lease unconditionally. There is no tenant token: if the
    /// lease already expired and another worker re-acquired the key, this
    /// silently steals it back. Known limitation, kept as-is.
    pub async fn extend(&self, job: &Job) -> Result<()> {
        let lock_key = self.lock_key(job);
        self.store
            .set_with_expiry(&lock_key, "", self.settings.job_lock_duration_seconds)
            .await
    }

    /// Deletes the lock key. Ownership-blind, same caveat as [`Self::extend`].
    pub async fn release(&self, job: &Job) -> Result<()> {
        self.store.delete(&self.lock_key(job)).await
    }
}

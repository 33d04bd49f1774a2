use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::constants::{
    DEFAULT_HEARTBEAT_FREQUENCY_SECONDS, DEFAULT_JOB_LOCK_DURATION_SECONDS, DEFAULT_REDIS_DSN,
};
use crate::error::{LocketError, Result};

/// Process-wide lock coordination settings, constructed once and passed by
/// reference into the coordinator at build time. `locketed_queues = None`
/// means every queue participates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct LocketSettings {
    pub enabled: bool,
    pub locketed_queues: Option<HashSet<String>>,
    pub heartbeat_frequency_seconds: f64,
    pub job_lock_duration_seconds: i64,
    pub redis_dsn: String,
}

impl Default for LocketSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            locketed_queues: None,
            heartbeat_frequency_seconds: DEFAULT_HEARTBEAT_FREQUENCY_SECONDS,
            job_lock_duration_seconds: DEFAULT_JOB_LOCK_DURATION_SECONDS,
            redis_dsn: DEFAULT_REDIS_DSN.to_string(),
        }
    }
}

impl LocketSettings {
    /// Rejects a non-positive frequency without touching the current value.
    pub fn set_heartbeat_frequency(&mut self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(LocketError::Config(
                "the heartbeat frequency must be greater than 0 seconds".to_string(),
            ));
        }
        self.heartbeat_frequency_seconds = seconds;
        Ok(())
    }

    /// Rejects a non-positive duration without touching the current value.
    pub fn set_job_lock_duration(&mut self, seconds: i64) -> Result<()> {
        if seconds <= 0 {
            return Err(LocketError::Config(
                "the job lock duration must be an integer greater than 0".to_string(),
            ));
        }
        self.job_lock_duration_seconds = seconds;
        Ok(())
    }

    /// A heartbeat slower than the lease loses the lock mid-job. Checked at
    /// the first retention attempt rather than in the setters, so the two
    /// values may be assigned in any order.
    pub fn validate_timing(&self) -> Result<()> {
        if !self.heartbeat_frequency_seconds.is_finite() || self.heartbeat_frequency_seconds <= 0.0
        {
            return Err(LocketError::Config(
                "the heartbeat frequency must be greater than 0 seconds".to_string(),
            ));
        }
        if self.job_lock_duration_seconds <= 0 {
            return Err(LocketError::Config(
                "the job lock duration must be an integer greater than 0".to_string(),
            ));
        }
        if (self.job_lock_duration_seconds as f64) < self.heartbeat_frequency_seconds {
            return Err(LocketError::Config(
                "a job's heartbeat must be more frequent than its lock expiration".to_string(),
            ));
        }
        Ok(())
    }

    pub fn heartbeat_frequency(&self) -> Duration {
        Duration::try_from_secs_f64(self.heartbeat_frequency_seconds)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_HEARTBEAT_FREQUENCY_SECONDS))
    }

    /// Whether jobs from this queue must be unique across workers.
    pub fn locketed_queue(&self, queue_name: &str) -> bool {
        if !self.enabled {
            return false;
        }
        match &self.locketed_queues {
            None => true,
            Some(queues) => queues.contains(queue_name),
        }
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::JOB_LOCK_KEY_PREFIX;

/// One dequeued unit of work as the lock coordinator sees it: the queue it
/// came from and the payload identifying "the same logical job" across
/// workers. Payload-identical jobs derive the same lock key; how unique the
/// payload is remains the caller's contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub queue_name: String,
    pub function_name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Job {
    pub fn new(
        queue_name: impl Into<String>,
        function_name: impl Into<String>,
        args: Vec<Value>,
    ) -> Self {
        Self {
            queue_name: queue_name.into(),
            function_name: function_name.into(),
            args,
        }
    }

    /// Canonical serialization of class plus arguments. Key order is fixed,
    /// so two jobs with the same payload always serialize identically.
    pub fn payload(&self) -> String {
        serde_json::json!({"class": self.function_name, "args": self.args}).to_string()
    }

    pub fn default_lock_key(&self) -> String {
        format!("{JOB_LOCK_KEY_PREFIX}{}", self.payload())
    }
}

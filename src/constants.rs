pub const JOB_LOCK_KEY_PREFIX: &str = "locket:job_locks:";
pub const QUEUE_LOCK_COUNTERS_KEY: &str = "locket:queue_lock_counters";

pub const DEFAULT_REDIS_DSN: &str = "redis://localhost:6379/0";
pub const DEFAULT_HEARTBEAT_FREQUENCY_SECONDS: f64 = 30.0;
pub const DEFAULT_JOB_LOCK_DURATION_SECONDS: i64 = 35;

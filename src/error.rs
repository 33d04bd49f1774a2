use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocketError {
    /// Invalid configuration. Fatal: surfaced at the setter or at the first
    /// lock-retention attempt, never clamped.
    #[error("invalid locket configuration: {0}")]
    Config(String),

    /// The shared store rejected an operation or could not be reached.
    /// Transient from the coordinator's point of view: the heartbeat retries
    /// on its next tick, acquisition attempts are aborted without retaining.
    #[error("shared store error: {0}")]
    Store(#[from] redis::RedisError),
}

pub type Result<T> = std::result::Result<T, LocketError>;

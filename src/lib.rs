pub mod constants;
pub mod coordinator;
pub mod error;
pub mod gate;
pub mod heartbeat;
pub mod job;
pub mod lock;
pub mod queue;
pub mod settings;
pub mod store;

#[cfg(test)]
mod test_support;

pub use coordinator::{JobLease, Locket, PreExecution};
pub use error::{LocketError, Result};
pub use gate::QueueGate;
pub use heartbeat::Heartbeat;
pub use job::Job;
pub use lock::{LockController, LockKeyDeriver};
pub use queue::QueueRuntime;
pub use settings::LocketSettings;
pub use store::{MemoryStore, RedisStore, SharedStore};

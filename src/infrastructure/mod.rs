pub mod attempt_store;

pub use attempt_store::{AttemptStateStore, FileAttemptStore, MemoryAttemptStore};

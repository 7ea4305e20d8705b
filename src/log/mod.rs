//! Append-only record of completed study sessions

mod record;
mod store;

pub use record::LogRecord;
pub use store::{JsonLogStore, LogStore, MemoryLogStore};

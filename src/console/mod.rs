pub mod command;
pub mod format;
pub mod state;

pub use state::{Completion, Console, EntryKind, LogEntry, PendingRequest, Recall};

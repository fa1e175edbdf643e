//! daybook-ingest: daily-journal import (state snapshot + new tasks).

pub mod import;
pub mod types;

pub use import::{ImportPlan, plan_import, state_snapshot};
pub use types::{Journal, JournalError, NewTaskEntry};

//! Call list cache
//!
//! This module keeps the local copy of every call recording in sync with the
//! server:
//! - `CallRegistry` - snapshot plus sequence-guarded refresh
//! - `RefreshTask` - cancellable polling loop
//! - `patch` - local last-write-wins update of one cached entry

mod cache;
mod poller;
mod snapshot;

pub use cache::{CallRegistry, RefreshOutcome};
pub use poller::RefreshTask;
pub use snapshot::{patch, CallPatch, CallSnapshot};

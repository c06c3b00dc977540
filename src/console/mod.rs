//! Review console
//!
//! `ReviewConsole` is the dashboard the front end drives: it owns the call
//! registry, the detail selector and the transition controller, runs the
//! background refresh, and reports through `ConsoleEvent`s and structured
//! results instead of printing anything itself.

mod dashboard;
mod events;

pub use dashboard::{ReviewConsole, DEFAULT_POLL_INTERVAL};
pub use events::ConsoleEvent;

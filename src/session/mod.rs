//! Reviewer session
//!
//! `SessionContext` holds the API credential and role flag for the lifetime of
//! the process. It is passed explicitly to every component that calls the
//! server and is expired by any 401 response.

mod context;

pub use context::{Credential, SessionContext, SessionState};

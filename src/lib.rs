pub mod api;
pub mod config;
pub mod console;
pub mod registry;
pub mod review;
pub mod session;

pub use api::{
    ApiError, CallId, CallRecording, CallStatus, ExtractedInfo, ExtractedInfoId, HttpReviewApi,
    ReviewAction, ReviewApi,
};
pub use config::Config;
pub use console::{ConsoleEvent, ReviewConsole};
pub use registry::{patch, CallPatch, CallRegistry, CallSnapshot, RefreshTask};
pub use review::{
    DetailSelector, DraftField, ReviewDraft, SelectOutcome, Selection, TransitionController,
    TransitionError, TransitionReport,
};
pub use session::{Credential, SessionContext, SessionState};

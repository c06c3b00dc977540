//! Review server API
//!
//! Endpoints used by the console (all under `/api/`):
//! - GET /call-recordings/ - List calls
//! - GET /call-recordings/:id/ - Get one call
//! - POST /call-recordings/ - Upload audio (multipart `audio_file`)
//! - GET /extracted-info/:call_id/ - Extracted contact info for a call
//! - POST /extracted-info/:id/approve/ and /reject/ - Review transitions
//! - POST /token/, GET /user-status/ - Sign-in

mod client;
mod error;
pub mod models;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpReviewApi, ReviewApi};
pub use error::ApiError;
pub use models::{
    AudioUpload, CallId, CallRecording, CallStatus, ContactFields, ExtractedInfo,
    ExtractedInfoId, RecordId, ReviewAction, ReviewPayload, TransitionResponse, UserStatus,
};

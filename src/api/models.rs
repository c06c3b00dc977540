use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier, kept opaque.
///
/// The review server hands out integer keys today, but nothing in the client
/// depends on that, so string keys are accepted too and echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<u64>() {
            Ok(n) => RecordId::Number(n),
            Err(_) => RecordId::Text(s.to_string()),
        })
    }
}

macro_rules! record_id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub RecordId);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map($name)
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                $name(RecordId::Number(n))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(RecordId::Text(s.to_string()))
            }
        }
    };
}

record_id_newtype!(
    /// Identifier of a call recording
    CallId
);
record_id_newtype!(
    /// Identifier of an extracted-info record (distinct from its call's id)
    ExtractedInfoId
);

/// Processing status of a call recording.
///
/// Only `ReadyForReview`, `Approved` and `Rejected` drive behaviour here; the
/// rest are produced by the upload/extraction pipeline and shown as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CallStatus {
    Uploaded,
    Transcribing,
    Transcribed,
    ExtractingInfo,
    ReadyForReview,
    Approved,
    Rejected,
    TranscriptionFailed,
    ExtractionFailed,
    ReprocessingTranscription,
    /// A status this client does not know about
    Other(String),
}

impl CallStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CallStatus::Uploaded => "UPLOADED",
            CallStatus::Transcribing => "TRANSCRIBING",
            CallStatus::Transcribed => "TRANSCRIBED",
            CallStatus::ExtractingInfo => "EXTRACTING_INFO",
            CallStatus::ReadyForReview => "READY_FOR_REVIEW",
            CallStatus::Approved => "APPROVED",
            CallStatus::Rejected => "REJECTED",
            CallStatus::TranscriptionFailed => "TRANSCRIPTION_FAILED",
            CallStatus::ExtractionFailed => "EXTRACTION_FAILED",
            CallStatus::ReprocessingTranscription => "REPROCESSING_TRANSCRIPTION",
            CallStatus::Other(s) => s,
        }
    }

    /// Approved and rejected records never move again
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallStatus::Approved | CallStatus::Rejected)
    }

    /// The only status an approve/reject transition may start from
    pub fn is_reviewable(&self) -> bool {
        matches!(self, CallStatus::ReadyForReview)
    }
}

impl From<String> for CallStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "UPLOADED" => CallStatus::Uploaded,
            "TRANSCRIBING" => CallStatus::Transcribing,
            "TRANSCRIBED" => CallStatus::Transcribed,
            "EXTRACTING_INFO" => CallStatus::ExtractingInfo,
            "READY_FOR_REVIEW" => CallStatus::ReadyForReview,
            "APPROVED" => CallStatus::Approved,
            "REJECTED" => CallStatus::Rejected,
            "TRANSCRIPTION_FAILED" => CallStatus::TranscriptionFailed,
            "EXTRACTION_FAILED" => CallStatus::ExtractionFailed,
            "REPROCESSING_TRANSCRIPTION" => CallStatus::ReprocessingTranscription,
            _ => CallStatus::Other(s),
        }
    }
}

impl From<CallStatus> for String {
    fn from(status: CallStatus) -> Self {
        match status {
            CallStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded call and its processing state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecording {
    pub id: CallId,

    pub status: CallStatus,

    /// Present once transcription completes
    #[serde(default)]
    pub transcript_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_timestamp: Option<DateTime<Utc>>,

    /// Location of the stored audio on the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
}

/// Reviewer-editable contact fields of an extracted-info record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub service_interest: Option<String>,
    #[serde(default)]
    pub review_notes: Option<String>,
}

/// Contact metadata extracted from a single call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    pub id: ExtractedInfoId,

    #[serde(alias = "call_recording")]
    pub call_id: CallId,

    #[serde(flatten)]
    pub fields: ContactFields,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_approved: Option<bool>,
}

/// Reviewer decision on a call that is ready for review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    /// Path segment of the per-action endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
        }
    }

    /// Status the call lands in when the server does not say otherwise
    pub fn nominal_status(&self) -> CallStatus {
        match self {
            ReviewAction::Approve => CallStatus::Approved,
            ReviewAction::Reject => CallStatus::Rejected,
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an approve/reject request: the whole draft plus review notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPayload {
    pub id: ExtractedInfoId,
    pub call_id: CallId,
    #[serde(flatten)]
    pub fields: ContactFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionResponse {
    #[serde(default)]
    pub status: Option<CallStatus>,
}

/// Audio file to upload as a new call recording
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserStatus {
    #[serde(default)]
    pub is_superuser: bool,
}

/// Error body shape used by the review server
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to the review server.
///
/// Callers only branch on [`ApiError::Unauthorized`] (forces re-authentication)
/// and [`ApiError::NotFound`] (absent extracted info); everything else is
/// "some other failure" carrying whatever detail the server sent.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, expired or rejected credential (HTTP 401)
    #[error("not authenticated")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Server-supplied `detail` message, if the failure carried one
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

use super::selector::DetailSelector;
use crate::api::{ApiError, CallId, CallStatus, ReviewAction, ReviewApi};
use crate::registry::CallRegistry;
use crate::session::SessionContext;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Why an approve/reject did not happen
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("no call is selected")]
    NoSelection,

    #[error("call {call_id} has no extracted information to review yet")]
    NothingToReview { call_id: CallId },

    #[error("call {call_id} is {status} and cannot be reviewed")]
    NotReviewable { call_id: CallId, status: CallStatus },

    #[error("session expired, sign in again")]
    Unauthorized,

    /// The server refused or the request never completed. Selection and
    /// draft are left as they were so the reviewer can retry.
    #[error("{message}")]
    Failed {
        action: ReviewAction,
        message: String,
    },
}

/// Successful transition, for the presentation layer to announce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionReport {
    pub call_id: CallId,
    pub action: ReviewAction,
    pub status: CallStatus,
    pub message: String,
}

/// Runs approve/reject for the active selection
pub struct TransitionController {
    api: Arc<dyn ReviewApi>,
    session: Arc<SessionContext>,
    registry: Arc<CallRegistry>,
    selector: Arc<DetailSelector>,
}

impl TransitionController {
    pub fn new(
        api: Arc<dyn ReviewApi>,
        session: Arc<SessionContext>,
        registry: Arc<CallRegistry>,
        selector: Arc<DetailSelector>,
    ) -> Self {
        Self {
            api,
            session,
            registry,
            selector,
        }
    }

    pub async fn approve(&self, notes: Option<&str>) -> Result<TransitionReport, TransitionError> {
        self.submit(ReviewAction::Approve, notes).await
    }

    pub async fn reject(&self, notes: Option<&str>) -> Result<TransitionReport, TransitionError> {
        self.submit(ReviewAction::Reject, notes).await
    }

    /// Send the draft to the action's endpoint.
    ///
    /// Preconditions are checked locally first and violations never reach the
    /// network. No retry: every attempt is an explicit call.
    pub async fn submit(
        &self,
        action: ReviewAction,
        notes: Option<&str>,
    ) -> Result<TransitionReport, TransitionError> {
        let selection = self
            .selector
            .selection()
            .await
            .ok_or(TransitionError::NoSelection)?;
        let call_id = selection.call.id.clone();

        if !selection.call.status.is_reviewable() {
            warn!(
                "Refusing to {} call {} in status {}",
                action, call_id, selection.call.status
            );
            return Err(TransitionError::NotReviewable {
                call_id,
                status: selection.call.status,
            });
        }

        // The list may have moved on since the detail fetch
        if let Some(listed) = self.registry.get(&call_id).await {
            if listed.status.is_terminal() {
                warn!(
                    "Refusing to {} call {}: list shows {}",
                    action, call_id, listed.status
                );
                return Err(TransitionError::NotReviewable {
                    call_id,
                    status: listed.status,
                });
            }
        }

        let payload = selection
            .draft
            .to_payload(notes)
            .ok_or_else(|| TransitionError::NothingToReview {
                call_id: call_id.clone(),
            })?;

        let credential = self
            .session
            .credential()
            .map_err(|_| TransitionError::Unauthorized)?;

        info!("Submitting {} for call {} (info {})", action, call_id, payload.id);

        let response = self.session.guard(
            self.api
                .submit_review(&credential, action, &payload.id, &payload)
                .await,
        );

        match response {
            Ok(response) => {
                let status = response.status.unwrap_or_else(|| action.nominal_status());

                self.registry.patch_status(&call_id, status.clone()).await;
                self.selector.clear_if(&call_id).await;

                info!("Call {} {}: now {}", call_id, action, status);

                Ok(TransitionReport {
                    message: format!("Action '{}' successful!", action),
                    call_id,
                    action,
                    status,
                })
            }
            Err(ApiError::Unauthorized) => {
                error!("Session rejected while trying to {} call {}", action, call_id);
                Err(TransitionError::Unauthorized)
            }
            Err(e) => {
                error!("Action '{}' failed for call {}: {}", action, call_id, e);
                let message = match e.detail() {
                    Some(detail) => detail.to_string(),
                    None => format!("Could not {} call {}: {}", action, call_id, e),
                };
                Err(TransitionError::Failed { action, message })
            }
        }
    }
}

use super::draft::{DraftField, ReviewDraft};
use crate::api::{ApiError, CallId, CallRecording, ExtractedInfo, ReviewApi};
use crate::session::SessionContext;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// The call shown in the detail pane, its extracted info and the reviewer's edits
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub call: CallRecording,
    /// `None` while extraction has not produced anything yet
    pub info: Option<ExtractedInfo>,
    pub draft: ReviewDraft,
}

/// Result of a selection request that completed without error
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Selected(Selection),
    /// A later selection was issued before this one finished; nothing changed
    Superseded,
}

/// Join-fetches a call and its extracted info into the active selection
pub struct DetailSelector {
    api: Arc<dyn ReviewApi>,
    session: Arc<SessionContext>,
    selection: Mutex<Option<Selection>>,
    latest_seq: AtomicU64,
}

impl DetailSelector {
    pub fn new(api: Arc<dyn ReviewApi>, session: Arc<SessionContext>) -> Self {
        Self {
            api,
            session,
            selection: Mutex::new(None),
            latest_seq: AtomicU64::new(0),
        }
    }

    /// Make `id` the active selection.
    ///
    /// Both fetches must succeed; otherwise nothing is selected afterwards. Only
    /// the most recently issued request may touch the selection, so answers to
    /// an earlier click are dropped whichever order they arrive in.
    pub async fn select(&self, id: &CallId) -> Result<SelectOutcome, ApiError> {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Selecting call {} (#{})", id, seq);

        let result = self.fetch_pair(id).await;

        let mut selection = self.selection.lock().await;
        if self.latest_seq.load(Ordering::SeqCst) != seq {
            debug!("Dropping superseded selection of call {} (#{})", id, seq);
            return Ok(SelectOutcome::Superseded);
        }

        match result {
            Ok((call, info)) => {
                info!(
                    "Selected call {} ({}, extracted info: {})",
                    call.id,
                    call.status,
                    if info.is_some() { "yes" } else { "not yet" }
                );
                let draft = ReviewDraft::seed(call.id.clone(), info.as_ref());
                let selected = Selection { call, info, draft };
                *selection = Some(selected.clone());
                Ok(SelectOutcome::Selected(selected))
            }
            Err(e) => {
                warn!("Failed to load call {}: {}", id, e);
                *selection = None;
                Err(e)
            }
        }
    }

    async fn fetch_pair(
        &self,
        id: &CallId,
    ) -> Result<(CallRecording, Option<ExtractedInfo>), ApiError> {
        let credential = self.session.credential()?;

        let (call, info) = futures::future::join(
            self.api.get_call(&credential, id),
            self.api.get_extracted_info(&credential, id),
        )
        .await;

        let call = self.session.guard(call)?;
        let info = match self.session.guard(info) {
            Ok(info) => Some(info),
            Err(ApiError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        if let Some(info) = &info {
            if info.call_id != call.id {
                return Err(ApiError::Decode(format!(
                    "extracted info {} belongs to call {}, not {}",
                    info.id, info.call_id, call.id
                )));
            }
        }

        Ok((call, info))
    }

    pub async fn selection(&self) -> Option<Selection> {
        self.selection.lock().await.clone()
    }

    pub async fn selected_id(&self) -> Option<CallId> {
        self.selection
            .lock()
            .await
            .as_ref()
            .map(|selection| selection.call.id.clone())
    }

    /// Edit one draft field of the active selection; `false` if nothing is selected
    pub async fn edit(&self, field: DraftField, value: impl Into<String>) -> bool {
        match self.selection.lock().await.as_mut() {
            Some(selection) => {
                selection.draft.set(field, value);
                true
            }
            None => false,
        }
    }

    /// Deselect, discarding the draft and any selection still in flight
    pub async fn clear(&self) {
        let mut selection = self.selection.lock().await;
        self.latest_seq.fetch_add(1, Ordering::SeqCst);
        *selection = None;
    }

    /// Deselect only if `id` is still the active call.
    ///
    /// Returns whether anything was cleared.
    pub async fn clear_if(&self, id: &CallId) -> bool {
        let mut selection = self.selection.lock().await;
        match selection.as_ref() {
            Some(current) if &current.call.id == id => {
                self.latest_seq.fetch_add(1, Ordering::SeqCst);
                *selection = None;
                true
            }
            _ => false,
        }
    }
}

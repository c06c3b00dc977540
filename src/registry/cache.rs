use super::snapshot::{patch, CallPatch, CallSnapshot};
use crate::api::{ApiError, CallId, CallRecording, CallStatus, ReviewApi};
use crate::session::SessionContext;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// What happened to a completed refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response replaced the snapshot; carries the new call count
    Applied(usize),
    /// A newer refresh or a local patch had already been applied, the
    /// response was dropped
    Stale,
}

struct RegistryState {
    snapshot: CallSnapshot,
    /// Sequence number of the latest refresh issued before `snapshot` was
    /// last written, by a refresh or a local patch
    applied_seq: u64,
    loaded: bool,
}

/// Client-side cache of all call recordings
pub struct CallRegistry {
    api: Arc<dyn ReviewApi>,
    session: Arc<SessionContext>,
    state: RwLock<RegistryState>,
    issued_seq: AtomicU64,
}

impl CallRegistry {
    pub fn new(api: Arc<dyn ReviewApi>, session: Arc<SessionContext>) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(RegistryState {
                snapshot: CallSnapshot::default(),
                applied_seq: 0,
                loaded: false,
            }),
            issued_seq: AtomicU64::new(0),
        }
    }

    /// Fetch the call list and replace the snapshot wholesale.
    ///
    /// On failure the previous snapshot stays in place; a 401 also expires the
    /// session.
    pub async fn refresh(&self) -> Result<RefreshOutcome, ApiError> {
        let seq = self.issued_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let calls = match self.fetch().await {
            Ok(calls) => calls,
            Err(e) => {
                warn!("Failed to refresh call recordings: {}", e);
                return Err(e);
            }
        };

        let mut state = self.state.write().await;
        if seq <= state.applied_seq {
            debug!(
                "Discarding refresh #{} (already applied #{})",
                seq, state.applied_seq
            );
            return Ok(RefreshOutcome::Stale);
        }

        state.snapshot = CallSnapshot::from_server(calls);
        state.applied_seq = seq;
        if !state.loaded {
            info!("Loaded {} call recordings", state.snapshot.len());
        }
        state.loaded = true;

        Ok(RefreshOutcome::Applied(state.snapshot.len()))
    }

    async fn fetch(&self) -> Result<Vec<CallRecording>, ApiError> {
        let credential = self.session.credential()?;
        self.session
            .guard(self.api.list_calls(&credential).await)
    }

    pub async fn snapshot(&self) -> CallSnapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn calls(&self) -> Vec<CallRecording> {
        self.state.read().await.snapshot.calls().to_vec()
    }

    pub async fn get(&self, id: &CallId) -> Option<CallRecording> {
        self.state.read().await.snapshot.get(id).cloned()
    }

    /// False until the first refresh succeeds
    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    /// Apply a local patch to one cached entry.
    ///
    /// Refreshes already in flight carry server state from before the patch,
    /// so they are marked stale. Refreshes issued afterwards still win.
    pub async fn patch(&self, id: &CallId, fields: CallPatch) -> bool {
        let mut state = self.state.write().await;
        if state.snapshot.get(id).is_some() {
            state.applied_seq = self.issued_seq.load(Ordering::SeqCst);
        }
        patch(&mut state.snapshot, id, fields)
    }

    /// Reflect a completed transition without waiting for the next poll
    pub async fn patch_status(&self, id: &CallId, status: CallStatus) -> bool {
        let changed = self.patch(id, CallPatch::status(status.clone())).await;
        if changed {
            info!("Call {} is now {}", id, status);
        }
        changed
    }
}

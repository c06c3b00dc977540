use super::events::ConsoleEvent;
use crate::api::{ApiError, AudioUpload, CallId, CallRecording, ReviewApi};
use crate::registry::{CallRegistry, CallSnapshot, RefreshTask};
use crate::review::{
    DetailSelector, DraftField, SelectOutcome, Selection, TransitionController, TransitionError,
    TransitionReport,
};
use crate::session::SessionContext;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Notify};
use tracing::{info, warn};

/// Default polling period of the call list
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// The reviewer's dashboard: call list, detail pane and review actions.
///
/// Wires one instance of each workflow component to a shared API and session.
/// The background refresh runs between [`activate`](Self::activate) and
/// [`deactivate`](Self::deactivate), and stops when the console is dropped.
pub struct ReviewConsole {
    api: Arc<dyn ReviewApi>,
    session: Arc<SessionContext>,
    registry: Arc<CallRegistry>,
    selector: Arc<DetailSelector>,
    transitions: TransitionController,
    trigger: Arc<Notify>,
    poll_interval: Duration,
    refresh_task: Mutex<Option<RefreshTask>>,
}

impl ReviewConsole {
    pub fn new(
        api: Arc<dyn ReviewApi>,
        session: Arc<SessionContext>,
        poll_interval: Duration,
    ) -> Self {
        let registry = Arc::new(CallRegistry::new(Arc::clone(&api), Arc::clone(&session)));
        let selector = Arc::new(DetailSelector::new(Arc::clone(&api), Arc::clone(&session)));
        let transitions = TransitionController::new(
            Arc::clone(&api),
            Arc::clone(&session),
            Arc::clone(&registry),
            Arc::clone(&selector),
        );

        Self {
            api,
            session,
            registry,
            selector,
            transitions,
            trigger: Arc::new(Notify::new()),
            poll_interval,
            refresh_task: Mutex::new(None),
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn registry(&self) -> &Arc<CallRegistry> {
        &self.registry
    }

    /// Start polling the call list. Replaces any task already running.
    pub async fn activate(&self) -> mpsc::UnboundedReceiver<ConsoleEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        let task = RefreshTask::spawn(
            Arc::clone(&self.registry),
            self.poll_interval,
            Arc::clone(&self.trigger),
            tx,
        );

        let previous = self.refresh_task.lock().await.replace(task);
        if let Some(previous) = previous {
            warn!("Console was already active, restarting refresh task");
            previous.stop().await;
        }

        info!("Review console activated");
        rx
    }

    /// Stop polling; no refresh result is applied after this returns
    pub async fn deactivate(&self) {
        let task = self.refresh_task.lock().await.take();
        if let Some(task) = task {
            task.stop().await;
            info!("Review console deactivated");
        }
    }

    pub async fn is_active(&self) -> bool {
        self.refresh_task
            .lock()
            .await
            .as_ref()
            .is_some_and(RefreshTask::is_running)
    }

    /// Ask the refresh task for an immediate refresh
    pub fn request_refresh(&self) {
        self.trigger.notify_one();
    }

    /// One refresh outside the polling loop (e.g. for one-shot commands)
    pub async fn refresh_now(&self) -> Result<usize, ApiError> {
        self.registry.refresh().await?;
        Ok(self.registry.snapshot().await.len())
    }

    pub async fn calls(&self) -> Vec<CallRecording> {
        self.registry.calls().await
    }

    pub async fn snapshot(&self) -> CallSnapshot {
        self.registry.snapshot().await
    }

    pub async fn select(&self, id: &CallId) -> Result<SelectOutcome, ApiError> {
        self.selector.select(id).await
    }

    pub async fn selection(&self) -> Option<Selection> {
        self.selector.selection().await
    }

    pub async fn clear_selection(&self) {
        self.selector.clear().await;
    }

    /// Edit a draft field of the selected call
    pub async fn edit(&self, field: DraftField, value: impl Into<String>) -> bool {
        self.selector.edit(field, value).await
    }

    pub async fn approve(&self, notes: Option<&str>) -> Result<TransitionReport, TransitionError> {
        let report = self.transitions.approve(notes).await?;
        self.request_refresh();
        Ok(report)
    }

    pub async fn reject(&self, notes: Option<&str>) -> Result<TransitionReport, TransitionError> {
        let report = self.transitions.reject(notes).await?;
        self.request_refresh();
        Ok(report)
    }

    /// Upload an audio file as a new call recording.
    ///
    /// The server sets the initial status; the list refreshes right after.
    pub async fn upload(&self, path: &Path) -> Result<CallRecording, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording".to_string());

        let credential = self.session.credential()?;
        let created = self
            .session
            .guard(
                self.api
                    .upload_call(&credential, AudioUpload { file_name, bytes })
                    .await,
            )
            .map_err(|e| {
                warn!("Upload of {} failed: {}", path.display(), e);
                e
            })?;

        info!("Uploaded call {} ({})", created.id, created.status);
        self.request_refresh();
        Ok(created)
    }
}

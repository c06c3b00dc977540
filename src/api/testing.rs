//! In-memory `ReviewApi` for unit tests

use super::error::ApiError;
use super::models::{
    AudioUpload, CallId, CallRecording, CallStatus, ContactFields, ExtractedInfo,
    ExtractedInfoId, ReviewAction, ReviewPayload, TransitionResponse, UserStatus,
};
use super::ReviewApi;
use crate::session::Credential;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) enum Failure {
    Unauthorized,
    Server { status: u16, detail: Option<String> },
}

impl Failure {
    fn to_error(&self) -> ApiError {
        match self {
            Failure::Unauthorized => ApiError::Unauthorized,
            Failure::Server { status, detail } => ApiError::Status {
                status: *status,
                detail: detail.clone(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Submission {
    pub action: ReviewAction,
    pub info_id: ExtractedInfoId,
    pub payload: ReviewPayload,
}

pub(crate) struct FakeApi {
    calls: Mutex<Vec<CallRecording>>,
    infos: Mutex<HashMap<CallId, ExtractedInfo>>,
    detail_delays: Mutex<HashMap<CallId, Duration>>,
    list_script: Mutex<VecDeque<(Duration, Vec<CallRecording>)>>,
    list_failure: Mutex<Option<Failure>>,
    detail_failure: Mutex<Option<Failure>>,
    transition_failure: Mutex<Option<Failure>>,
    omit_transition_status: AtomicBool,
    superuser: AtomicBool,
    submissions: Mutex<Vec<Submission>>,
    uploads: Mutex<Vec<String>>,
    requests: AtomicUsize,
}

impl FakeApi {
    pub const TOKEN: &'static str = "fake-token";

    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            infos: Mutex::new(HashMap::new()),
            detail_delays: Mutex::new(HashMap::new()),
            list_script: Mutex::new(VecDeque::new()),
            list_failure: Mutex::new(None),
            detail_failure: Mutex::new(None),
            transition_failure: Mutex::new(None),
            omit_transition_status: AtomicBool::new(false),
            superuser: AtomicBool::new(false),
            submissions: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn credential() -> Credential {
        Credential::new(Self::TOKEN)
    }

    pub fn add_call(&self, id: u64, status: CallStatus) {
        self.calls.lock().unwrap().push(call(id, status));
    }

    pub fn add_info(&self, info_id: &str, call_id: u64, client_name: &str) {
        self.infos
            .lock()
            .unwrap()
            .insert(CallId::from(call_id), info(info_id, call_id, client_name));
    }

    pub fn delay_detail(&self, call_id: u64, delay: Duration) {
        self.detail_delays
            .lock()
            .unwrap()
            .insert(CallId::from(call_id), delay);
    }

    /// Queue one list response served after `delay`, ahead of the live list
    pub fn script_list(&self, delay: Duration, calls: Vec<CallRecording>) {
        self.list_script.lock().unwrap().push_back((delay, calls));
    }

    pub fn fail_list(&self, failure: Option<Failure>) {
        *self.list_failure.lock().unwrap() = failure;
    }

    pub fn fail_detail(&self, failure: Option<Failure>) {
        *self.detail_failure.lock().unwrap() = failure;
    }

    pub fn fail_transition(&self, failure: Option<Failure>) {
        *self.transition_failure.lock().unwrap() = failure;
    }

    pub fn omit_transition_status(&self, omit: bool) {
        self.omit_transition_status.store(omit, Ordering::SeqCst);
    }

    pub fn set_superuser(&self, superuser: bool) {
        self.superuser.store(superuser, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    /// Number of authenticated requests that reached the fake
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn check(&self, credential: &Credential) -> Result<(), ApiError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if credential.token() == Self::TOKEN {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    fn detail_delay(&self, id: &CallId) -> Option<Duration> {
        self.detail_delays.lock().unwrap().get(id).copied()
    }
}

pub(crate) fn call(id: u64, status: CallStatus) -> CallRecording {
    CallRecording {
        id: CallId::from(id),
        status,
        transcript_text: Some(format!("transcript of call {}", id)),
        upload_timestamp: None,
        audio_file: None,
    }
}

pub(crate) fn info(info_id: &str, call_id: u64, client_name: &str) -> ExtractedInfo {
    ExtractedInfo {
        id: ExtractedInfoId::from(info_id),
        call_id: CallId::from(call_id),
        fields: ContactFields {
            client_name: Some(client_name.to_string()),
            company_name: Some(format!("{} Ltd", client_name)),
            ..ContactFields::default()
        },
        is_approved: None,
    }
}

#[async_trait]
impl ReviewApi for FakeApi {
    async fn obtain_token(&self, _username: &str, password: &str) -> Result<String, ApiError> {
        if password == "hunter2" {
            Ok(Self::TOKEN.to_string())
        } else {
            Err(ApiError::Status {
                status: 400,
                detail: None,
            })
        }
    }

    async fn user_status(&self, credential: &Credential) -> Result<UserStatus, ApiError> {
        self.check(credential)?;
        Ok(UserStatus {
            is_superuser: self.superuser.load(Ordering::SeqCst),
        })
    }

    async fn list_calls(&self, credential: &Credential) -> Result<Vec<CallRecording>, ApiError> {
        self.check(credential)?;

        let scripted = self.list_script.lock().unwrap().pop_front();
        if let Some((delay, calls)) = scripted {
            tokio::time::sleep(delay).await;
            return Ok(calls);
        }

        if let Some(failure) = self.list_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }

        Ok(self.calls.lock().unwrap().clone())
    }

    async fn get_call(
        &self,
        credential: &Credential,
        id: &CallId,
    ) -> Result<CallRecording, ApiError> {
        self.check(credential)?;
        if let Some(delay) = self.detail_delay(id) {
            tokio::time::sleep(delay).await;
        }

        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("call {}", id)))
    }

    async fn get_extracted_info(
        &self,
        credential: &Credential,
        call_id: &CallId,
    ) -> Result<ExtractedInfo, ApiError> {
        self.check(credential)?;
        if let Some(delay) = self.detail_delay(call_id) {
            tokio::time::sleep(delay).await;
        }

        if let Some(failure) = self.detail_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }

        self.infos
            .lock()
            .unwrap()
            .get(call_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("extracted info for call {}", call_id)))
    }

    async fn upload_call(
        &self,
        credential: &Credential,
        upload: AudioUpload,
    ) -> Result<CallRecording, ApiError> {
        self.check(credential)?;
        self.uploads.lock().unwrap().push(upload.file_name);

        let mut calls = self.calls.lock().unwrap();
        let created = call(calls.len() as u64 + 1000, CallStatus::Uploaded);
        calls.insert(0, created.clone());
        Ok(created)
    }

    async fn submit_review(
        &self,
        credential: &Credential,
        action: ReviewAction,
        info_id: &ExtractedInfoId,
        payload: &ReviewPayload,
    ) -> Result<TransitionResponse, ApiError> {
        self.check(credential)?;
        self.submissions.lock().unwrap().push(Submission {
            action,
            info_id: info_id.clone(),
            payload: payload.clone(),
        });

        if let Some(failure) = self.transition_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }

        let status = action.nominal_status();
        self.set_status_for(&payload.call_id, status.clone());

        Ok(TransitionResponse {
            status: if self.omit_transition_status.load(Ordering::SeqCst) {
                None
            } else {
                Some(status)
            },
        })
    }
}

impl FakeApi {
    fn set_status_for(&self, id: &CallId, status: CallStatus) {
        if let Some(call) = self.calls.lock().unwrap().iter_mut().find(|c| &c.id == id) {
            call.status = status;
        }
    }
}

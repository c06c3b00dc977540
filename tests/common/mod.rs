// In-process fake of the review server used by the integration tests.
//
// Mirrors the REST surface the console talks to, including token auth,
// `{"detail": ...}` error bodies and the status gate on approve/reject.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;

pub const TOKEN: &str = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b";
pub const USERNAME: &str = "reviewer";
pub const PASSWORD: &str = "hunter2";

#[derive(Debug, Clone)]
pub struct Submission {
    pub info_id: u64,
    pub action: String,
    pub body: Value,
}

#[derive(Debug, Default)]
struct ServerData {
    token: String,
    calls: Vec<Value>,
    infos: Vec<Value>,
    submissions: Vec<Submission>,
    uploads: Vec<(String, usize)>,
    fail_list: bool,
    list_requests: usize,
}

#[derive(Clone)]
pub struct FakeServer {
    data: Arc<Mutex<ServerData>>,
    pub base_url: String,
}

impl FakeServer {
    pub async fn start() -> Self {
        let data = Arc::new(Mutex::new(ServerData {
            token: TOKEN.to_string(),
            ..ServerData::default()
        }));

        let app = Router::new()
            .route("/api/token/", post(obtain_token))
            .route("/api/user-status/", get(user_status))
            .route("/api/call-recordings/", get(list_calls).post(upload_call))
            .route("/api/call-recordings/:id/", get(get_call))
            .route("/api/extracted-info/:id/", get(get_extracted_info))
            .route("/api/extracted-info/:id/:action/", post(review))
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&data));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            data,
            base_url: format!("http://{}", addr),
        }
    }

    pub fn add_call(&self, id: u64, status: &str) {
        self.data.lock().unwrap().calls.push(json!({
            "id": id,
            "uploaded_by": 1,
            "upload_timestamp": "2025-10-27T14:30:00.000000Z",
            "audio_file": format!("http://testserver/media/call_recordings/{}.wav", id),
            "status": status,
            "transcript_text": format!("Hi, this is call {}.", id),
        }));
    }

    /// Extracted info gets id `900 + call_id`
    pub fn add_info(&self, call_id: u64, client_name: &str) {
        self.data.lock().unwrap().infos.push(json!({
            "id": 900 + call_id,
            "call_recording": call_id,
            "client_name": client_name,
            "company_name": null,
            "contact_number": "555-0100",
            "email": null,
            "service_interest": "Fleet tracking",
            "review_notes": null,
            "is_approved": false,
        }));
    }

    pub fn status_of(&self, id: u64) -> Option<String> {
        self.data
            .lock()
            .unwrap()
            .calls
            .iter()
            .find(|c| c["id"] == id)
            .and_then(|c| c["status"].as_str().map(str::to_string))
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.data.lock().unwrap().submissions.clone()
    }

    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.data.lock().unwrap().uploads.clone()
    }

    pub fn list_requests(&self) -> usize {
        self.data.lock().unwrap().list_requests
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.data.lock().unwrap().fail_list = fail;
    }

    /// Invalidate every token handed out so far
    pub fn rotate_token(&self) {
        self.data.lock().unwrap().token = "rotated".to_string();
    }
}

type Shared = Arc<Mutex<ServerData>>;

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn check_auth(data: &Shared, headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Token {}", data.lock().unwrap().token);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        Some(_) => Err(detail(StatusCode::UNAUTHORIZED, "Invalid token.")),
        None => Err(detail(
            StatusCode::UNAUTHORIZED,
            "Authentication credentials were not provided.",
        )),
    }
}

async fn obtain_token(State(data): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        let token = data.lock().unwrap().token.clone();
        Json(json!({ "token": token })).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "non_field_errors": ["Unable to log in with provided credentials."] })),
        )
            .into_response()
    }
}

async fn user_status(State(data): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = check_auth(&data, &headers) {
        return response;
    }
    Json(json!({ "is_superuser": true })).into_response()
}

async fn list_calls(State(data): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = check_auth(&data, &headers) {
        return response;
    }

    let mut data = data.lock().unwrap();
    data.list_requests += 1;
    if data.fail_list {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    Json(Value::Array(data.calls.clone())).into_response()
}

async fn get_call(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if let Err(response) = check_auth(&data, &headers) {
        return response;
    }

    let data = data.lock().unwrap();
    match data.calls.iter().find(|c| c["id"] == id) {
        Some(call) => Json(call.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Not found."),
    }
}

async fn get_extracted_info(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(call_id): Path<u64>,
) -> Response {
    if let Err(response) = check_auth(&data, &headers) {
        return response;
    }

    let data = data.lock().unwrap();
    match data.infos.iter().find(|i| i["call_recording"] == call_id) {
        Some(info) => Json(info.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Not found."),
    }
}

async fn upload_call(
    State(data): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(response) = check_auth(&data, &headers) {
        return response;
    }

    let mut upload = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("audio_file") {
            let name = field.file_name().unwrap_or("unnamed").to_string();
            let bytes = field.bytes().await.unwrap_or_default();
            upload = Some((name, bytes.len()));
        }
    }

    let Some(upload) = upload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "audio_file": ["No file was submitted."] })),
        )
            .into_response();
    };

    let mut data = data.lock().unwrap();
    let id = data
        .calls
        .iter()
        .filter_map(|c| c["id"].as_u64())
        .max()
        .unwrap_or(0)
        + 1;
    let created = json!({
        "id": id,
        "uploaded_by": 1,
        "upload_timestamp": "2025-10-28T09:00:00.000000Z",
        "audio_file": format!("http://testserver/media/call_recordings/{}", upload.0),
        "status": "UPLOADED",
        "transcript_text": null,
    });
    data.uploads.push(upload);
    data.calls.insert(0, created.clone());

    (StatusCode::CREATED, Json(created)).into_response()
}

async fn review(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path((info_id, action)): Path<(u64, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = check_auth(&data, &headers) {
        return response;
    }

    let new_status = match action.as_str() {
        "approve" => "APPROVED",
        "reject" => "REJECTED",
        _ => return detail(StatusCode::NOT_FOUND, "Not found."),
    };

    let mut data = data.lock().unwrap();
    let Some(call_id) = data
        .infos
        .iter()
        .find(|i| i["id"] == info_id)
        .and_then(|i| i["call_recording"].as_u64())
    else {
        return detail(StatusCode::NOT_FOUND, "Not found.");
    };

    data.submissions.push(Submission {
        info_id,
        action: action.clone(),
        body,
    });

    let Some(call) = data.calls.iter_mut().find(|c| c["id"] == call_id) else {
        return detail(StatusCode::NOT_FOUND, "Not found.");
    };
    if call["status"] != "READY_FOR_REVIEW" {
        return detail(
            StatusCode::BAD_REQUEST,
            "This record has already been reviewed.",
        );
    }
    call["status"] = json!(new_status);

    Json(json!({ "status": new_status, "message": format!("Record {}d.", action) })).into_response()
}

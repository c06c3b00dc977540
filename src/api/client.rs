use super::error::ApiError;
use super::models::{
    AudioUpload, CallId, CallRecording, ErrorBody, ExtractedInfo, ExtractedInfoId, ReviewAction,
    ReviewPayload, TokenRequest, TokenResponse, TransitionResponse, UserStatus,
};
use crate::session::Credential;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Review server operations used by the console.
///
/// Every authenticated call takes the credential explicitly; the session
/// decides whether one exists before anything goes on the wire.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Exchange username/password for an API token
    async fn obtain_token(&self, username: &str, password: &str) -> Result<String, ApiError>;

    async fn user_status(&self, credential: &Credential) -> Result<UserStatus, ApiError>;

    /// All call recordings, in server order
    async fn list_calls(&self, credential: &Credential) -> Result<Vec<CallRecording>, ApiError>;

    async fn get_call(&self, credential: &Credential, id: &CallId)
        -> Result<CallRecording, ApiError>;

    /// Extracted info for a call, looked up by the call's id
    async fn get_extracted_info(
        &self,
        credential: &Credential,
        call_id: &CallId,
    ) -> Result<ExtractedInfo, ApiError>;

    async fn upload_call(
        &self,
        credential: &Credential,
        upload: AudioUpload,
    ) -> Result<CallRecording, ApiError>;

    /// POST the payload to the approve or reject endpoint of an extracted-info record
    async fn submit_review(
        &self,
        credential: &Credential,
        action: ReviewAction,
        info_id: &ExtractedInfoId,
        payload: &ReviewPayload,
    ) -> Result<TransitionResponse, ApiError>;
}

/// [`ReviewApi`] over the review server's REST endpoints
pub struct HttpReviewApi {
    base_url: String,
    client: Client,
}

impl HttpReviewApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().build()?;

        info!("Review API at {}", base_url);

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request.header(AUTHORIZATION, credential.header_value())
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let url = response.url().to_string();
        debug!("{} -> {}", url, status);

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            // Body may be empty or HTML; only a JSON `detail` is worth keeping
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail);

            if status == StatusCode::NOT_FOUND {
                return Err(ApiError::NotFound(detail.unwrap_or(url)));
            }

            return Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl ReviewApi for HttpReviewApi {
    async fn obtain_token(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let request = self
            .client
            .post(self.url("token/"))
            .json(&TokenRequest { username, password });

        let response: TokenResponse = Self::send(request).await?;
        Ok(response.token)
    }

    async fn user_status(&self, credential: &Credential) -> Result<UserStatus, ApiError> {
        let request = self.authorized(self.client.get(self.url("user-status/")), credential);
        Self::send(request).await
    }

    async fn list_calls(&self, credential: &Credential) -> Result<Vec<CallRecording>, ApiError> {
        let request = self.authorized(self.client.get(self.url("call-recordings/")), credential);
        Self::send(request).await
    }

    async fn get_call(
        &self,
        credential: &Credential,
        id: &CallId,
    ) -> Result<CallRecording, ApiError> {
        let url = self.url(&format!("call-recordings/{}/", id));
        Self::send(self.authorized(self.client.get(url), credential)).await
    }

    async fn get_extracted_info(
        &self,
        credential: &Credential,
        call_id: &CallId,
    ) -> Result<ExtractedInfo, ApiError> {
        let url = self.url(&format!("extracted-info/{}/", call_id));
        Self::send(self.authorized(self.client.get(url), credential)).await
    }

    async fn upload_call(
        &self,
        credential: &Credential,
        upload: AudioUpload,
    ) -> Result<CallRecording, ApiError> {
        info!(
            "Uploading {} ({} bytes)",
            upload.file_name,
            upload.bytes.len()
        );

        let part = Part::bytes(upload.bytes).file_name(upload.file_name);
        let form = Form::new().part("audio_file", part);

        let request = self
            .authorized(self.client.post(self.url("call-recordings/")), credential)
            .multipart(form);

        Self::send(request).await
    }

    async fn submit_review(
        &self,
        credential: &Credential,
        action: ReviewAction,
        info_id: &ExtractedInfoId,
        payload: &ReviewPayload,
    ) -> Result<TransitionResponse, ApiError> {
        let url = self.url(&format!("extracted-info/{}/{}/", info_id, action));
        let request = self
            .authorized(self.client.post(url), credential)
            .json(payload);

        Self::send(request).await
    }
}

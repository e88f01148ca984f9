use std::time::Duration;

use racm_core::{Entry, ResultSet};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{json, Map, Value};

use crate::types::{ApiError, SubmitResponse, WireResult, WireStatus};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Service base URL; trailing slashes are trimmed on use.
    pub base_url: String,
    pub api_token: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            api_token: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The remote job service, as far as the client depends on it. The trait is
/// the seam that lets the poller and the handle run against a fake in tests.
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    async fn submit(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        prompt: Option<String>,
    ) -> Result<String, ApiError>;
    async fn status(&self, job_id: &str) -> Result<WireStatus, ApiError>;
    async fn result(&self, job_id: &str) -> Result<ResultSet, ApiError>;
    async fn update_result(
        &self,
        job_id: &str,
        detailed: &[Entry],
        summary: &[Entry],
    ) -> Result<(), ApiError>;
    /// `DELETE /api/jobs/{id}`: cancels a running job or deletes a finished one.
    async fn delete(&self, job_id: &str) -> Result<(), ApiError>;
    async fn health(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpJobApi {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl HttpJobApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.settings.api_token)
    }

    /// Turn any non-2xx response into the matching taxonomy error.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, body))
    }
}

fn classify_status(status: StatusCode, body: String) -> ApiError {
    match status.as_u16() {
        401 => ApiError::Auth,
        413 => ApiError::PayloadTooLarge,
        400 => ApiError::BadRequest(body),
        code => ApiError::Server { status: code, body },
    }
}

fn map_transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

fn labeled_record(entry: &Entry) -> Value {
    let mut record = Map::new();
    for (label, value) in entry.to_labeled() {
        record.insert(label, Value::String(value));
    }
    Value::Object(record)
}

#[async_trait::async_trait]
impl JobApi for HttpJobApi {
    async fn submit(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        prompt: Option<String>,
    ) -> Result<String, ApiError> {
        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        if let Some(prompt) = prompt {
            form = form.text("prompt", prompt);
        }
        let response = self
            .authorized(self.client.post(self.url("/api/jobs")))
            .multipart(form)
            .send()
            .await
            .map_err(map_transport)?;
        let response = Self::check(response).await?;
        let parsed: SubmitResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(parsed.job_id)
    }

    async fn status(&self, job_id: &str) -> Result<WireStatus, ApiError> {
        let response = self
            .authorized(self.client.get(self.url(&format!("/api/jobs/{job_id}/status"))))
            .send()
            .await
            .map_err(map_transport)?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn result(&self, job_id: &str) -> Result<ResultSet, ApiError> {
        let response = self
            .authorized(self.client.get(self.url(&format!("/api/jobs/{job_id}/result"))))
            .send()
            .await
            .map_err(map_transport)?;
        let response = Self::check(response).await?;
        let value: Value = response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        let result = WireResult::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(result.into_result_set())
    }

    async fn update_result(
        &self,
        job_id: &str,
        detailed: &[Entry],
        summary: &[Entry],
    ) -> Result<(), ApiError> {
        let body = json!({
            "detailed_entries": detailed.iter().map(labeled_record).collect::<Vec<_>>(),
            "summary_entries": summary.iter().map(labeled_record).collect::<Vec<_>>(),
        });
        let response = self
            .authorized(self.client.put(self.url(&format!("/api/jobs/{job_id}/result"))))
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, job_id: &str) -> Result<(), ApiError> {
        let response = self
            .authorized(self.client.delete(self.url(&format!("/api/jobs/{job_id}"))))
            .send()
            .await
            .map_err(map_transport)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn health(&self) -> Result<(), ApiError> {
        // The liveness probe takes no auth header.
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(map_transport)?;
        Self::check(response).await?;
        Ok(())
    }
}

//! REST API client for the job backend.
//!
//! Wraps job submission, status retrieval, listing, deletion and the
//! health probe using [`reqwest`]. Every failure to obtain a well-formed
//! response is a [`JobApiError`]; a backend-reported job failure is a
//! successful response carrying `status: "error"`.

use std::path::Path;

use reqwest::Url;
use serde::Deserialize;

use jobtrack_core::error::CoreError;
use jobtrack_core::job_status::{JobList, JobStatus};
use jobtrack_core::submission::{
    into_validation_result, validate_csv_filename, PdfRequest, SubmitResponse,
    TournamentRequest,
};
use jobtrack_core::types::JobId;

use crate::config::ClientConfig;

/// HTTP client for one backend instance.
#[derive(Debug, Clone)]
pub struct JobApi {
    client: reqwest::Client,
    base_url: Url,
}

/// Body of `DELETE /jobs/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteResponse {
    pub status: String,
    pub job_id: JobId,
}

/// Errors from the REST layer. During polling these are transport
/// errors: they never change the tracked job's state.
#[derive(Debug, thiserror::Error)]
pub enum JobApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response whose body could not be interpreted.
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    /// The request was rejected locally before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reading a local upload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for JobApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => JobApiError::InvalidRequest(msg),
        }
    }
}

impl JobApi {
    /// Create a client for `api_url` with reqwest's default settings.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:8000`.
    pub fn new(api_url: &str) -> Result<Self, JobApiError> {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: &str) -> Result<Self, JobApiError> {
        let base_url = parse_base_url(api_url)?;
        Ok(Self { client, base_url })
    }

    /// Create a client honouring the configured request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, JobApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Self::with_client(client, &config.api_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the current snapshot of one job.
    ///
    /// Sends `GET /jobs/{id}`. A body for a different job is reported as
    /// [`JobApiError::InvalidResponse`].
    pub async fn get_job_status(&self, job_id: &JobId) -> Result<JobStatus, JobApiError> {
        let response = self
            .client
            .get(self.endpoint(&["jobs", job_id.as_str()]))
            .send()
            .await?;

        let body = Self::ensure_success(response).await?.text().await?;
        JobStatus::from_json(&body, job_id).map_err(|e| JobApiError::InvalidResponse(e.to_string()))
    }

    /// List every job the backend knows about (`GET /jobs/`).
    pub async fn list_jobs(&self) -> Result<JobList, JobApiError> {
        let response = self.client.get(self.endpoint(&["jobs", ""])).send().await?;
        Self::parse_response(response).await
    }

    /// Remove a job's metadata on the backend (`DELETE /jobs/{id}`).
    pub async fn delete_job(&self, job_id: &JobId) -> Result<DeleteResponse, JobApiError> {
        let response = self
            .client
            .delete(self.endpoint(&["jobs", job_id.as_str()]))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Raw body of `GET /health`.
    pub async fn health(&self) -> Result<serde_json::Value, JobApiError> {
        let response = self.client.get(self.endpoint(&["health"])).send().await?;
        Self::parse_response(response).await
    }

    /// Upload a CSV roster for JBA matching (`POST /csv/upload`).
    ///
    /// The file is sent as multipart field `file`; `university_name` goes
    /// in the query string. Non-`.csv` files are rejected before upload.
    pub async fn submit_csv(
        &self,
        path: &Path,
        university_name: Option<&str>,
    ) -> Result<SubmitResponse, JobApiError> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                JobApiError::InvalidRequest(format!("Not a file path: {}", path.display()))
            })?
            .to_string();
        validate_csv_filename(&filename)?;

        let bytes = tokio::fs::read(path).await?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.clone())
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self
            .client
            .post(self.endpoint(&["csv", "upload"]))
            .multipart(form);
        if let Some(name) = university_name.filter(|n| !n.trim().is_empty()) {
            request = request.query(&[("university_name", name)]);
        }

        let response = request.send().await?;
        let submitted: SubmitResponse = Self::parse_response(response).await?;

        tracing::info!(job_id = %submitted.job_id, file = %filename, "CSV matching job submitted");
        Ok(submitted)
    }

    /// Start a tournament-wide roster fetch (`POST /tournament`).
    pub async fn submit_tournament(
        &self,
        request: &TournamentRequest,
    ) -> Result<SubmitResponse, JobApiError> {
        into_validation_result(request.validate())?;

        let response = self
            .client
            .post(self.endpoint(&["tournament"]))
            .json(request)
            .send()
            .await?;
        let submitted: SubmitResponse = Self::parse_response(response).await?;

        tracing::info!(
            job_id = %submitted.job_id,
            game_id = %request.game_id,
            "Tournament job submitted",
        );
        Ok(submitted)
    }

    /// Request roster PDFs for a list of universities (`POST /pdf`).
    pub async fn submit_pdf(&self, request: &PdfRequest) -> Result<SubmitResponse, JobApiError> {
        into_validation_result(request.validate())?;

        let response = self
            .client
            .post(self.endpoint(&["pdf"]))
            .json(request)
            .send()
            .await?;
        let submitted: SubmitResponse = Self::parse_response(response).await?;

        tracing::info!(
            job_id = %submitted.job_id,
            universities = request.universities.len(),
            "PDF generation job submitted",
        );
        Ok(submitted)
    }

    // ---- private helpers ----

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor: the base URL can carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`JobApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, JobApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(JobApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, JobApiError> {
        let body = Self::ensure_success(response).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| JobApiError::InvalidResponse(e.to_string()))
    }
}

/// Parse a backend base URL that path segments can be appended to.
pub(crate) fn parse_base_url(api_url: &str) -> Result<Url, JobApiError> {
    let base_url = Url::parse(api_url.trim_end_matches('/'))
        .map_err(|e| JobApiError::InvalidRequest(format!("Invalid API URL '{api_url}': {e}")))?;
    if base_url.cannot_be_a_base() {
        return Err(JobApiError::InvalidRequest(format!(
            "API URL '{api_url}' cannot be used as a base"
        )));
    }
    Ok(base_url)
}

//! Request and response bodies for the job submission endpoints.
//!
//! Each submission returns a [`SubmitResponse`] whose `job_id` is handed to
//! the tracker. Requests are checked locally before anything is sent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::JobId;

/// Login for the JBA member site, forwarded to the backend worker.
#[derive(Clone, Serialize, Deserialize)]
pub struct JbaCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for JbaCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JbaCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl JbaCredentials {
    fn collect_errors(&self, errors: &mut Vec<String>) {
        if self.email.trim().is_empty() {
            errors.push("JBA email must not be empty".to_string());
        }
        if self.password.is_empty() {
            errors.push("JBA password must not be empty".to_string());
        }
    }
}

/// Body of `POST /tournament`: fetch every roster in one tournament.
#[derive(Debug, Clone, Serialize)]
pub struct TournamentRequest {
    pub game_id: String,
    pub jba_credentials: JbaCredentials,
    pub generate_pdf: bool,
}

impl TournamentRequest {
    /// Returns an empty `Vec` if valid; otherwise human-readable errors.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.game_id.trim().is_empty() {
            errors.push("Tournament game ID must not be empty".to_string());
        }
        self.jba_credentials.collect_errors(&mut errors);
        errors
    }
}

/// Paper size for generated PDFs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperFormat {
    #[default]
    A4,
    Letter,
}

/// Body of `POST /pdf`: roster PDFs for a list of universities.
#[derive(Debug, Clone, Serialize)]
pub struct PdfRequest {
    pub universities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jba_credentials: Option<JbaCredentials>,
    pub include_photos: bool,
    pub format: PaperFormat,
}

impl PdfRequest {
    /// Returns an empty `Vec` if valid; otherwise human-readable errors.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.universities.is_empty() {
            errors.push("At least one university is required".to_string());
        }
        if self.universities.iter().any(|u| u.trim().is_empty()) {
            errors.push("University names must not be empty".to_string());
        }
        if let Some(credentials) = &self.jba_credentials {
            credentials.collect_errors(&mut errors);
        }
        errors
    }
}

/// Only `.csv` uploads are accepted by `POST /csv/upload`.
pub fn validate_csv_filename(filename: &str) -> Result<(), CoreError> {
    if filename.to_ascii_lowercase().ends_with(".csv") {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Only .csv files can be uploaded, got: '{filename}'"
        )))
    }
}

/// Fold a list of validation messages into a single error.
pub fn into_validation_result(errors: Vec<String>) -> Result<(), CoreError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(errors.join("; ")))
    }
}

/// Response of every submission endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmitResponse {
    pub job_id: JobId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Relative status path, e.g. `/jobs/{id}`.
    #[serde(default)]
    pub polling_url: Option<String>,
}

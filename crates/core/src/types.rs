use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// All parsed timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque, backend-assigned identifier of one submitted job.
///
/// Never generated client-side. The only local check is that it is
/// present and not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Validate a raw identifier taken from navigation state or the
    /// command line.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.trim().is_empty() {
            return Err(CoreError::Validation(
                "Job ID must not be empty".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Like [`parse`](Self::parse) but also rejects an absent identifier.
    pub fn from_optional(raw: Option<&str>) -> Result<Self, CoreError> {
        match raw {
            Some(raw) => Self::parse(raw),
            None => Err(CoreError::Validation("Job ID is missing".to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_accepts_uuid_like_ids() {
        let id = JobId::parse("5b0c7f4e-1f7a-4c39-9d51-0d2f1e8a9b10").unwrap();
        assert_eq!(id.as_str(), "5b0c7f4e-1f7a-4c39-9d51-0d2f1e8a9b10");
    }

    #[test]
    fn parse_rejects_empty_and_blank() {
        assert_matches!(JobId::parse(""), Err(CoreError::Validation(_)));
        assert_matches!(JobId::parse("   "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn from_optional_rejects_missing() {
        assert_matches!(JobId::from_optional(None), Err(CoreError::Validation(_)));
        assert!(JobId::from_optional(Some("abc")).is_ok());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = JobId::parse("abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}

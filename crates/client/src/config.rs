use std::time::Duration;

use jobtrack_core::error::CoreError;

/// Default backend base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Default poll cadence.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
/// Shortest accepted poll cadence.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;
/// Longest accepted poll cadence.
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;
/// Default per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration, read once at startup and passed explicitly to
/// the API client and tracker.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    /// Fixed interval between status polls.
    pub poll_interval: Duration,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `JOBTRACK_API_URL`     | `http://localhost:8000` |
    /// | `POLL_INTERVAL_MS`     | `500`                   |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = normalize_api_url(
            &lookup("JOBTRACK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
        )?;

        let poll_interval_ms = match lookup("POLL_INTERVAL_MS") {
            Some(raw) => parse_u64("POLL_INTERVAL_MS", &raw)?,
            None => DEFAULT_POLL_INTERVAL_MS,
        }
        .clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS);

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => parse_u64("REQUEST_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };
        if request_timeout_secs == 0 {
            return Err(CoreError::Validation(
                "REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            poll_interval: Duration::from_millis(poll_interval_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

/// Trim whitespace and trailing slashes; require an HTTP(S) scheme.
pub fn normalize_api_url(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(CoreError::Validation(format!(
            "API URL must start with http:// or https://, got: '{trimmed}'"
        )));
    }
    Ok(trimmed.to_string())
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, CoreError> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("{key} must be a valid u64, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, CoreError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("JOBTRACK_API_URL", "https://api.example.com/"),
            ("POLL_INTERVAL_MS", "2000"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn poll_interval_is_clamped() {
        let fast = load(&[("POLL_INTERVAL_MS", "1")]).unwrap();
        assert_eq!(fast.poll_interval, Duration::from_millis(MIN_POLL_INTERVAL_MS));
        let slow = load(&[("POLL_INTERVAL_MS", "999999")]).unwrap();
        assert_eq!(slow.poll_interval, Duration::from_millis(MAX_POLL_INTERVAL_MS));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_matches!(load(&[("POLL_INTERVAL_MS", "fast")]), Err(CoreError::Validation(_)));
        assert_matches!(load(&[("REQUEST_TIMEOUT_SECS", "0")]), Err(CoreError::Validation(_)));
        assert_matches!(load(&[("JOBTRACK_API_URL", "localhost:8000")]), Err(CoreError::Validation(_)));
    }
}

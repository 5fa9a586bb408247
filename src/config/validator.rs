//! Configuration validation.

use crate::config::schema::LiftlogConfig;
use crate::error::{LiftlogError, Result};
use crate::timer::MAX_REST_SECS;

/// Check value ranges that the YAML types alone cannot express.
pub fn validate(config: &LiftlogConfig) -> Result<()> {
    let mut problems = Vec::new();

    if config.rest_duration_secs == 0 {
        problems.push("rest_duration_secs must be at least 1".to_string());
    } else if config.rest_duration_secs > MAX_REST_SECS {
        problems.push(format!("rest_duration_secs must be at most {}", MAX_REST_SECS));
    }
    if config.poll_interval_ms == 0 {
        problems.push("poll_interval_ms must be at least 1".to_string());
    }
    if config.update_interval_secs == 0 {
        problems.push("update_interval_secs must be at least 1".to_string());
    }
    if let Some(url) = &config.update_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            problems.push(format!("update_url must be an http(s) URL, got '{}'", url));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(LiftlogError::ConfigValidationError {
            message: problems.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&LiftlogConfig::default()).is_ok());
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let config = LiftlogConfig {
            poll_interval_ms: 0,
            update_interval_secs: 0,
            ..Default::default()
        };

        let err = validate(&config).unwrap_err().to_string();

        assert!(err.contains("poll_interval_ms"));
        assert!(err.contains("update_interval_secs"));
    }

    #[test]
    fn overlong_rest_duration_is_rejected() {
        let config = LiftlogConfig {
            rest_duration_secs: u64::MAX,
            ..Default::default()
        };

        let err = validate(&config).unwrap_err().to_string();

        assert!(err.contains("rest_duration_secs must be at most 86400"));
    }

    #[test]
    fn non_http_update_url_is_rejected() {
        let config = LiftlogConfig {
            update_url: Some("ftp://lift.example".into()),
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }
}

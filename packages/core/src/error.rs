use serde_json::{json, Value};
use thiserror::Error;

use crate::weather::WeatherError;

/// Unified application error for the binary.
///
/// Startup failures (config, HTTP client) and lookup failures all end up
/// here so `main` has one place to report them.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl AppError {
    /// JSON error envelope printed by the CLI.
    pub fn to_json(&self) -> Value {
        match self {
            AppError::Weather(err) => json!({
                "error": {
                    "code": err.code(),
                    "message": err.to_string(),
                    "retry_after": err.retry_after(),
                }
            }),
            AppError::Config(_) => json!({
                "error": {
                    "code": "CONFIG_ERROR",
                    "message": self.to_string(),
                    "retry_after": null,
                }
            }),
            AppError::Http(_) => json!({
                "error": {
                    "code": "HTTP_CLIENT_ERROR",
                    "message": self.to_string(),
                    "retry_after": null,
                }
            }),
            AppError::Output(_) => json!({
                "error": {
                    "code": "OUTPUT_ERROR",
                    "message": self.to_string(),
                    "retry_after": null,
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_envelope_carries_retry_after() {
        let err = AppError::from(WeatherError::rate_limited(42));
        let body = err.to_json();

        assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(body["error"]["retry_after"], 42);
    }

    #[test]
    fn not_found_envelope_has_null_retry_after() {
        let err = AppError::from(WeatherError::location_not_found("Atlantis"));
        let body = err.to_json();

        assert_eq!(body["error"]["code"], "LOCATION_NOT_FOUND");
        assert_eq!(body["error"]["message"], "Location not found: Atlantis");
        assert!(body["error"]["retry_after"].is_null());
    }

    #[test]
    fn config_error_display() {
        let err = AppError::Config("OPENWEATHERMAP_API_KEY is required".into());
        assert_eq!(err.to_string(), "Config error: OPENWEATHERMAP_API_KEY is required");
        assert_eq!(err.to_json()["error"]["code"], "CONFIG_ERROR");
    }
}

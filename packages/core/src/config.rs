use std::env;
use std::time::Duration;

use crate::services::openweather::DEFAULT_BASE_URL;

pub const MIN_CACHE_TTL_SECONDS: u64 = 60;
pub const MAX_CACHE_TTL_SECONDS: u64 = 3600;
pub const MIN_HTTP_TIMEOUT_SECONDS: f64 = 1.0;
pub const MAX_HTTP_TIMEOUT_SECONDS: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub cache_ttl_seconds: u64,
    pub http_timeout_seconds: f64,
    pub cleanup_interval_seconds: u64,
    pub log_level: LogLevel,
    pub environment: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes `std::env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENWEATHERMAP_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or("OPENWEATHERMAP_API_KEY is required")?;

        let base_url = lookup("OPENWEATHERMAP_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let cache_ttl_seconds = match lookup("CACHE_TTL_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| "CACHE_TTL_SECONDS must be a valid number")?,
            None => 900,
        };

        let http_timeout_seconds = match lookup("HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| "HTTP_TIMEOUT_SECONDS must be a valid number")?,
            None => 10.0,
        };

        let cleanup_interval_seconds = match lookup("CACHE_CLEANUP_INTERVAL_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| "CACHE_CLEANUP_INTERVAL_SECONDS must be a valid number")?,
            None => 300,
        };

        let log_level = match lookup("LOG_LEVEL")
            .unwrap_or_else(|| "INFO".to_string())
            .to_ascii_uppercase()
            .as_str()
        {
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARNING" => LogLevel::Warning,
            "ERROR" => LogLevel::Error,
            other => return Err(format!("Invalid LOG_LEVEL: {}", other)),
        };

        let environment = match lookup("ENVIRONMENT")
            .unwrap_or_else(|| "dev".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "dev" => Environment::Dev,
            "staging" => Environment::Staging,
            "prod" => Environment::Prod,
            other => return Err(format!("Invalid ENVIRONMENT: {}", other)),
        };

        let config = Self {
            api_key,
            base_url,
            cache_ttl_seconds,
            http_timeout_seconds,
            cleanup_interval_seconds,
            log_level,
            environment,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check bounds. Called again after CLI overrides are applied.
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_CACHE_TTL_SECONDS..=MAX_CACHE_TTL_SECONDS).contains(&self.cache_ttl_seconds) {
            return Err(format!(
                "CACHE_TTL_SECONDS must be between {} and {}, got {}",
                MIN_CACHE_TTL_SECONDS, MAX_CACHE_TTL_SECONDS, self.cache_ttl_seconds
            ));
        }

        let timeout_range = MIN_HTTP_TIMEOUT_SECONDS..=MAX_HTTP_TIMEOUT_SECONDS;
        if !timeout_range.contains(&self.http_timeout_seconds) {
            return Err(format!(
                "HTTP_TIMEOUT_SECONDS must be between {} and {}, got {}",
                MIN_HTTP_TIMEOUT_SECONDS, MAX_HTTP_TIMEOUT_SECONDS, self.http_timeout_seconds
            ));
        }

        if self.cleanup_interval_seconds == 0 {
            return Err("CACHE_CLEANUP_INTERVAL_SECONDS must be at least 1".to_string());
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.http_timeout_seconds)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }
}

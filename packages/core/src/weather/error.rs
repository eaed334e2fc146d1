//! Error kinds surfaced by weather lookups

use thiserror::Error;

/// Provider name used when a client does not supply its own.
pub const DEFAULT_PROVIDER: &str = "OpenWeatherMap";

/// Retry-after applied when the upstream omits or garbles the header.
pub const DEFAULT_RETRY_AFTER_SECONDS: u64 = 60;

/// Every failure a caller of the weather core can observe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("Location not found: {location}")]
    LocationNotFound { location: String },

    #[error("Invalid {field}: {reason}")]
    InvalidLocation { field: String, reason: String },

    #[error("Weather provider error ({provider}): {message}")]
    ProviderError {
        provider: String,
        message: String,
        status: Option<u16>,
    },

    #[error("Rate limit exceeded. Retry after {retry_after_seconds} seconds.")]
    RateLimited { retry_after_seconds: u64 },

    /// Reserved for cache backends that can fail; the in-memory cache never does.
    #[error("Cache {operation} failed: {message}")]
    CacheError { operation: String, message: String },
}

pub type WeatherResult<T> = Result<T, WeatherError>;

impl WeatherError {
    pub fn location_not_found(location: impl Into<String>) -> Self {
        Self::LocationNotFound {
            location: location.into(),
        }
    }

    pub fn invalid_location(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLocation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn provider_status(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderError {
            provider: provider.into(),
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn rate_limited(retry_after_seconds: u64) -> Self {
        Self::RateLimited {
            retry_after_seconds,
        }
    }

    pub fn cache(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CacheError {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for rendering the error to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::LocationNotFound { .. } => "LOCATION_NOT_FOUND",
            Self::InvalidLocation { .. } => "INVALID_LOCATION",
            Self::ProviderError { .. } => "PROVIDER_ERROR",
            Self::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            Self::CacheError { .. } => "CACHE_ERROR",
        }
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited {
                retry_after_seconds,
            } => Some(*retry_after_seconds),
            _ => None,
        }
    }
}

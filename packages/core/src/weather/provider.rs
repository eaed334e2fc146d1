//! Weather Data Provider Interface
//!
//! Abstracts the upstream weather service so the lookup can run against
//! the real client or a test double.

use async_trait::async_trait;

use crate::weather::{
    error::WeatherResult,
    types::{WeatherData, WeatherRequest},
};

/// Anything that can turn a validated request into current conditions.
#[async_trait]
pub trait WeatherProvider {
    /// Fetch current weather for the request's location and unit system.
    ///
    /// Implementations map upstream failures onto the `WeatherError` kinds
    /// and never retry.
    async fn get_weather(&self, request: &WeatherRequest) -> WeatherResult<WeatherData>;

    /// Get the name of this provider for logging/debugging
    fn provider_name(&self) -> &str;
}

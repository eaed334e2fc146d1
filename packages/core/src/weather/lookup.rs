//! Cached weather lookup.
//!
//! `WeatherLookup` is the read-through path: consult the cache, fall back to
//! the provider on a miss, and store what the provider returned. Provider
//! failures are passed through untouched and never cached.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::WeatherCache;
use crate::weather::{
    error::WeatherResult,
    provider::WeatherProvider,
    types::{WeatherData, WeatherRequest},
};

/// TTL applied to fresh results when none is configured (15 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(900);

pub struct WeatherLookup {
    provider: Arc<dyn WeatherProvider + Send + Sync>,
    cache: Arc<dyn WeatherCache>,
    cache_ttl: Duration,
}

impl WeatherLookup {
    pub fn new(
        provider: Arc<dyn WeatherProvider + Send + Sync>,
        cache: Arc<dyn WeatherCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            cache_ttl,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Resolve `request`, serving from cache when possible.
    ///
    /// Concurrent misses for the same key may each reach the provider; the
    /// last one to finish owns the cache entry.
    pub async fn execute(&self, request: &WeatherRequest) -> WeatherResult<WeatherData> {
        let cache_key = request.cache_key();

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(
                location = %request.location(),
                units = %request.units(),
                cache_key = %cache_key,
                "Cache hit"
            );
            return Ok(cached);
        }

        tracing::debug!(
            location = %request.location(),
            units = %request.units(),
            provider = self.provider.provider_name(),
            "Cache miss, fetching from provider"
        );

        let weather = self.provider.get_weather(request).await?;

        self.cache.set(&cache_key, weather.clone(), self.cache_ttl);
        tracing::info!(
            city = %weather.city_name,
            country = %weather.country,
            temperature = weather.temperature,
            units = %weather.units,
            cache_ttl = self.cache_ttl.as_secs(),
            "Weather data fetched and cached"
        );

        Ok(weather)
    }
}

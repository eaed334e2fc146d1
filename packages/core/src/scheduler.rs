//! Background loops for long-running mode.
//!
//! The cache purges expired entries only when they are read, so entries for
//! locations nobody asks about again would linger. `run_cache_cleanup` sweeps
//! them on a fixed interval. `run_watch` re-issues one lookup on its own
//! interval alongside that sweep, which is what the CLI's `--watch` flag drives.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::time;

use crate::cache::TtlCache;
use crate::weather::{WeatherData, WeatherLookup, WeatherRequest};

/// Sweep expired cache entries until `Ctrl+C` (SIGINT) is received.
pub async fn run_cache_cleanup(cache: Arc<TtlCache<WeatherData>>, cleanup_interval: Duration) {
    let mut interval = time::interval(cleanup_interval);

    tracing::info!(
        "Cache cleanup started (interval: {}s)",
        cleanup_interval.as_secs()
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                cleanup_once(&cache);
            }

            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received. Stopping cache cleanup.");
                break;
            }
        }
    }

    tracing::info!("Cache cleanup stopped cleanly");
}

/// Repeat `request` every `refresh_interval` while a cleanup task sweeps
/// the cache every `cleanup_interval`. Lookup errors are logged and the loop
/// continues.
///
/// Runs until `Ctrl+C` (SIGINT) is received.
pub async fn run_watch(
    lookup: Arc<WeatherLookup>,
    cache: Arc<TtlCache<WeatherData>>,
    request: WeatherRequest,
    refresh_interval: Duration,
    cleanup_interval: Duration,
) {
    let cleanup = tokio::spawn(run_cache_cleanup(cache, cleanup_interval));
    let mut refresh = time::interval(refresh_interval);

    tracing::info!(
        location = %request.location(),
        "Watch started (refresh: {}s)",
        refresh_interval.as_secs()
    );

    loop {
        tokio::select! {
            _ = refresh.tick() => {
                refresh_once(&lookup, &request).await;
            }

            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received. Stopping watch.");
                break;
            }
        }
    }

    cleanup.abort();

    tracing::info!("Watch stopped cleanly");
}

/// Execute a single cleanup pass. Extracted for testability.
fn cleanup_once(cache: &TtlCache<WeatherData>) -> usize {
    let removed = cache.cleanup_expired();
    if removed > 0 {
        tracing::info!(removed, remaining = cache.len(), "Expired cache entries removed");
    } else {
        tracing::debug!(remaining = cache.len(), "No expired cache entries");
    }
    removed
}

/// Execute a single lookup and log the outcome. Extracted for testability.
async fn refresh_once(lookup: &WeatherLookup, request: &WeatherRequest) -> Option<WeatherData> {
    match lookup.execute(request).await {
        Ok(weather) => {
            tracing::info!(
                "{}: {} (feels like {:.1}), {}, wind {}",
                weather.location_display(),
                weather.temperature_display(),
                weather.feels_like,
                weather.description,
                weather.wind_speed_display(),
            );
            Some(weather)
        }
        Err(err) => {
            tracing::error!(code = err.code(), "Weather refresh failed, skipping tick: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::weather::{Coordinates, UnitSystem, WeatherError, WeatherProvider, WeatherResult};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for CountingProvider {
        async fn get_weather(&self, request: &WeatherRequest) -> WeatherResult<WeatherData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WeatherError::provider("counting", "upstream down"));
            }
            Ok(sample_weather(&request.location().to_string(), request.units()))
        }

        fn provider_name(&self) -> &str {
            "counting"
        }
    }

    fn sample_weather(city: &str, units: UnitSystem) -> WeatherData {
        WeatherData {
            city_name: city.to_string(),
            country: "FR".to_string(),
            coordinates: Coordinates::new(48.8566, 2.3522).unwrap(),
            temperature: 21.0,
            feels_like: 20.5,
            humidity: 40,
            wind_speed: 3.0,
            pressure: 1018,
            visibility: 10000,
            description: "clear sky".to_string(),
            icon_code: "01d".to_string(),
            units,
            timestamp: Utc::now(),
        }
    }

    fn paris() -> WeatherRequest {
        WeatherRequest::for_city("Paris", UnitSystem::Metric).unwrap()
    }

    #[test]
    fn cleanup_once_removes_only_expired_entries() {
        let cache = TtlCache::new();
        let sample = sample_weather("Paris", UnitSystem::Metric);
        cache.set("stale", sample.clone(), Duration::from_millis(5));
        cache.set("fresh", sample, Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cleanup_once(&cache), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn refresh_once_populates_cache_then_hits_it() {
        let provider = Arc::new(CountingProvider::new(false));
        let cache: Arc<TtlCache<WeatherData>> = Arc::new(TtlCache::new());
        let lookup = WeatherLookup::new(provider.clone(), cache.clone(), Duration::from_secs(60));

        assert!(refresh_once(&lookup, &paris()).await.is_some());
        assert!(refresh_once(&lookup, &paris()).await.is_some());

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn refresh_once_swallows_provider_errors() {
        let provider = Arc::new(CountingProvider::new(true));
        let cache: Arc<TtlCache<WeatherData>> = Arc::new(TtlCache::new());
        let lookup = WeatherLookup::new(provider.clone(), cache.clone(), Duration::from_secs(60));

        assert!(refresh_once(&lookup, &paris()).await.is_none());
        assert!(refresh_once(&lookup, &paris()).await.is_none());

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }
}

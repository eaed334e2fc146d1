use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;

use weather_cache::cache::TtlCache;
use weather_cache::cli::Cli;
use weather_cache::config::Config;
use weather_cache::error::AppError;
use weather_cache::logging::init_logging;
use weather_cache::scheduler::run_watch;
use weather_cache::services::openweather::OpenWeatherClient;
use weather_cache::weather::{Coordinates, UnitSystem, WeatherData, WeatherLookup, WeatherRequest};

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(&cli).unwrap_or_else(|err| {
        eprintln!("{}", err.to_json());
        std::process::exit(1);
    });

    init_logging(config.log_level, config.environment);
    tracing::debug!(
        base_url = %config.base_url,
        cache_ttl_seconds = config.cache_ttl_seconds,
        http_timeout_seconds = config.http_timeout_seconds,
        "Service started"
    );

    if let Err(err) = run(cli, config).await {
        tracing::error!("{}", err);
        eprintln!("{}", err.to_json());
        std::process::exit(1);
    }
}

/// Environment first, then CLI overrides, then bounds checks.
fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let mut config = Config::from_env().map_err(AppError::Config)?;

    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(ttl) = cli.cache_ttl {
        config.cache_ttl_seconds = ttl;
    }
    config.validate().map_err(AppError::Config)?;

    Ok(config)
}

fn build_request(cli: &Cli) -> Result<WeatherRequest, AppError> {
    let units = cli.units.parse::<UnitSystem>()?;
    let coordinates = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
        _ => None,
    };

    Ok(WeatherRequest::new(cli.city.as_deref(), coordinates, units)?)
}

async fn run(cli: Cli, config: Config) -> Result<(), AppError> {
    // Validate before any network or cache work.
    let request = build_request(&cli)?;

    let client = OpenWeatherClient::new(
        &config.base_url,
        config.api_key.clone(),
        config.http_timeout(),
    )?;
    let cache: Arc<TtlCache<WeatherData>> = Arc::new(TtlCache::new());
    let lookup = Arc::new(WeatherLookup::new(
        Arc::new(client),
        cache.clone(),
        config.cache_ttl(),
    ));

    match cli.watch {
        Some(seconds) => {
            let refresh = std::time::Duration::from_secs(seconds);
            run_watch(lookup, cache, request, refresh, config.cleanup_interval()).await;
        }
        None => {
            let weather = lookup.execute(&request).await?;
            println!("{}", serde_json::to_string_pretty(&weather)?);
        }
    }

    Ok(())
}

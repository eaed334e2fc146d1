use clap::Parser;

/// Weather cache CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "weather-cache",
    version,
    about = "Current weather lookups with a short-lived response cache"
)]
pub struct Cli {
    /// City name to look up
    #[arg(long)]
    pub city: Option<String>,

    /// Latitude (must be given together with --lon)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude (must be given together with --lat)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Unit system: metric or imperial
    #[arg(long, default_value = "metric")]
    pub units: String,

    /// OpenWeatherMap API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Cache TTL in seconds (60-3600)
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Repeat the lookup every N seconds until Ctrl+C
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub watch: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_city_lookup() {
        let cli = Cli::try_parse_from(["weather-cache", "--city", "London", "--units", "imperial"])
            .unwrap();
        assert_eq!(cli.city.as_deref(), Some("London"));
        assert_eq!(cli.units, "imperial");
        assert!(cli.watch.is_none());
    }

    #[test]
    fn parses_negative_coordinates() {
        let cli =
            Cli::try_parse_from(["weather-cache", "--lat", "-33.86", "--lon", "-151.2"]).unwrap();
        assert_eq!(cli.lat, Some(-33.86));
        assert_eq!(cli.lon, Some(-151.2));
        assert_eq!(cli.units, "metric");
    }

    #[test]
    fn watch_interval_must_be_positive() {
        assert!(Cli::try_parse_from(["weather-cache", "--city", "Oslo", "--watch", "0"]).is_err());

        let cli =
            Cli::try_parse_from(["weather-cache", "--city", "Oslo", "--watch", "30"]).unwrap();
        assert_eq!(cli.watch, Some(30));
    }

    #[test]
    fn latitude_without_longitude_is_rejected() {
        assert!(Cli::try_parse_from(["weather-cache", "--lat", "51.5"]).is_err());
    }
}

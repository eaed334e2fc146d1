use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};
use serde::Deserialize;

use crate::weather::{
    error::{WeatherError, WeatherResult, DEFAULT_PROVIDER, DEFAULT_RETRY_AFTER_SECONDS},
    provider::WeatherProvider,
    types::{Coordinates, Location, UnitSystem, WeatherData, WeatherRequest},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Client for the OpenWeatherMap current-weather endpoint.
#[derive(Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl OpenWeatherClient {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    name: String,
    coord: CoordPayload,
    main: MainPayload,
    sys: SysPayload,
    #[serde(default)]
    wind: WindPayload,
    #[serde(default)]
    visibility: u32,
    #[serde(default)]
    weather: Vec<ConditionPayload>,
}

#[derive(Debug, Deserialize)]
struct CoordPayload {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct MainPayload {
    temp: f64,
    feels_like: f64,
    humidity: u32,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct SysPayload {
    country: String,
}

#[derive(Debug, Default, Deserialize)]
struct WindPayload {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ConditionPayload {
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

impl OpenWeatherClient {
    /// `GET /weather?q=<city>`
    pub async fn fetch_by_city(&self, city: &str, units: UnitSystem) -> WeatherResult<WeatherData> {
        let query = [
            ("q", city.to_string()),
            ("units", units.as_str().to_string()),
            ("appid", self.api_key.clone()),
        ];

        self.fetch_current(&query, city, units).await
    }

    /// `GET /weather?lat=<lat>&lon=<lon>`
    pub async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> WeatherResult<WeatherData> {
        let query = [
            ("lat", coordinates.latitude().to_string()),
            ("lon", coordinates.longitude().to_string()),
            ("units", units.as_str().to_string()),
            ("appid", self.api_key.clone()),
        ];

        self.fetch_current(&query, &coordinates.to_string(), units).await
    }

    async fn fetch_current(
        &self,
        query: &[(&str, String)],
        queried: &str,
        units: UnitSystem,
    ) -> WeatherResult<WeatherData> {
        let url = format!("{}/weather", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let response = self.check_status(response, queried).await?;

        let body = response
            .json::<CurrentWeatherResponse>()
            .await
            .map_err(|err| {
                WeatherError::provider(
                    self.provider_name(),
                    format!("Failed to parse weather response: {}", err),
                )
            })?;

        parse_current_weather(body, units, self.provider_name())
    }

    async fn check_status(&self, response: Response, queried: &str) -> WeatherResult<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::NOT_FOUND => Err(WeatherError::location_not_found(queried)),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.trim().parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECONDS);

                tracing::warn!(retry_after, "OpenWeatherMap rate limit hit");
                Err(WeatherError::rate_limited(retry_after))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(WeatherError::provider_status(
                    self.provider_name(),
                    status.as_u16(),
                    format!("API returned status {}: {}", status.as_u16(), body),
                ))
            }
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> WeatherError {
        let message = if err.is_timeout() {
            format!("Request timed out: {}", err)
        } else {
            format!("Request failed: {}", err)
        };

        WeatherError::provider(self.provider_name(), message)
    }
}

fn parse_current_weather(
    body: CurrentWeatherResponse,
    units: UnitSystem,
    provider: &str,
) -> WeatherResult<WeatherData> {
    let coordinates = Coordinates::new(body.coord.lat, body.coord.lon).map_err(|err| {
        WeatherError::provider(provider, format!("Upstream returned bad coordinates: {}", err))
    })?;
    let condition = body.weather.into_iter().next().unwrap_or_default();

    Ok(WeatherData {
        city_name: body.name,
        country: body.sys.country,
        coordinates,
        temperature: body.main.temp,
        feels_like: body.main.feels_like,
        humidity: body.main.humidity,
        wind_speed: body.wind.speed,
        pressure: body.main.pressure,
        visibility: body.visibility,
        description: condition.description,
        icon_code: condition.icon,
        units,
        timestamp: Utc::now(),
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn get_weather(&self, request: &WeatherRequest) -> WeatherResult<WeatherData> {
        match request.location() {
            Location::City(city) => self.fetch_by_city(city, request.units()).await,
            Location::Coordinates(coords) => {
                self.fetch_by_coordinates(*coords, request.units()).await
            }
        }
    }

    fn provider_name(&self) -> &str {
        DEFAULT_PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<CurrentWeatherResponse, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn optional_fields_default_when_missing() {
        let body = parse(
            r#"{
                "name": "Reykjavik",
                "coord": {"lat": 64.1355, "lon": -21.8954},
                "main": {"temp": 2.0, "feels_like": -3.1, "humidity": 80, "pressure": 998},
                "sys": {"country": "IS"}
            }"#,
        )
        .unwrap();

        let data = parse_current_weather(body, UnitSystem::Metric, DEFAULT_PROVIDER).unwrap();

        assert_eq!(data.wind_speed, 0.0);
        assert_eq!(data.visibility, 0);
        assert_eq!(data.description, "");
        assert_eq!(data.icon_code, "");
        assert_eq!(data.location_display(), "Reykjavik, IS");
    }

    #[test]
    fn missing_main_block_fails_to_parse() {
        let result = parse(
            r#"{"name": "Nowhere", "coord": {"lat": 0.0, "lon": 0.0}, "sys": {"country": "XX"}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_upstream_coordinates_are_a_provider_error() {
        let body = parse(
            r#"{
                "name": "Broken",
                "coord": {"lat": 123.0, "lon": 0.0},
                "main": {"temp": 1.0, "feels_like": 1.0, "humidity": 1, "pressure": 1},
                "sys": {"country": "XX"}
            }"#,
        )
        .unwrap();

        let err = parse_current_weather(body, UnitSystem::Metric, "stub").unwrap_err();
        assert!(matches!(
            err,
            WeatherError::ProviderError { ref provider, status: None, .. } if provider == "stub"
        ));
    }

    #[test]
    fn new_strips_trailing_slash_from_base_url() {
        let client = OpenWeatherClient::new(
            "http://localhost:1234/data/2.5/",
            "key",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/data/2.5");
    }
}

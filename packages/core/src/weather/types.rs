//! Core weather domain types.
//!
//! Requests and results are immutable once constructed. All validation
//! happens in the constructors, so a `WeatherRequest` that exists is always
//! safe to hand to the cache and the provider.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::weather::error::{WeatherError, WeatherResult};

/// Longest city name accepted in a request.
pub const MAX_CITY_LENGTH: usize = 100;

/// Measurement system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Celsius, metres per second.
    #[default]
    Metric,
    /// Fahrenheit, miles per hour.
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            other => Err(WeatherError::invalid_location(
                "units",
                format!("expected 'metric' or 'imperial', got '{}'", other),
            )),
        }
    }
}

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Build a coordinate pair, rejecting values outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> WeatherResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(WeatherError::invalid_location(
                "latitude",
                format!("must be between -90 and 90, got {}", latitude),
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::invalid_location(
                "longitude",
                format!("must be between -180 and 180, got {}", longitude),
            ));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Where the caller wants weather for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    City(String),
    Coordinates(Coordinates),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::City(name) => f.write_str(name),
            Location::Coordinates(coords) => write!(f, "{}", coords),
        }
    }
}

/// A validated weather query.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRequest {
    location: Location,
    units: UnitSystem,
}

impl WeatherRequest {
    /// Build a request from the raw query parts.
    ///
    /// Coordinates take precedence when both forms are supplied. A city that
    /// is supplied is length-checked either way; an empty or whitespace-only
    /// city counts as "not supplied".
    pub fn new(
        city: Option<&str>,
        coordinates: Option<Coordinates>,
        units: UnitSystem,
    ) -> WeatherResult<Self> {
        let city = city.filter(|c| !c.trim().is_empty());

        if let Some(name) = city {
            if name.chars().count() > MAX_CITY_LENGTH {
                return Err(WeatherError::invalid_location(
                    "city",
                    format!("cannot exceed {} characters", MAX_CITY_LENGTH),
                ));
            }
        }

        let location = match (coordinates, city) {
            (Some(coords), _) => Location::Coordinates(coords),
            (None, Some(name)) => Location::City(name.to_string()),
            (None, None) => {
                return Err(WeatherError::invalid_location(
                    "city",
                    "either a city name or coordinates must be provided",
                ))
            }
        };

        Ok(Self { location, units })
    }

    pub fn for_city(city: &str, units: UnitSystem) -> WeatherResult<Self> {
        Self::new(Some(city), None, units)
    }

    pub fn for_coordinates(
        latitude: f64,
        longitude: f64,
        units: UnitSystem,
    ) -> WeatherResult<Self> {
        Self::new(None, Some(Coordinates::new(latitude, longitude)?), units)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Normalised key under which this request's result is cached.
    ///
    /// City keys ignore case and surrounding whitespace. Coordinate keys are
    /// rounded to two decimals so near-identical points share an entry.
    pub fn cache_key(&self) -> String {
        match &self.location {
            Location::City(name) => {
                format!("weather:{}:{}", name.trim().to_lowercase(), self.units)
            }
            Location::Coordinates(coords) => format!(
                "weather:coords:{},{}:{}",
                key_degrees(coords.latitude),
                key_degrees(coords.longitude),
                self.units
            ),
        }
    }
}

/// Render degrees rounded to hundredths. Works on the integer count of
/// hundredths so values that round to zero never come out as "-0.00".
fn key_degrees(degrees: f64) -> String {
    let hundredths = (degrees * 100.0).round() as i64;
    let sign = if hundredths < 0 { "-" } else { "" };
    let abs = hundredths.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Normalised snapshot of current conditions returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub city_name: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u32,
    pub wind_speed: f64,
    pub pressure: u32,
    pub visibility: u32,
    pub description: String,
    pub icon_code: String,
    pub units: UnitSystem,
    /// When the provider response was parsed, not the upstream observation time.
    pub timestamp: DateTime<Utc>,
}

impl WeatherData {
    pub fn temperature_display(&self) -> String {
        format!("{:.1}{}", self.temperature, self.units.temperature_symbol())
    }

    pub fn wind_speed_display(&self) -> String {
        format!("{:.1} {}", self.wind_speed, self.units.wind_speed_unit())
    }

    pub fn location_display(&self) -> String {
        format!("{}, {}", self.city_name, self.country)
    }
}

//! Weather Module
//!
//! Domain model, error kinds, the provider port and the cached lookup that
//! ties them together.

pub mod error;
pub mod lookup;
pub mod provider;
pub mod types;

pub use error::{WeatherError, WeatherResult};
pub use lookup::{WeatherLookup, DEFAULT_CACHE_TTL};
pub use provider::WeatherProvider;
pub use types::{Coordinates, Location, UnitSystem, WeatherData, WeatherRequest};

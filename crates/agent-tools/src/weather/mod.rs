//! Weather Service Integration
//!
//! Abstractions and implementations for current-conditions lookups.

mod mock;
mod open_meteo;

pub use mock::MockWeatherClient;
pub use open_meteo::OpenMeteoClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{CurrentWeather, Location, TemperatureUnit};

/// Weather client trait (Strategy pattern)
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Resolve a free-text place name to coordinates
    async fn geocode(&self, query: &str) -> Result<Location>;

    /// Current conditions at a resolved location
    async fn current(&self, location: &Location, unit: TemperatureUnit) -> Result<CurrentWeather>;

    fn name(&self) -> &str;
}

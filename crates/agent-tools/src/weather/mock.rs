//! Mock Weather Client
//!
//! Deterministic conditions for a handful of cities, for tests and offline
//! demos.

use async_trait::async_trait;

use super::WeatherClient;
use crate::error::{Result, ToolsError};
use crate::model::{CurrentWeather, Location, TemperatureUnit};

#[derive(Default)]
pub struct MockWeatherClient;

impl MockWeatherClient {
    pub fn new() -> Self {
        Self
    }

    /// (name, country, lat, lon, °C, humidity, wind km/h, WMO code)
    fn lookup(query: &str) -> Option<(&'static str, &'static str, f64, f64, f64, f64, f64, u8)> {
        match query.trim().to_lowercase().as_str() {
            "paris" => Some(("Paris", "France", 48.85341, 2.3488, 15.0, 72.0, 11.0, 3)),
            "london" => Some(("London", "United Kingdom", 51.50853, -0.12574, 12.0, 81.0, 18.0, 61)),
            "new york" => Some(("New York", "United States", 40.71427, -74.00597, 19.0, 55.0, 14.0, 1)),
            "tokyo" => Some(("Tokyo", "Japan", 35.6895, 139.69171, 22.0, 64.0, 9.0, 2)),
            "oslo" => Some(("Oslo", "Norway", 59.91273, 10.74609, 4.0, 77.0, 20.0, 73)),
            _ => None,
        }
    }
}

#[async_trait]
impl WeatherClient for MockWeatherClient {
    async fn geocode(&self, query: &str) -> Result<Location> {
        let (name, country, latitude, longitude, ..) =
            Self::lookup(query).ok_or_else(|| ToolsError::LocationNotFound(query.to_string()))?;

        Ok(Location {
            name: name.into(),
            latitude,
            longitude,
            country: Some(country.into()),
            admin1: None,
        })
    }

    async fn current(&self, location: &Location, unit: TemperatureUnit) -> Result<CurrentWeather> {
        let (_, _, _, _, celsius, humidity, wind, code) = Self::lookup(&location.name)
            .ok_or_else(|| ToolsError::LocationNotFound(location.name.clone()))?;

        Ok(CurrentWeather {
            time: "2026-01-01T12:00".into(),
            temperature: unit.from_celsius(celsius),
            apparent_temperature: unit.from_celsius(celsius - 2.0),
            relative_humidity: humidity,
            precipitation: 0.0,
            wind_speed: wind,
            weather_code: code,
            unit,
        })
    }

    fn name(&self) -> &str {
        "MockWeather"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_weather() {
        let client = MockWeatherClient::new();

        let paris = client.geocode("  PARIS ").await.unwrap();
        assert_eq!(paris.name, "Paris");

        let current = client.current(&paris, TemperatureUnit::Fahrenheit).await.unwrap();
        assert!((current.temperature - 59.0).abs() < 1e-9);
        assert_eq!(current.unit, TemperatureUnit::Fahrenheit);
    }

    #[tokio::test]
    async fn test_unknown_location() {
        let client = MockWeatherClient::new();
        let result = client.geocode("Atlantis").await;
        assert!(matches!(result, Err(ToolsError::LocationNotFound(_))));
    }
}

//! Open-Meteo Client
//!
//! Free, keyless weather API: one geocoding call to resolve the place name,
//! one forecast call for the current conditions.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::WeatherClient;
use crate::error::{Result, ToolsError};
use crate::model::{CurrentWeather, Location, TemperatureUnit};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,wind_speed_10m,weather_code";

pub struct OpenMeteoClient {
    http: reqwest::Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoints(GEOCODING_URL, FORECAST_URL)
    }

    /// Point at alternative endpoints (self-hosted instance, test server)
    pub fn with_endpoints(geocoding_url: impl Into<String>, forecast_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
        })
    }

    fn forecast_query(location: &Location, unit: TemperatureUnit) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("temperature_unit", unit.as_param().to_string()),
            ("wind_speed_unit", "kmh".to_string()),
            ("timezone", "auto".to_string()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Location>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: ForecastCurrent,
}

#[derive(Debug, Deserialize)]
struct ForecastCurrent {
    time: String,
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    precipitation: f64,
    wind_speed_10m: f64,
    weather_code: u8,
}

impl ForecastCurrent {
    fn into_weather(self, unit: TemperatureUnit) -> CurrentWeather {
        CurrentWeather {
            time: self.time,
            temperature: self.temperature_2m,
            apparent_temperature: self.apparent_temperature,
            relative_humidity: self.relative_humidity_2m,
            precipitation: self.precipitation,
            wind_speed: self.wind_speed_10m,
            weather_code: self.weather_code,
            unit,
        }
    }
}

#[async_trait]
impl WeatherClient for OpenMeteoClient {
    async fn geocode(&self, query: &str) -> Result<Location> {
        let response = self
            .http
            .get(&self.geocoding_url)
            .query(&[("name", query), ("count", "1"), ("language", "en"), ("format", "json")])
            .send()
            .await?
            .error_for_status()?
            .json::<GeocodingResponse>()
            .await?;

        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ToolsError::LocationNotFound(query.to_string()))
    }

    async fn current(&self, location: &Location, unit: TemperatureUnit) -> Result<CurrentWeather> {
        tracing::debug!(location = %location.name, "Fetching current weather");

        let response = self
            .http
            .get(&self.forecast_url)
            .query(&Self::forecast_query(location, unit))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolsError::Weather(format!("{}: {}", status, body)));
        }

        let forecast = response.json::<ForecastResponse>().await?;
        Ok(forecast.current.into_weather(unit))
    }

    fn name(&self) -> &str {
        "Open-Meteo"
    }
}

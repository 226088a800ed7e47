//! Weather Tool
//!
//! Resolves a place name and reports its current weather conditions.

use std::sync::Arc;

use agent_core::{
    tool::ParameterSchema,
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};
use async_trait::async_trait;

use crate::error::ToolsError;
use crate::model::{TemperatureUnit, WeatherReport};
use crate::weather::WeatherClient;

pub struct WeatherTool {
    client: Arc<dyn WeatherClient>,
}

impl WeatherTool {
    pub const NAME: &'static str = "weather";

    pub fn new(client: Arc<dyn WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.into(),
            description: "Get the current weather for a city or place. Returns temperature, feels-like temperature, conditions, humidity, wind and precipitation.".into(),
            parameters: vec![
                ParameterSchema::string("location", "City or place name (e.g., 'Paris')", true),
                ParameterSchema::string("units", "Temperature unit (default: celsius)", false)
                    .one_of(&["celsius", "fahrenheit"]),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let location = call.str_arg("location").unwrap_or_default().trim();
        if location.is_empty() {
            return Ok(ToolResult::failure(Self::NAME, "location must not be empty"));
        }

        let unit = match call.str_arg("units") {
            None => TemperatureUnit::default(),
            Some(raw) => match TemperatureUnit::parse(raw) {
                Some(unit) => unit,
                None => {
                    return Ok(ToolResult::failure(
                        Self::NAME,
                        format!("unsupported units '{}', use celsius or fahrenheit", raw),
                    ));
                }
            },
        };

        let place = match self.client.geocode(location).await {
            Ok(place) => place,
            Err(ToolsError::LocationNotFound(query)) => {
                return Ok(ToolResult::failure(
                    Self::NAME,
                    format!("No place called '{}' was found", query),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        let current = self.client.current(&place, unit).await?;
        let report = WeatherReport {
            location: place,
            current,
        };

        tracing::debug!(client = self.client.name(), location = %report.location.name, "Weather lookup done");

        Ok(ToolResult::success(Self::NAME, report.summary()).with_data(serde_json::to_value(&report)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::MockWeatherClient;

    fn tool() -> WeatherTool {
        WeatherTool::new(Arc::new(MockWeatherClient::new()))
    }

    fn call(arguments: serde_json::Value) -> ToolCall {
        serde_json::from_value(serde_json::json!({"tool": "weather", "arguments": arguments})).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_reports_conditions() {
        let result = tool().execute(&call(serde_json::json!({"location": "Paris"}))).await.unwrap();

        assert!(result.success);
        assert!(result.output.starts_with("Current weather in Paris, France: 15.0°C"));
        assert_eq!(result.data.unwrap()["current"]["weather_code"], 3);
    }

    #[tokio::test]
    async fn test_fahrenheit() {
        let result = tool()
            .execute(&call(serde_json::json!({"location": "Paris", "units": "fahrenheit"})))
            .await
            .unwrap();

        assert!(result.output.contains("59.0°F"));
    }

    #[tokio::test]
    async fn test_unknown_place_is_reported_to_model() {
        let result = tool().execute(&call(serde_json::json!({"location": "Atlantis"}))).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.output, "No place called 'Atlantis' was found");
    }

    #[tokio::test]
    async fn test_bad_units() {
        let result = tool()
            .execute(&call(serde_json::json!({"location": "Paris", "units": "kelvin"})))
            .await
            .unwrap();

        assert!(!result.success);
    }

    #[test]
    fn test_schema() {
        let schema = tool().schema();
        assert_eq!(schema.name, "weather");
        assert!(schema.parameters.iter().any(|p| p.name == "location" && p.required));
    }
}

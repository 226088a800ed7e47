//! Weather Domain Model

use serde::{Deserialize, Serialize};

/// Temperature unit requested by the model
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "celsius" | "c" | "metric" => Some(Self::Celsius),
            "fahrenheit" | "f" | "imperial" => Some(Self::Fahrenheit),
            _ => None,
        }
    }

    /// Query parameter value understood by Open-Meteo
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }
}

/// A geocoded place
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    /// First-level region (state, province...)
    #[serde(default)]
    pub admin1: Option<String>,
}

impl Location {
    /// "Paris, Île-de-France, France"
    pub fn display_name(&self) -> String {
        [Some(self.name.as_str()), self.admin1.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Current conditions at a location
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Local observation time as reported by the service
    pub time: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    /// Percent
    pub relative_humidity: f64,
    /// Millimetres in the last interval
    pub precipitation: f64,
    /// km/h
    pub wind_speed: f64,
    /// WMO weather interpretation code
    pub weather_code: u8,
    pub unit: TemperatureUnit,
}

impl CurrentWeather {
    pub fn conditions(&self) -> &'static str {
        describe_weather_code(self.weather_code)
    }
}

/// Everything the weather tool reports back
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Location,
    pub current: CurrentWeather,
}

impl WeatherReport {
    pub fn summary(&self) -> String {
        let c = &self.current;
        let unit = c.unit.symbol();
        format!(
            "Current weather in {}: {:.1}{} (feels like {:.1}{}), {}, humidity {:.0}%, wind {:.1} km/h, precipitation {:.1} mm (observed {}).",
            self.location.display_name(),
            c.temperature,
            unit,
            c.apparent_temperature,
            unit,
            c.conditions(),
            c.relative_humidity,
            c.wind_speed,
            c.precipitation,
            c.time,
        )
    }
}

/// WMO weather interpretation codes (WW)
pub fn describe_weather_code(code: u8) -> &'static str {
    match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 | 48 => "fog",
        51 | 53 | 55 => "drizzle",
        56 | 57 => "freezing drizzle",
        61 | 63 | 65 => "rain",
        66 | 67 => "freezing rain",
        71 | 73 | 75 => "snow fall",
        77 => "snow grains",
        80..=82 => "rain showers",
        85 | 86 => "snow showers",
        95 => "thunderstorm",
        96 | 99 => "thunderstorm with hail",
        _ => "unknown conditions",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> Location {
        Location {
            name: "Paris".into(),
            latitude: 48.85341,
            longitude: 2.3488,
            country: Some("France".into()),
            admin1: Some("Île-de-France".into()),
        }
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!(TemperatureUnit::parse("Fahrenheit"), Some(TemperatureUnit::Fahrenheit));
        assert_eq!(TemperatureUnit::parse("metric"), Some(TemperatureUnit::Celsius));
        assert_eq!(TemperatureUnit::parse("kelvin"), None);
        assert!((TemperatureUnit::Fahrenheit.from_celsius(100.0) - 212.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display_name_skips_missing_parts() {
        assert_eq!(paris().display_name(), "Paris, Île-de-France, France");

        let mut bare = paris();
        bare.admin1 = None;
        bare.country = None;
        assert_eq!(bare.display_name(), "Paris");
    }

    #[test]
    fn test_report_summary() {
        let report = WeatherReport {
            location: paris(),
            current: CurrentWeather {
                time: "2026-10-19T12:00".into(),
                temperature: 15.0,
                apparent_temperature: 13.4,
                relative_humidity: 72.0,
                precipitation: 0.0,
                wind_speed: 11.2,
                weather_code: 3,
                unit: TemperatureUnit::Celsius,
            },
        };

        assert_eq!(
            report.summary(),
            "Current weather in Paris, Île-de-France, France: 15.0°C (feels like 13.4°C), overcast, humidity 72%, wind 11.2 km/h, precipitation 0.0 mm (observed 2026-10-19T12:00)."
        );
    }

    #[test]
    fn test_weather_codes() {
        assert_eq!(describe_weather_code(0), "clear sky");
        assert_eq!(describe_weather_code(81), "rain showers");
        assert_eq!(describe_weather_code(200), "unknown conditions");
    }
}

//! # agent-tools
//!
//! Tools the weather agent can call:
//!
//! - `weather` - current conditions through a [`weather::WeatherClient`]
//!   (Open-Meteo in production, a deterministic mock for tests)
//! - `python` - code execution in an external interpreter service, only
//!   registered when one is configured

pub mod error;
pub mod model;
pub mod svckit;
pub mod weather;

pub use error::{Result, ToolsError};
pub use model::{CurrentWeather, Location, TemperatureUnit, WeatherReport};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{CodeInterpreterTool, WeatherTool};
}

/// System prompt for the weather agent
pub const WEATHER_AGENT_PROMPT: &str = r#"You are a helpful assistant with access to live weather data.

## How to Work

1. Think briefly about what the user needs.
2. If the question is about current weather, call the `weather` tool with the place name.
3. If a calculation or data processing is needed and the `python` tool is available, use it and print the result.
4. Answer in one or two sentences using the tool results. Mention the place and the unit.

When you need a tool, follow your thought with a JSON block in this exact format:
```tool
{"tool": "tool_name", "arguments": {"arg1": "value1"}}
```

When you can answer, reply with the answer only, without a tool block.
Never invent weather data; if a lookup fails, say so."#;

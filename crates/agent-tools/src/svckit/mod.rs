//! Service Kit - Agent Tools
//!
//! Tools implementing `agent_core::Tool` for the weather agent.

mod code_interpreter;
mod weather_lookup;

pub use code_interpreter::CodeInterpreterTool;
pub use weather_lookup::WeatherTool;

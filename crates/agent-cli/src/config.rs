//! Application Configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded
//! first by `main`). Unset variables fall back to defaults; set but
//! malformed ones are an error.

use std::str::FromStr;

use agent_core::RunLimits;
use agent_runtime::OllamaConfig;
use anyhow::{Context, Result, bail};

const DEFAULT_MODEL: &str = "granite4:micro";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub ollama: OllamaConfig,
    pub model: String,
    pub temperature: f32,
    pub limits: RunLimits,
    /// Show events from nested invocations (tool calls)
    pub match_nested: bool,
    /// Code interpreter service root; the tool is disabled when unset
    pub code_interpreter_url: Option<String>,
    /// Use canned weather data instead of Open-Meteo
    pub weather_offline: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = RunLimits::default();

        // Validate the port here so a typo fails loudly instead of silently
        // falling back to the default
        parse_var::<u16>(&lookup, "OLLAMA_PORT", 11434)?;

        Ok(Self {
            ollama: OllamaConfig::from_lookup(&lookup),
            model: lookup("LLM_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_var(&lookup, "LLM_TEMPERATURE", 0.0)?,
            limits: RunLimits {
                max_retries_per_step: parse_var(&lookup, "AGENT_MAX_RETRIES_PER_STEP", defaults.max_retries_per_step)?,
                total_max_retries: parse_var(&lookup, "AGENT_TOTAL_MAX_RETRIES", defaults.total_max_retries)?,
                max_iterations: parse_var(&lookup, "AGENT_MAX_ITERATIONS", defaults.max_iterations)?,
            },
            match_nested: parse_bool(&lookup, "AGENT_MATCH_NESTED")?,
            code_interpreter_url: lookup("CODE_INTERPRETER_URL")
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            weather_offline: parse_bool(&lookup, "WEATHER_OFFLINE")?,
        })
    }
}

fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        _ => Ok(default),
    }
}

fn parse_bool(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Result<bool> {
    let Some(raw) = lookup(key) else {
        return Ok(false);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => bail!("invalid value for {}: {:?}", key, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.model, "granite4:micro");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.limits, RunLimits::default());
        assert_eq!(config.ollama, OllamaConfig::default());
        assert!(!config.match_nested);
        assert!(!config.weather_offline);
        assert!(config.code_interpreter_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("OLLAMA_HOST", "http://gpu-box"),
            ("OLLAMA_PORT", "8080"),
            ("LLM_MODEL", "llama3.1"),
            ("LLM_TEMPERATURE", "0.7"),
            ("AGENT_MAX_RETRIES_PER_STEP", "1"),
            ("AGENT_TOTAL_MAX_RETRIES", " 4 "),
            ("AGENT_MAX_ITERATIONS", "8"),
            ("AGENT_MATCH_NESTED", "true"),
            ("CODE_INTERPRETER_URL", "http://127.0.0.1:50081"),
            ("WEATHER_OFFLINE", "1"),
        ])
        .unwrap();

        assert_eq!(config.ollama.endpoint(), "http://gpu-box:8080");
        assert_eq!(config.model, "llama3.1");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(
            config.limits,
            RunLimits {
                max_retries_per_step: 1,
                total_max_retries: 4,
                max_iterations: 8,
            }
        );
        assert!(config.match_nested);
        assert!(config.weather_offline);
        assert_eq!(config.code_interpreter_url.as_deref(), Some("http://127.0.0.1:50081"));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config(&[("CODE_INTERPRETER_URL", "  "), ("LLM_MODEL", ""), ("AGENT_MAX_ITERATIONS", "")]).unwrap();

        assert!(config.code_interpreter_url.is_none());
        assert_eq!(config.model, "granite4:micro");
        assert_eq!(config.limits.max_iterations, 20);
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        let err = config(&[("AGENT_MAX_RETRIES_PER_STEP", "three")]).unwrap_err();
        assert!(err.to_string().contains("AGENT_MAX_RETRIES_PER_STEP"));

        assert!(config(&[("OLLAMA_PORT", "not-a-port")]).is_err());
        assert!(config(&[("AGENT_MATCH_NESTED", "maybe")]).is_err());
    }
}

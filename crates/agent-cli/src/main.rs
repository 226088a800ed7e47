//! weather-agent
//!
//! Interactive console for a ReAct agent with weather and code interpreter
//! tools. Reads prompts from stdin, prints the agent's progress events and
//! answers to stdout, logs to stderr.

mod config;
mod console;
mod dispatch;
mod session;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AgentBuilder, AgentError, EmitterOptions, LlmProvider, ToolRegistry};
use agent_runtime::OllamaProvider;
use agent_tools::{
    tools::{CodeInterpreterTool, WeatherTool},
    weather::{MockWeatherClient, OpenMeteoClient, WeatherClient},
    WEATHER_AGENT_PROMPT,
};

use crate::config::AppConfig;
use crate::console::Console;
use crate::session::{announce, run_session};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!(error = ?e, "Fatal error");
        eprintln!("Error: {}", fatal_message(&e));
        std::process::exit(1);
    }
}

/// Text shown to the user when the process gives up
fn fatal_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<AgentError>() {
        Some(agent_error) => agent_error.explain(),
        None => format!("{:#}", error),
    }
}

async fn run() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays a clean transcript
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    // Initialize LLM provider
    let provider = Arc::new(OllamaProvider::from_config(config.ollama.clone()));

    match provider.health_check().await {
        Ok(true) => {
            tracing::info!(endpoint = %config.ollama.endpoint(), "Connected to Ollama");
            if let Ok(models) = provider.list_models().await {
                for model in models {
                    tracing::info!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!(endpoint = %config.ollama.endpoint(), "Ollama not available, prompts will fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }

    // Initialize tools
    let weather: Arc<dyn WeatherClient> = if config.weather_offline {
        Arc::new(MockWeatherClient::new())
    } else {
        Arc::new(OpenMeteoClient::new()?)
    };
    tracing::info!(source = weather.name(), "Weather source");

    let mut tools = ToolRegistry::new();
    tools.register(WeatherTool::new(weather));
    if let Some(url) = &config.code_interpreter_url {
        tools.register(CodeInterpreterTool::new(url)?);
    }

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(tools)
        .system_prompt(WEATHER_AGENT_PROMPT)
        .model(config.model.clone())
        .temperature(config.temperature)
        .build()?;

    let tool_names: Vec<String> = agent.tools().names().into_iter().map(String::from).collect();

    let mut console = Console::stdio();
    announce(&mut console, config.code_interpreter_url.as_deref(), &tool_names)?;
    console.greet()?;

    let stats = run_session(
        &agent,
        &mut console,
        config.limits,
        EmitterOptions::nested(config.match_nested),
    )
    .await?;

    tracing::info!(turns = stats.turns, failed = stats.failed, "Goodbye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_fatal_message_explains_agent_errors() {
        let error = anyhow::Error::from(AgentError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "stdout closed",
        )));

        assert_eq!(fatal_message(&error), "IO error: stdout closed");
    }

    #[test]
    fn test_fatal_message_keeps_context_chain() {
        let error = "three"
            .parse::<usize>()
            .context("invalid value for AGENT_MAX_ITERATIONS")
            .unwrap_err();

        assert_eq!(
            fatal_message(&error),
            "invalid value for AGENT_MAX_ITERATIONS: invalid digit found in string"
        );
    }
}

//! Interactive Session
//!
//! The read loop: one prompt in, one observed run, one answer out, until the
//! input source is exhausted.

use std::io::Write;

use agent_core::{EmitterOptions, Prompt, Reasoner, Result, Run, RunLimits};
use tokio::io::AsyncBufRead;

use crate::console::{Console, OutputSink};
use crate::dispatch::dispatch;

/// Counters for a finished session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub turns: usize,
    pub answered: usize,
    pub failed: usize,
}

/// Print the startup banner lines
pub fn announce<S>(sink: &mut S, code_interpreter_url: Option<&str>, tool_names: &[String]) -> Result<()>
where
    S: OutputSink + ?Sized,
{
    if let Some(url) = code_interpreter_url {
        sink.write(
            "System: ",
            &format!(
                "The code interpreter tool is enabled. Please ensure that it is running on {}",
                url
            ),
        )?;
    }

    sink.write(
        "System: ",
        &format!("Agent initialized with {} tools.", join_names(tool_names)),
    )
}

/// "a", "a and b", "a, b and c"
fn join_names(names: &[String]) -> String {
    match names {
        [] => "no".into(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Answer prompts from `console` until it runs dry.
///
/// A failed turn is reported as an `Error:` line and the loop moves on. Only
/// console I/O failures end the session early.
pub async fn run_session<R, W>(
    reasoner: &dyn Reasoner,
    console: &mut Console<R, W>,
    limits: RunLimits,
    options: EmitterOptions,
) -> Result<SessionStats>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut stats = SessionStats::default();

    while let Some(prompt) = console.next_prompt().await? {
        stats.turns += 1;
        tracing::info!(turn = stats.turns, "Handling prompt");

        let mut sink_failed = false;
        let outcome = observe_turn(reasoner, console, prompt, limits, options, &mut sink_failed).await;

        match outcome {
            Ok(text) => {
                stats.answered += 1;
                console.write("Agent: ", &text)?;
            }
            Err(e) if sink_failed => return Err(e),
            Err(e) => {
                stats.failed += 1;
                tracing::warn!(turn = stats.turns, error = %e, "Turn failed");
                console.write("Error: ", &e.explain())?;
            }
        }
    }

    tracing::info!(turns = stats.turns, answered = stats.answered, failed = stats.failed, "Session finished");
    Ok(stats)
}

async fn observe_turn<R, W>(
    reasoner: &dyn Reasoner,
    console: &mut Console<R, W>,
    prompt: Prompt,
    limits: RunLimits,
    options: EmitterOptions,
    sink_failed: &mut bool,
) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let output = Run::new(reasoner, prompt, limits)
        .observe(options, |event, meta| {
            dispatch(&mut *console, event, meta).inspect_err(|_| *sink_failed = true)
        })
        .await?;

    tracing::debug!(iterations = output.iterations, retries = output.retries, "Run finished");
    Ok(output.last_message.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{AgentError, Emitter, Event, Message, RunOutput};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Answers from canned weather data and records the limits it was given
    #[derive(Default)]
    struct StubReasoner {
        seen_limits: Mutex<Vec<RunLimits>>,
    }

    #[async_trait]
    impl Reasoner for StubReasoner {
        async fn invoke(&self, prompt: Prompt, limits: RunLimits, emitter: Emitter) -> Result<RunOutput> {
            self.seen_limits.lock().unwrap().push(limits);

            emitter.emit(Event::Start { iteration: 1 });

            if prompt.as_str().contains("Atlantis") {
                let error = AgentError::StepFailed {
                    step: 1,
                    source: Arc::new(AgentError::ToolExecution("unknown place: Atlantis".into())),
                };
                emitter.emit(Event::Error {
                    error: Arc::new(AgentError::ToolExecution("unknown place: Atlantis".into())),
                });
                return Err(error);
            }

            if prompt.as_str().contains("flaky") {
                for attempt in 1..=limits.total_max_retries {
                    emitter.emit(Event::Retry {
                        attempt,
                        reason: "Provider error: timeout".into(),
                    });
                }
                return Err(AgentError::TotalRetriesExceeded {
                    limit: limits.total_max_retries,
                    source: Arc::new(AgentError::Provider("timeout".into())),
                });
            }

            let tool = emitter.child("tool.weather");
            tool.emit(Event::Start { iteration: 1 });
            tool.emit(Event::Success { iteration: 1 });

            emitter.emit(Event::update("tool_output", "15°C"));
            emitter.emit(Event::Success { iteration: 1 });

            Ok(RunOutput {
                last_message: Message::assistant("It is 15°C in Paris."),
                iterations: 1,
                retries: 0,
            })
        }
    }

    async fn transcript(
        reasoner: &StubReasoner,
        input: &'static str,
        options: EmitterOptions,
    ) -> (SessionStats, Vec<String>) {
        let mut console = Console::new(input.as_bytes(), Vec::new());
        let stats = run_session(reasoner, &mut console, RunLimits::default(), options)
            .await
            .unwrap();

        let text = String::from_utf8(console.into_output()).unwrap();
        (stats, text.lines().map(str::to_string).collect())
    }

    #[tokio::test]
    async fn test_weather_question_transcript() {
        let reasoner = StubReasoner::default();
        let (stats, lines) = transcript(&reasoner, "What is the weather in Paris?\n", EmitterOptions::default()).await;

        assert_eq!(
            lines,
            vec![
                "Agent: starting new iteration",
                "Agent(tool_output): 15°C",
                "Agent: success",
                "Agent: It is 15°C in Paris.",
            ]
        );
        assert_eq!(stats, SessionStats { turns: 1, answered: 1, failed: 0 });
    }

    #[tokio::test]
    async fn test_failed_turn_does_not_end_session() {
        let reasoner = StubReasoner::default();
        let (stats, lines) = transcript(
            &reasoner,
            "Weather in Atlantis?\nWeather in Paris?\n",
            EmitterOptions::default(),
        )
        .await;

        assert_eq!(lines[0], "Agent: starting new iteration");
        assert_eq!(lines[1], "Agent: Tool execution error: unknown place: Atlantis");
        assert_eq!(lines[2], "Error: Step 1 failed");
        assert_eq!(lines[3], "  caused by: Tool execution error: unknown place: Atlantis");
        assert_eq!(lines.last().unwrap(), "Agent: It is 15°C in Paris.");
        assert_eq!(stats, SessionStats { turns: 2, answered: 1, failed: 1 });
    }

    #[tokio::test]
    async fn test_retry_exhaustion_prints_no_answer() {
        let reasoner = StubReasoner::default();
        let (stats, lines) = transcript(&reasoner, "flaky weather in Paris?\n", EmitterOptions::default()).await;

        let retries = lines.iter().filter(|l| l.as_str() == "Agent: retrying the action...").count();
        assert_eq!(retries, RunLimits::default().total_max_retries);
        assert!(lines.iter().all(|l| !l.contains("It is 15°C")));
        assert_eq!(lines[lines.len() - 2], "Error: Total retry budget of 10 exhausted");
        assert_eq!(lines[lines.len() - 1], "  caused by: Provider error: timeout");
        assert_eq!(stats, SessionStats { turns: 1, answered: 0, failed: 1 });
    }

    #[tokio::test]
    async fn test_limits_passed_through() {
        let reasoner = StubReasoner::default();
        let limits = RunLimits {
            max_retries_per_step: 1,
            total_max_retries: 2,
            max_iterations: 5,
        };

        let mut console = Console::new("Paris?\nParis again?\n".as_bytes(), Vec::new());
        run_session(&reasoner, &mut console, limits, EmitterOptions::default())
            .await
            .unwrap();

        assert_eq!(*reasoner.seen_limits.lock().unwrap(), vec![limits, limits]);
    }

    #[tokio::test]
    async fn test_nested_events_when_matched() {
        let reasoner = StubReasoner::default();
        let (_, lines) = transcript(&reasoner, "Paris?\n", EmitterOptions::nested(true)).await;

        assert_eq!(
            lines,
            vec![
                "Agent: starting new iteration",
                "Agent: starting new iteration",
                "Agent: success",
                "Agent(tool_output): 15°C",
                "Agent: success",
                "Agent: It is 15°C in Paris.",
            ]
        );
    }

    #[tokio::test]
    async fn test_one_answer_per_prompt_skipping_blanks() {
        let reasoner = StubReasoner::default();
        let (stats, lines) = transcript(&reasoner, "Paris?\n\n   \nParis?\nParis?\nq\nParis?\n", EmitterOptions::default()).await;

        let answers = lines.iter().filter(|l| l.as_str() == "Agent: It is 15°C in Paris.").count();
        assert_eq!(answers, 3);
        assert_eq!(stats.turns, 3);
        assert_eq!(reasoner.seen_limits.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_input_ends_immediately() {
        let reasoner = StubReasoner::default();
        let (stats, lines) = transcript(&reasoner, "", EmitterOptions::default()).await;

        assert_eq!(stats, SessionStats::default());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_announce_lines() {
        let mut console = Console::new("".as_bytes(), Vec::new());
        announce(
            &mut console,
            Some("http://127.0.0.1:50081"),
            &["weather".to_string(), "python".to_string()],
        )
        .unwrap();

        let text = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(
            text,
            "System: The code interpreter tool is enabled. Please ensure that it is running on http://127.0.0.1:50081\n\
             System: Agent initialized with weather and python tools.\n"
        );
    }

    #[test]
    fn test_join_names() {
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(join_names(&names(&[])), "no");
        assert_eq!(join_names(&names(&["weather"])), "weather");
        assert_eq!(join_names(&names(&["a", "b", "c"])), "a, b and c");
    }
}

//! Event Dispatch
//!
//! Turns run events into labeled console lines. Tags without a rendering
//! are dropped silently.

use agent_core::{Event, EventMeta, Result};

use crate::console::OutputSink;

/// `(label, body)` for an event, or `None` when the tag is not shown
pub fn render(event: &Event) -> Option<(String, String)> {
    match event {
        Event::Start { .. } => Some(("Agent: ".into(), "starting new iteration".into())),
        Event::Update { update } => Some((
            format!("Agent({}): ", update.key),
            display_value(&update.value),
        )),
        Event::Retry { .. } => Some(("Agent: ".into(), "retrying the action...".into())),
        Event::Success { .. } => Some(("Agent: ".into(), "success".into())),
        Event::Error { error } => Some(("Agent: ".into(), error.explain())),
        Event::Other { .. } => None,
    }
}

/// Strings as-is, everything else as compact JSON
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Write one event to `sink`
pub fn dispatch<S>(sink: &mut S, event: &Event, meta: &EventMeta) -> Result<()>
where
    S: OutputSink + ?Sized,
{
    tracing::trace!(event = %meta.name, path = %meta.path, depth = meta.depth, "Dispatching event");

    match render(event) {
        Some((label, body)) => sink.write(&label, &body),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{AgentError, Emitter};
    use serde_json::json;

    #[derive(Default)]
    struct Transcript(Vec<String>);

    impl OutputSink for Transcript {
        fn write(&mut self, label: &str, body: &str) -> Result<()> {
            self.0.push(format!("{}{}", label, body));
            Ok(())
        }
    }

    /// Send events through a real emitter so each carries genuine metadata
    fn replay(events: &[Event]) -> Vec<String> {
        let (emitter, mut rx) = Emitter::root("agent");
        let mut transcript = Transcript::default();
        for event in events {
            emitter.emit(event.clone());
            let envelope = rx.try_recv().unwrap();
            dispatch(&mut transcript, &envelope.event, &envelope.meta).unwrap();
        }
        transcript.0
    }

    #[test]
    fn test_transcript_for_one_iteration() {
        let lines = replay(&[
            Event::Start { iteration: 1 },
            Event::update("thought", "I should check the weather"),
            Event::Retry {
                attempt: 1,
                reason: "timeout".into(),
            },
            Event::Success { iteration: 1 },
        ]);

        assert_eq!(
            lines,
            vec![
                "Agent: starting new iteration",
                "Agent(thought): I should check the weather",
                "Agent: retrying the action...",
                "Agent: success",
            ]
        );
    }

    #[test]
    fn test_non_string_values_as_json() {
        let lines = replay(&[Event::update("tool_input", json!({"location": "Paris"}))]);
        assert_eq!(lines, vec![r#"Agent(tool_input): {"location":"Paris"}"#]);
    }

    #[test]
    fn test_error_uses_explanation() {
        let error = AgentError::StepRetriesExceeded {
            step: 2,
            limit: 3,
            source: std::sync::Arc::new(AgentError::Provider("connection refused".into())),
        };
        let expected = format!("Agent: {}", error.explain());

        assert_eq!(replay(&[Event::error(error)]), vec![expected]);
    }

    #[test]
    fn test_unknown_tag_is_silent() {
        let lines = replay(&[Event::Other {
            name: "heartbeat".into(),
            payload: json!({}),
        }]);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_same_event_twice_renders_twice() {
        let event = Event::update("final_answer", "It is 15°C in Paris.");
        let lines = replay(&[event.clone(), event]);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], lines[1]);
        assert_eq!(lines[0], "Agent(final_answer): It is 15°C in Paris.");
    }
}

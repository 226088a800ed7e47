//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern: the model thinks, optionally
//! calls a tool, observes the result and repeats until it answers. Every
//! step is reported through the run's [`Emitter`] and retried within the
//! caller's [`RunLimits`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::emitter::Emitter;
use crate::error::{AgentError, Result};
use crate::event::Event;
use crate::message::{Conversation, Message};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::run::{Prompt, Reasoner, RunLimits, RunOutput};
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template
    pub system_prompt: String,

    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to system prompt
    pub inject_tool_descriptions: bool,

    /// Base delay before a retry; attempt `n` waits `n * retry_backoff`
    pub retry_backoff: Duration,

    /// Token budget of the memory kept between turns
    pub memory_tokens: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
            retry_backoff: Duration::from_millis(250),
            memory_tokens: 8192,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful assistant that reasons step by step.

Before acting, briefly state what you are thinking. When you need a tool,
follow your thought with a JSON block in this exact format:
```tool
{"tool": "tool_name", "arguments": {"arg1": "value1"}}
```

After receiving a tool result, continue reasoning or give the final answer.
When you can answer, reply with the answer only, without a tool block.
Be concise and accurate."#;

/// Outcome of one successful step
enum Step {
    ToolUsed,
    Final(String),
}

/// Retries spent so far in a run
#[derive(Default)]
struct RetryBudget {
    step: usize,
    total: usize,
}

/// ReAct agent with token-bounded memory across turns
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    memory: Mutex<Conversation>,
}

impl Agent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        let memory = Mutex::new(Conversation::with_token_budget(config.memory_tokens));
        Self {
            provider,
            tools,
            config,
            memory,
        }
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Answer a single question with default limits, ignoring progress events
    pub async fn ask(&self, question: &str) -> Result<String> {
        let prompt = Prompt::new(question)
            .ok_or_else(|| AgentError::Other("question is empty".into()))?;
        let output = self.run(prompt, RunLimits::default()).output().await?;
        Ok(output.last_message.content)
    }

    /// Snapshot of the memory carried between turns
    pub async fn memory(&self) -> Conversation {
        self.memory.lock().await.clone()
    }

    async fn remember(&self, prompt: &Prompt, answer: &str) {
        let mut memory = self.memory.lock().await;
        memory.push(Message::user(prompt.as_str()));
        memory.push(Message::assistant(answer));
        memory.truncate_to_fit();
    }

    /// Run one step, retrying retryable failures within the budget
    async fn step_with_retries(
        &self,
        iteration: usize,
        conversation: &mut Conversation,
        limits: &RunLimits,
        budget: &mut RetryBudget,
        emitter: &Emitter,
    ) -> Result<Step> {
        budget.step = 0;

        loop {
            let err = match self.step(conversation, emitter).await {
                Ok(step) => return Ok(step),
                Err(err) => Arc::new(err),
            };

            emitter.emit(Event::Error { error: err.clone() });

            if !err.is_retryable() {
                return Err(AgentError::StepFailed {
                    step: iteration,
                    source: err,
                });
            }
            if budget.step >= limits.max_retries_per_step {
                return Err(AgentError::StepRetriesExceeded {
                    step: iteration,
                    limit: limits.max_retries_per_step,
                    source: err,
                });
            }
            if budget.total >= limits.total_max_retries {
                return Err(AgentError::TotalRetriesExceeded {
                    limit: limits.total_max_retries,
                    source: err,
                });
            }

            budget.step += 1;
            budget.total += 1;
            tracing::warn!(iteration, attempt = budget.step, error = %err, "Retrying step");
            emitter.emit(Event::Retry {
                attempt: budget.step,
                reason: err.to_string(),
            });

            let delay = self
                .config
                .retry_backoff
                .saturating_mul(u32::try_from(budget.step).unwrap_or(u32::MAX));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// One think/act cycle. The conversation is only touched once the model
    /// produced a usable response, so a failed step can be repeated as is.
    async fn step(&self, conversation: &mut Conversation, emitter: &Emitter) -> Result<Step> {
        let completion = self
            .provider
            .complete(conversation.messages(), &self.config.generation)
            .await?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Completion received"
            );
        }

        let content = completion.content.trim();
        if content.is_empty() {
            return Err(AgentError::Parse("model returned an empty response".into()));
        }

        let Some((thought, call)) = parse_tool_call(content) else {
            emitter.emit(Event::update("final_answer", content));
            return Ok(Step::Final(content.to_string()));
        };

        if let Some(thought) = thought {
            emitter.emit(Event::update("thought", thought));
        }
        emitter.emit(Event::update("tool_name", call.name.as_str()));
        emitter.emit(Event::update(
            "tool_input",
            serde_json::Value::Object(call.arguments.clone()),
        ));
        conversation.push(Message::assistant(content));

        tracing::debug!(tool = %call.name, "Executing tool");
        let tool_emitter = emitter.child(&format!("tool.{}", call.name));
        let result = self.execute_tool(&call, &tool_emitter).await;

        emitter.emit(Event::update("tool_output", result.output.as_str()));
        conversation.push(Message::tool(format_tool_result(&result), call.id.clone()));

        Ok(Step::ToolUsed)
    }

    /// Execute a tool call as a nested invocation. Failures become
    /// observations for the model rather than step errors.
    async fn execute_tool(&self, call: &ToolCall, emitter: &Emitter) -> ToolResult {
        emitter.emit(Event::Start { iteration: 1 });

        match self.tools.execute(call).await {
            Ok(mut result) => {
                result.id = call.id.clone();
                if result.success {
                    emitter.emit(Event::Success { iteration: 1 });
                } else {
                    emitter.emit(Event::error(AgentError::ToolExecution(result.output.clone())));
                }
                result
            }
            Err(e) => {
                let output = format!("Error: {}", e);
                emitter.emit(Event::error(e));
                ToolResult {
                    name: call.name.clone(),
                    id: call.id.clone(),
                    success: false,
                    output,
                    data: None,
                }
            }
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

#[async_trait]
impl Reasoner for Agent {
    async fn invoke(&self, prompt: Prompt, limits: RunLimits, emitter: Emitter) -> Result<RunOutput> {
        let mut conversation = self.memory.lock().await.clone();
        conversation.set_system_prompt(self.build_system_prompt());
        conversation.push(Message::user(prompt.as_str()));

        let mut budget = RetryBudget::default();

        for iteration in 1..=limits.max_iterations {
            emitter.emit(Event::Start { iteration });

            let step = self
                .step_with_retries(iteration, &mut conversation, &limits, &mut budget, &emitter)
                .await?;

            emitter.emit(Event::Success { iteration });

            if let Step::Final(answer) = step {
                self.remember(&prompt, &answer).await;
                tracing::debug!(iteration, retries = budget.total, "Run finished");

                return Ok(RunOutput {
                    last_message: Message::assistant(answer),
                    iterations: iteration,
                    retries: budget.total,
                });
            }
        }

        Err(AgentError::MaxIterations(limits.max_iterations))
    }
}

/// Parse a tool call from an LLM response, returning any reasoning text
/// that precedes it.
fn parse_tool_call(content: &str) -> Option<(Option<&str>, ToolCall)> {
    const TOOL_START: &str = "```tool";
    const TOOL_END: &str = "```";

    if let Some(start_idx) = content.find(TOOL_START) {
        let after_marker = &content[start_idx + TOOL_START.len()..];
        if let Some(end_idx) = after_marker.find(TOOL_END) {
            let json_str = after_marker[..end_idx].trim();

            if let Ok(call) = serde_json::from_str::<ToolCall>(json_str) {
                let thought = content[..start_idx].trim();
                let thought = (!thought.is_empty()).then_some(thought);
                return Some((thought, with_call_id(call)));
            }
        }
    }

    parse_inline_tool_call(content)
}

/// Fallback: raw JSON object carrying a "tool" key
fn parse_inline_tool_call(content: &str) -> Option<(Option<&str>, ToolCall)> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }

    let call = serde_json::from_str::<ToolCall>(&content[start..=end]).ok()?;
    let thought = content[..start].trim();
    Some(((!thought.is_empty()).then_some(thought), with_call_id(call)))
}

fn with_call_id(mut call: ToolCall) -> ToolCall {
    if call.id.is_none() {
        call.id = Some(uuid::Uuid::new_v4().to_string());
    }
    call
}

fn format_tool_result(result: &ToolResult) -> String {
    if result.success {
        format!("[Tool '{}' returned]\n{}", result.name, result.output)
    } else {
        format!("[Tool '{}' failed]\n{}", result.name, result.output)
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.config.retry_backoff = backoff;
        self
    }

    pub fn memory_tokens(mut self, tokens: u32) -> Self {
        self.config.memory_tokens = tokens;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}

//! Code Interpreter Tool
//!
//! Runs Python source in an external sandbox service that exposes
//! `POST /v1/execute`.

use std::collections::HashMap;
use std::time::Duration;

use agent_core::{
    tool::ParameterSchema,
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolsError};

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    source_code: &'a str,
    files: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    stdout: String,
    #[serde(default)]
    stderr: String,
    exit_code: i32,
}

impl ExecuteResponse {
    fn render(&self) -> String {
        let mut output = format!("exit code: {}", self.exit_code);
        if !self.stdout.trim().is_empty() {
            output.push_str(&format!("\nstdout:\n{}", self.stdout.trim_end()));
        }
        if !self.stderr.trim().is_empty() {
            output.push_str(&format!("\nstderr:\n{}", self.stderr.trim_end()));
        }
        output
    }
}

pub struct CodeInterpreterTool {
    http: reqwest::Client,
    execute_url: String,
}

impl CodeInterpreterTool {
    pub const NAME: &'static str = "python";

    /// `base_url` is the interpreter service root, e.g. `http://localhost:50081`
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            execute_url: Self::execute_url(base_url),
        })
    }

    fn execute_url(base_url: &str) -> String {
        format!("{}/v1/execute", base_url.trim_end_matches('/'))
    }

    async fn run_code(&self, code: &str) -> Result<ExecuteResponse> {
        let response = self
            .http
            .post(&self.execute_url)
            .json(&ExecuteRequest {
                source_code: code,
                files: HashMap::new(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolsError::Interpreter(format!("{}: {}", status, body)));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Tool for CodeInterpreterTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.into(),
            description: "Run Python code in a sandbox and return its exit code, stdout and stderr. Use print() to show results.".into(),
            parameters: vec![ParameterSchema::string("code", "Python source code to execute", true)],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let code = call.str_arg("code").unwrap_or_default();
        if code.trim().is_empty() {
            return Ok(ToolResult::failure(Self::NAME, "code must not be empty"));
        }

        tracing::debug!(url = %self.execute_url, bytes = code.len(), "Executing code");
        let response = self.run_code(code).await?;
        let output = response.render();

        if response.exit_code == 0 {
            Ok(ToolResult::success(Self::NAME, output))
        } else {
            Ok(ToolResult::failure(Self::NAME, output))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_url() {
        assert_eq!(
            CodeInterpreterTool::execute_url("http://localhost:50081/"),
            "http://localhost:50081/v1/execute"
        );
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(ExecuteRequest {
            source_code: "print(1)",
            files: HashMap::new(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"source_code": "print(1)", "files": {}}));
    }

    #[test]
    fn test_render_response() {
        let response: ExecuteResponse =
            serde_json::from_str(r#"{"stdout": "2\n", "stderr": "", "exit_code": 0, "files": {}}"#).unwrap();
        assert_eq!(response.render(), "exit code: 0\nstdout:\n2");

        let failed: ExecuteResponse =
            serde_json::from_str(r#"{"stderr": "NameError: x\n", "exit_code": 1}"#).unwrap();
        assert_eq!(failed.render(), "exit code: 1\nstderr:\nNameError: x");
    }

    #[tokio::test]
    async fn test_empty_code_is_rejected_without_request() {
        let tool = CodeInterpreterTool::new("http://127.0.0.1:9").unwrap();
        let call: ToolCall = serde_json::from_str(r#"{"tool": "python", "arguments": {"code": "  "}}"#).unwrap();

        let result = tool.execute(&call).await.unwrap();
        assert!(!result.success);
    }
}

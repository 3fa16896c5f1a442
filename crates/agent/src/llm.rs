//! Chat capability boundary.
//!
//! The agent never decides on its own which tool to call: that is the job of the chat
//! capability. [`ChatCapability`] is the seam; [`OpenAiChatClient`] implements it against any
//! OpenAI-compatible `chat/completions` endpoint (OpenAI itself, or Ollama's `/v1` layer).

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use plandesk_core::catalog::AgentDescriptor;
use plandesk_core::config::LlmConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::tools::{ToolDefinition, ToolRegistry};

pub struct ChatRequest<'a> {
    pub agent: &'a AgentDescriptor,
    pub message: &'a str,
    pub tools: &'a ToolRegistry,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub arguments: Value,
    pub result: Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChatResponse {
    pub text: String,
    pub tools_called: Vec<ToolInvocation>,
}

#[async_trait]
pub trait ChatCapability: Send + Sync {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatResponse>;
}

pub fn system_prompt(agent: &AgentDescriptor) -> String {
    format!("You are {}, a {}. {}", agent.name, agent.role, agent.instructions)
}

pub struct OpenAiChatClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
    max_tool_rounds: u32,
}

impl OpenAiChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build llm http client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            max_tool_rounds: config.max_tool_rounds,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn complete(
        &self,
        messages: &[WireMessage],
        tools: &[ToolDefinition],
    ) -> Result<WireMessage> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            tool_choice: (!tools.is_empty()).then_some("auto"),
            tools: (!tools.is_empty()).then_some(tools),
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.context("chat completion request failed")?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("chat completion returned {status}: {error_text}");
        }

        let completion: CompletionResponse =
            response.json().await.context("chat completion response was not valid JSON")?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .context("chat completion response contained no choices")
    }
}

#[async_trait]
impl ChatCapability for OpenAiChatClient {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatResponse> {
        let definitions = request.tools.definitions();
        let mut messages = vec![
            WireMessage::text("system", system_prompt(request.agent)),
            WireMessage::text("user", request.message.to_string()),
        ];
        let mut tools_called = Vec::new();
        let mut rounds = 0;

        loop {
            info!(
                event_name = "llm.request.sent",
                agent = request.agent.name,
                model = %self.model,
                round = rounds,
                message_count = messages.len(),
                "sending chat completion request"
            );
            let reply = self.complete(&messages, &definitions).await?;

            let calls = reply.tool_calls.clone().unwrap_or_default();
            if calls.is_empty() {
                return Ok(ChatResponse { text: reply.content.unwrap_or_default(), tools_called });
            }

            if rounds >= self.max_tool_rounds {
                warn!(
                    event_name = "llm.tool_rounds.exhausted",
                    agent = request.agent.name,
                    max_tool_rounds = self.max_tool_rounds,
                    pending_calls = calls.len(),
                    "model kept requesting tools past the round limit"
                );
                return Ok(ChatResponse { text: reply.content.unwrap_or_default(), tools_called });
            }
            rounds += 1;

            messages.push(reply);
            for call in calls {
                let arguments = call.function.parsed_arguments();
                let result = match request.tools.invoke(&call.function.name, arguments.clone()).await
                {
                    Ok(result) => result,
                    Err(error) => json!({ "error": error.to_string() }),
                };
                debug!(
                    event_name = "agent.tool.invoked",
                    agent = request.agent.name,
                    tool = %call.function.name,
                    call_id = %call.id,
                    "tool invoked on behalf of the model"
                );

                messages.push(WireMessage::tool_result(call.id.clone(), &result));
                tools_called.push(ToolInvocation { tool: call.function.name, arguments, result });
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: WireMessage,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct WireMessage {
    #[serde(default = "assistant_role")]
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn text(role: &str, content: String) -> Self {
        Self { role: role.to_string(), content: Some(content), tool_calls: None, tool_call_id: None }
    }

    fn tool_result(call_id: String, result: &Value) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(result.to_string()),
            tool_calls: None,
            tool_call_id: Some(call_id),
        }
    }
}

fn assistant_role() -> String {
    "assistant".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// OpenAI sends a JSON-encoded string; some compatible servers send the object itself.
    #[serde(default)]
    arguments: Value,
}

impl WireFunctionCall {
    fn parsed_arguments(&self) -> Value {
        let parsed = match &self.arguments {
            Value::String(raw) => serde_json::from_str::<Value>(raw).unwrap_or(Value::Null),
            other => other.clone(),
        };

        if parsed.is_object() {
            parsed
        } else {
            json!({})
        }
    }
}

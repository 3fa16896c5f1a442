use std::sync::Arc;
use std::time::Instant;

use plandesk_core::catalog::{CatalogError, Scenario};
use plandesk_core::errors::{ApplicationError, DomainError};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::llm::{ChatCapability, ChatRequest, ToolInvocation};
use crate::tools::ToolRegistry;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentReply {
    pub scenario: Scenario,
    pub agent: &'static str,
    pub text: String,
    pub tool_results: Vec<ToolInvocation>,
}

/// Either nothing was submitted, or the agent answered.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Idle,
    Responded(AgentReply),
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    UnknownScenario(#[from] CatalogError),
    #[error("chat capability failed: {0:#}")]
    Chat(anyhow::Error),
}

impl From<RuntimeError> for ApplicationError {
    fn from(value: RuntimeError) -> Self {
        match value {
            RuntimeError::UnknownScenario(error) => Self::Domain(DomainError::from(error)),
            RuntimeError::Chat(error) => Self::Integration(format!("{error:#}")),
        }
    }
}

pub struct AgentRuntime {
    chat: Arc<dyn ChatCapability>,
}

impl AgentRuntime {
    pub fn new(chat: Arc<dyn ChatCapability>) -> Self {
        Self { chat }
    }

    pub async fn run(
        &self,
        scenario: &str,
        message: &str,
        correlation_id: &str,
    ) -> Result<RunOutcome, RuntimeError> {
        // Whitespace-only input carries no question for the agent, so it counts as empty
        // instead of spending a chat round trip.
        if scenario.is_empty() || message.trim().is_empty() {
            info!(
                event_name = "agent.run.idle",
                correlation_id = %correlation_id,
                "empty scenario or message, nothing to send"
            );
            return Ok(RunOutcome::Idle);
        }

        let scenario: Scenario = scenario.parse()?;
        let agent = scenario.descriptor();
        let tools = ToolRegistry::for_agent(agent);

        info!(
            event_name = "agent.run.started",
            correlation_id = %correlation_id,
            scenario = %scenario,
            agent = agent.name,
            message_chars = message.chars().count(),
            "forwarding customer message to agent"
        );
        let started = Instant::now();

        let response = self
            .chat
            .chat(ChatRequest { agent, message, tools: &tools })
            .await
            .map_err(RuntimeError::Chat)?;

        info!(
            event_name = "agent.run.completed",
            correlation_id = %correlation_id,
            scenario = %scenario,
            agent = agent.name,
            tools_called = response.tools_called.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "agent response received"
        );

        Ok(RunOutcome::Responded(AgentReply {
            scenario,
            agent: agent.name,
            text: response.text,
            tool_results: response.tools_called,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use plandesk_core::catalog::{CatalogError, Scenario};
    use plandesk_core::errors::{ApplicationError, DomainError};
    use serde_json::json;

    use super::{AgentRuntime, RunOutcome, RuntimeError};
    use crate::llm::{ChatCapability, ChatRequest, ChatResponse, ToolInvocation};

    /// Calls every tool the agent owns with a fixed profile, in registry order.
    #[derive(Default)]
    struct ScriptedChat {
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, Vec<&'static str>)>>,
    }

    #[async_trait]
    impl ChatCapability for ScriptedChat {
        async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .map_err(|_| anyhow!("lock poisoned"))?
                .push((request.agent.name.to_string(), request.tools.names()));

            let arguments = json!({ "current_plan": "150 Mbps", "plan": "Gigabit Extra" });
            let mut tools_called = Vec::new();
            for name in request.tools.names() {
                let result = request.tools.invoke(name, arguments.clone()).await?;
                tools_called.push(ToolInvocation {
                    tool: name.to_string(),
                    arguments: arguments.clone(),
                    result,
                });
            }

            Ok(ChatResponse { text: format!("echo: {}", request.message), tools_called })
        }
    }

    struct FailingChat;

    #[async_trait]
    impl ChatCapability for FailingChat {
        async fn chat(&self, _request: ChatRequest<'_>) -> Result<ChatResponse> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn empty_input_is_a_silent_no_op() {
        let chat = Arc::new(ScriptedChat::default());
        let runtime = AgentRuntime::new(chat.clone());

        assert_eq!(runtime.run("support", "", "req-1").await.expect("idle"), RunOutcome::Idle);
        assert_eq!(runtime.run("support", "   \n", "req-2").await.expect("idle"), RunOutcome::Idle);
        assert_eq!(runtime.run("", "hello", "req-3").await.expect("idle"), RunOutcome::Idle);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_scenario_fails_before_calling_chat() {
        let chat = Arc::new(ScriptedChat::default());
        let runtime = AgentRuntime::new(chat.clone());

        let error = runtime.run("marketing", "hello", "req-4").await.expect_err("should fail");
        assert!(matches!(
            error,
            RuntimeError::UnknownScenario(CatalogError::NotFound(ref key)) if key == "marketing"
        ));
        assert_eq!(
            ApplicationError::from(error),
            ApplicationError::Domain(DomainError::UnknownScenario("marketing".to_string()))
        );
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scenario_label_selects_matching_agent_and_tools() {
        let chat = Arc::new(ScriptedChat::default());
        let runtime = AgentRuntime::new(chat.clone());

        let outcome = runtime.run("Billing", "my bill is high", "req-5").await.expect("reply");
        let RunOutcome::Responded(reply) = outcome else {
            panic!("expected a response");
        };

        assert_eq!(reply.scenario, Scenario::Billing);
        assert_eq!(reply.agent, "BillingAgent");
        assert_eq!(reply.text, "echo: my bill is high");
        assert_eq!(reply.tool_results.len(), 1);
        assert_eq!(reply.tool_results[0].tool, "recommend_plan");
        assert_eq!(reply.tool_results[0].result["price"], "$89.99/month");

        let seen = chat.seen.lock().expect("seen lock");
        assert_eq!(seen.as_slice(), &[("BillingAgent".to_string(), vec!["recommend_plan"])]);
    }

    #[tokio::test]
    async fn tool_results_keep_call_order() {
        let runtime = AgentRuntime::new(Arc::new(ScriptedChat::default()));

        let RunOutcome::Responded(reply) =
            runtime.run("sales", "upgrade me", "req-6").await.expect("reply")
        else {
            panic!("expected a response");
        };

        let tools: Vec<&str> = reply.tool_results.iter().map(|call| call.tool.as_str()).collect();
        assert_eq!(tools, vec!["recommend_plan", "submit_order"]);
        assert_eq!(reply.tool_results[1].result["plan"], "Gigabit Extra");
    }

    #[tokio::test]
    async fn chat_failures_propagate_as_integration_errors() {
        let runtime = AgentRuntime::new(Arc::new(FailingChat));

        let error = runtime.run("support", "hello", "req-7").await.expect_err("should fail");
        assert!(matches!(error, RuntimeError::Chat(_)));
        assert!(matches!(
            ApplicationError::from(error),
            ApplicationError::Integration(ref message) if message.contains("connection refused")
        ));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let idle = serde_json::to_value(RunOutcome::Idle).expect("serialize");
        assert_eq!(idle, json!({ "status": "idle" }));
    }
}

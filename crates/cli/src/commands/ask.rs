use std::sync::Arc;

use plandesk_agent::llm::OpenAiChatClient;
use plandesk_agent::runtime::{AgentRuntime, RunOutcome};
use plandesk_core::config::{AppConfig, LoadOptions};
use plandesk_core::errors::ApplicationError;

use crate::commands::{CommandResult, EXIT_CHAT};

pub fn run(options: &LoadOptions, scenario: &str, message: &str) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            let error = ApplicationError::Configuration(error.to_string());
            return CommandResult::from_application_error("ask", &error);
        }
    };

    let client = match OpenAiChatClient::new(&config.llm) {
        Ok(client) => client,
        Err(error) => {
            let error = ApplicationError::Integration(format!("{error:#}"));
            return CommandResult::from_application_error("ask", &error);
        }
    };
    let runtime = AgentRuntime::new(Arc::new(client));

    let async_runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_CHAT,
            )
        }
    };

    let correlation_id = uuid::Uuid::new_v4().to_string();
    let outcome = async_runtime.block_on(runtime.run(scenario, message, &correlation_id));

    match outcome {
        Ok(RunOutcome::Idle) => {
            CommandResult::success("ask", "nothing to send: scenario or message was empty")
        }
        Ok(RunOutcome::Responded(reply)) => {
            let summary = format!("{} replied with {} tool call(s)", reply.agent, reply.tool_results.len());
            match serde_json::to_value(&reply) {
                Ok(data) => CommandResult::success_with_data("ask", summary, Some(data)),
                Err(error) => {
                    CommandResult::failure("ask", "serialization", error.to_string(), EXIT_CHAT)
                }
            }
        }
        Err(error) => CommandResult::from_application_error("ask", &ApplicationError::from(error)),
    }
}

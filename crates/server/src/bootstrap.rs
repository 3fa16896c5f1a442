use std::sync::Arc;

use plandesk_agent::{llm::OpenAiChatClient, runtime::AgentRuntime};
use plandesk_core::config::{AppConfig, ConfigError};
use plandesk_core::errors::ApplicationError;
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub chat_endpoint: String,
    pub agent_runtime: Arc<AgentRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("chat client initialization failed: {0:#}")]
    ChatClient(anyhow::Error),
}

impl From<BootstrapError> for ApplicationError {
    fn from(value: BootstrapError) -> Self {
        Self::Configuration(value.to_string())
    }
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        llm_provider = config.llm.provider.as_str(),
        llm_model = %config.llm.model,
        "starting application bootstrap"
    );

    let client = OpenAiChatClient::new(&config.llm).map_err(BootstrapError::ChatClient)?;
    let chat_endpoint = client.endpoint().to_string();
    info!(
        event_name = "system.bootstrap.chat_client_ready",
        correlation_id = "bootstrap",
        chat_endpoint = %chat_endpoint,
        "chat client initialized"
    );

    Ok(Application {
        config,
        chat_endpoint,
        agent_runtime: Arc::new(AgentRuntime::new(Arc::new(client))),
    })
}

pub fn powered_by(config: &AppConfig) -> String {
    format!("Powered by {} · {}", config.llm.provider.as_str(), config.llm.model)
}

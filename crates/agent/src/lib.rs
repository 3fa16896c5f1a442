//! Agent runtime - routes a customer message to the selected agent
//!
//! This crate connects the static catalog in `plandesk-core` to an external chat capability:
//! - Resolves the scenario to its `AgentDescriptor`
//! - Builds the agent's tool registry (`recommend_plan`, `submit_order`)
//! - Forwards the message and tools to the chat capability
//! - Returns the reply text plus one structured result per tool call
//!
//! # Key Types
//!
//! - `AgentRuntime` - request driver (see `runtime` module)
//! - `ChatCapability` - pluggable trait for the LLM engine, with `OpenAiChatClient` as the
//!   OpenAI-compatible implementation
//! - `ToolRegistry` - the tools a single agent may call
//!
//! # Safety Principle
//!
//! The LLM decides whether to call a tool, never what the tool returns. Recommendations and
//! order confirmations always come from the deterministic functions in the core.

pub mod llm;
pub mod runtime;
pub mod tools;

pub use llm::{ChatCapability, ChatRequest, ChatResponse, OpenAiChatClient, ToolInvocation};
pub use runtime::{AgentReply, AgentRuntime, RunOutcome, RuntimeError};
pub use tools::ToolRegistry;

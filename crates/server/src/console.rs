//! Customer-message console.
//!
//! HTML Endpoints:
//! - `GET  /`                - scenario selector and message box
//! - `POST /run`             - run the selected agent and render its reply
//!
//! JSON API Endpoints:
//! - `POST /api/v1/chat`     - run an agent, returns the `RunOutcome`
//! - `GET  /api/v1/agents`   - list the agent catalog

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use plandesk_agent::runtime::{AgentReply, AgentRuntime, RunOutcome};
use plandesk_core::catalog::{Catalog, Scenario, ToolName};
use plandesk_core::errors::{ApplicationError, InterfaceError};
use pulldown_cmark::{html, Event, Options, Parser};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tera::{Context, Tera};
use tracing::{error, warn};
use uuid::Uuid;

const CONSOLE_TEMPLATE: &str = "console.html";
const PAGE_TITLE: &str = "Business AI Sales Assistant";

#[derive(Clone)]
pub struct ConsoleState {
    runtime: Arc<AgentRuntime>,
    templates: Arc<Tera>,
    powered_by: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunForm {
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatApiRequest {
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub correlation_id: String,
}

#[derive(Debug, Serialize)]
pub struct AgentSummary {
    pub key: &'static str,
    pub label: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub instructions: &'static str,
    pub tools: &'static [ToolName],
}

fn init_templates() -> Arc<Tera> {
    let mut tera = Tera::default();
    if let Err(e) =
        tera.add_raw_template(CONSOLE_TEMPLATE, include_str!("../templates/console.html"))
    {
        warn!(error = %e, "failed to register console template");
    }
    Arc::new(tera)
}

pub fn router(runtime: Arc<AgentRuntime>, powered_by: impl Into<String>) -> Router {
    Router::new()
        .route("/", get(console_page))
        .route("/run", post(run_agent_page))
        .route("/api/v1/chat", post(run_agent_api))
        .route("/api/v1/agents", get(list_agents))
        .with_state(ConsoleState {
            runtime,
            templates: init_templates(),
            powered_by: powered_by.into(),
        })
}

// ---------------------------------------------------------------------------
// HTML Handlers
// ---------------------------------------------------------------------------

async fn console_page(
    State(state): State<ConsoleState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    render_console(&state, &RunForm::default(), None, None).map(Html)
}

async fn run_agent_page(
    State(state): State<ConsoleState>,
    Form(form): Form<RunForm>,
) -> Result<(StatusCode, Html<String>), (StatusCode, Html<String>)> {
    let correlation_id = Uuid::new_v4().to_string();

    match state.runtime.run(&form.scenario, &form.message, &correlation_id).await {
        Ok(RunOutcome::Idle) => {
            render_console(&state, &form, None, None).map(|page| (StatusCode::OK, Html(page)))
        }
        Ok(RunOutcome::Responded(reply)) => render_console(&state, &form, Some(&reply), None)
            .map(|page| (StatusCode::OK, Html(page))),
        Err(run_error) => {
            let interface = ApplicationError::from(run_error).into_interface(correlation_id);
            log_interface_error(&interface);
            let status = status_for(&interface);
            render_console(&state, &form, None, Some(&interface)).map(|page| (status, Html(page)))
        }
    }
}

fn render_console(
    state: &ConsoleState,
    form: &RunForm,
    reply: Option<&AgentReply>,
    failure: Option<&InterfaceError>,
) -> Result<String, (StatusCode, Html<String>)> {
    let selected = form
        .scenario
        .parse::<Scenario>()
        .map(|scenario| scenario.key())
        .unwrap_or(Scenario::Support.key());

    let scenarios: Vec<serde_json::Value> = Scenario::ALL
        .iter()
        .map(|scenario| json!({ "key": scenario.key(), "label": scenario.label() }))
        .collect();

    let reply = reply.map(|reply| {
        let tools: Vec<serde_json::Value> = reply
            .tool_results
            .iter()
            .map(|call| {
                json!({
                    "name": call.tool,
                    "result": serde_json::to_string_pretty(&call.result)
                        .unwrap_or_else(|_| call.result.to_string()),
                })
            })
            .collect();

        json!({
            "agent": reply.agent,
            "text_html": markdown_to_html(&reply.text),
            "tools": tools,
        })
    });

    let failure_correlation_id = failure.map(|failure| failure.correlation_id().to_string());
    let failure = failure.map(|failure| {
        json!({
            "message": failure.user_message(),
            "correlation_id": failure.correlation_id(),
        })
    });

    let mut context = Context::new();
    context.insert("title", PAGE_TITLE);
    context.insert("powered_by", &state.powered_by);
    context.insert("scenarios", &scenarios);
    context.insert("selected", selected);
    context.insert("message", &form.message);
    context.insert("reply", &reply);
    context.insert("error", &failure);

    state.templates.render(CONSOLE_TEMPLATE, &context).map_err(|e| {
        let correlation_id =
            failure_correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let interface = InterfaceError::Internal { message: format!("{e:?}"), correlation_id };
        error!(
            event_name = "console.render.failed",
            correlation_id = %interface.correlation_id(),
            error = %interface,
            "console template failed"
        );
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!(
                "<h1>{}</h1><p>correlation id: {}</p>",
                interface.user_message(),
                interface.correlation_id()
            )),
        )
    })
}

/// Render agent markdown to HTML. Raw HTML from the model is shown as text.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

// ---------------------------------------------------------------------------
// JSON API Handlers
// ---------------------------------------------------------------------------

async fn run_agent_api(
    State(state): State<ConsoleState>,
    Json(body): Json<ChatApiRequest>,
) -> Result<Json<RunOutcome>, (StatusCode, Json<ApiError>)> {
    let correlation_id = Uuid::new_v4().to_string();

    state.runtime.run(&body.scenario, &body.message, &correlation_id).await.map(Json).map_err(
        |run_error| {
            let interface = ApplicationError::from(run_error).into_interface(correlation_id);
            log_interface_error(&interface);
            (
                status_for(&interface),
                Json(ApiError {
                    error: interface.to_string(),
                    correlation_id: interface.correlation_id().to_string(),
                }),
            )
        },
    )
}

async fn list_agents() -> Json<Vec<AgentSummary>> {
    let agents = Catalog::descriptors()
        .map(|(scenario, agent)| AgentSummary {
            key: scenario.key(),
            label: scenario.label(),
            name: agent.name,
            role: agent.role,
            instructions: agent.instructions,
            tools: agent.tools,
        })
        .collect();
    Json(agents)
}

fn status_for(interface: &InterfaceError) -> StatusCode {
    match interface {
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_interface_error(interface: &InterfaceError) {
    warn!(
        event_name = "console.run.failed",
        correlation_id = %interface.correlation_id(),
        error = %interface,
        "agent run failed"
    );
}

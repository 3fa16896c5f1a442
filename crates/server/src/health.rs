use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use plandesk_core::catalog::{Catalog, Scenario};
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    chat_endpoint: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub checked_at: String,
}

pub fn router(chat_endpoint: impl Into<String>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(HealthState { chat_endpoint: chat_endpoint.into() })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check();
    let ready = catalog.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: format!("plandesk-server forwarding to {}", state.chat_endpoint),
        },
        catalog,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn catalog_check() -> HealthCheck {
    let unresolved: Vec<&str> = Scenario::ALL
        .iter()
        .filter(|scenario| {
            Catalog::lookup(scenario.key()).map(|agent| agent.tools.is_empty()).unwrap_or(true)
        })
        .map(|scenario| scenario.key())
        .collect();

    if unresolved.is_empty() {
        HealthCheck {
            status: "ready",
            detail: format!("{} agents configured", Scenario::ALL.len()),
        }
    } else {
        HealthCheck {
            status: "degraded",
            detail: format!("agents without tools: {}", unresolved.join(", ")),
        }
    }
}

use plandesk_core::catalog::Catalog;
use serde_json::{json, Value};

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let agents: Vec<Value> = Catalog::descriptors()
        .map(|(scenario, agent)| {
            json!({
                "scenario": scenario.key(),
                "label": scenario.label(),
                "name": agent.name,
                "role": agent.role,
                "instructions": agent.instructions,
                "tools": agent.tools,
            })
        })
        .collect();

    let summary = format!("{} agents configured", agents.len());
    CommandResult::success_with_data("agents", summary, Some(Value::Array(agents)))
}

use plandesk_agent::tools::{builtin, Tool};
use plandesk_core::catalog::ToolName;
use plandesk_core::errors::{ApplicationError, DomainError};
use serde_json::{Map, Value};

use crate::commands::{CommandResult, EXIT_INPUT};

/// Invoke a tool function directly, bypassing the chat capability.
pub fn run(tool: &str, input: Option<&str>) -> CommandResult {
    let tool = match tool.parse::<ToolName>() {
        Ok(tool) => tool,
        Err(error) => {
            let error = ApplicationError::from(DomainError::from(error));
            return CommandResult::from_application_error("tool", &error);
        }
    };

    let input = match parse_input(input) {
        Ok(input) => input,
        Err(message) => return CommandResult::failure("tool", "invalid_input", message, EXIT_INPUT),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "tool",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_INPUT,
            )
        }
    };

    let handler = builtin(tool);
    match runtime.block_on(handler.execute(input)) {
        Ok(result) => CommandResult::success_with_data("tool", tool.as_str(), Some(result)),
        Err(error) => CommandResult::failure("tool", "tool_failure", format!("{error:#}"), EXIT_INPUT),
    }
}

fn parse_input(input: Option<&str>) -> Result<Value, String> {
    let Some(raw) = input else {
        return Ok(Value::Object(Map::new()));
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(format!("--input must be a JSON object, got `{other}`")),
        Err(error) => Err(format!("--input must be a JSON object: {error}")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_input;

    #[test]
    fn parse_input_defaults_to_empty_object() {
        assert_eq!(parse_input(None), Ok(json!({})));
        assert_eq!(parse_input(Some(r#"{"plan":"x"}"#)), Ok(json!({ "plan": "x" })));
    }

    #[test]
    fn parse_input_rejects_non_objects() {
        for raw in ["[1]", "\"150 Mbps\"", "42", "null"] {
            let error = parse_input(Some(raw)).expect_err("non-object input should be rejected");
            assert!(error.starts_with("--input must be a JSON object"), "{raw}: {error}");
        }
    }
}

use std::env;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use plandesk_cli::commands::{agents, ask, config, doctor, tool};
use plandesk_core::config::{ConfigOverrides, LoadOptions};
use serde_json::{json, Value};

#[test]
fn agents_lists_three_scenarios_in_selector_order() {
    let result = agents::run();
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "agents");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["message"], "3 agents configured");

    let labels: Vec<&str> = payload["data"]
        .as_array()
        .expect("agent list")
        .iter()
        .filter_map(|agent| agent["label"].as_str())
        .collect();
    assert_eq!(labels, vec!["Support", "Billing", "Sales"]);
    assert_eq!(payload["data"][1]["tools"], json!(["recommend_plan"]));
}

#[test]
fn tool_recommend_plan_returns_upgrade_for_150_mbps() {
    let result = tool::run("recommend_plan", Some(r#"{"current_plan": "150 Mbps"}"#));
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(
        payload["data"],
        json!({
            "recommended_plan": "Gigabit Extra (1.25 Gbps)",
            "price": "$89.99/month",
            "bonus": "Includes SecurityEdge™"
        })
    );
}

#[test]
fn tool_recommend_plan_defaults_to_no_better_plan() {
    let result = tool::run("recommend_plan", None);
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"], json!({ "message": "No better plan available." }));
}

#[test]
fn tool_submit_order_echoes_plan() {
    let result = tool::run("submit_order", Some(r#"{"plan": "Gigabit Extra"}"#));
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(
        payload["data"],
        json!({
            "status": "Order Submitted",
            "plan": "Gigabit Extra",
            "confirmation": "You will receive an email shortly."
        })
    );
}

#[test]
fn tool_rejects_unknown_names_and_bad_json() {
    let unknown = tool::run("cancel_order", None);
    assert_eq!(unknown.exit_code, 3);
    let payload = parse_payload(&unknown.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "unknown_tool");

    let malformed = tool::run("submit_order", Some("{plan:"));
    assert_eq!(malformed.exit_code, 3);
    assert_eq!(parse_payload(&malformed.output)["error_class"], "invalid_input");
}

#[test]
fn tool_rejects_json_that_is_not_an_object() {
    for raw in ["[1]", r#""150 Mbps""#] {
        let result = tool::run("recommend_plan", Some(raw));
        assert_eq!(result.exit_code, 3, "input {raw} should be rejected");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_input");
        assert!(payload.get("data").is_none());
    }
}

#[test]
fn ask_with_empty_message_is_a_no_op() {
    with_env(&[], || {
        let result = ask::run(&local_options(), "support", "   ");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["status"], "ok");
        assert!(payload.get("data").is_none());
    });
}

#[test]
fn ask_with_unknown_scenario_fails_with_input_code() {
    with_env(&[], || {
        let result = ask::run(&local_options(), "marketing", "hello");
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "unknown_scenario");
        assert!(payload["message"].as_str().unwrap_or_default().contains("marketing"));
    });
}

#[test]
fn ask_returns_config_failure_without_openai_key() {
    with_env(&[("PLANDESK_LLM_PROVIDER", "openai")], || {
        let result = ask::run(&local_options(), "sales", "upgrade me");
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn config_reports_env_source_and_redacts_api_key() {
    with_env(
        &[
            ("PLANDESK_LLM_PROVIDER", "openai"),
            ("PLANDESK_LLM_API_KEY", "sk-very-secret"),
            ("PLANDESK_LOG_LEVEL", "debug"),
        ],
        || {
            let result = config::run(&local_options());
            assert_eq!(result.exit_code, 0);
            let output = result.output;
            assert!(output.contains("- llm.provider = openai (source: env (PLANDESK_LLM_PROVIDER))"));
            assert!(output.contains("- llm.api_key = <redacted>"));
            assert!(output.contains("- logging.level = debug (source: env (PLANDESK_LOG_LEVEL))"));
            assert!(output.contains("- server.port = 8080 (source: default)"));
            assert!(!output.contains("sk-very-secret"));
        },
    );
}

#[test]
fn doctor_skips_endpoint_check_when_config_is_invalid() {
    with_env(&[("PLANDESK_LLM_TIMEOUT_SECS", "0")], || {
        let result = doctor::run(&local_options(), true);
        assert_eq!(result.exit_code, 2, "invalid config should fail with the config code");

        let report: Value =
            serde_json::from_str(&result.output).expect("doctor output should be JSON");

        assert_eq!(report["overall_status"], "fail");
        let checks = report["checks"].as_array().expect("checks");
        assert_eq!(checks[0]["name"], "catalog_integrity");
        assert_eq!(checks[0]["status"], "pass");
        assert_eq!(checks[1]["name"], "config_validation");
        assert_eq!(checks[1]["status"], "fail");
        assert_eq!(checks[2]["name"], "llm_endpoint");
        assert_eq!(checks[2]["status"], "skipped");
    });
}

#[test]
fn doctor_reports_unreachable_endpoint_with_chat_code() {
    with_env(&[("PLANDESK_LLM_BASE_URL", "http://127.0.0.1:9/v1")], || {
        let result = doctor::run(&local_options(), true);
        assert_eq!(result.exit_code, 4);

        let report: Value =
            serde_json::from_str(&result.output).expect("doctor output should be JSON");
        assert_eq!(report["checks"][1]["status"], "pass");
        assert_eq!(report["checks"][2]["name"], "llm_endpoint");
        assert_eq!(report["checks"][2]["status"], "fail");
    });
}

#[test]
fn config_with_invalid_values_fails_with_config_code() {
    with_env(&[("PLANDESK_LLM_TIMEOUT_SECS", "0")], || {
        let result = config::run(&local_options());
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["error_class"], "config_validation");
        assert!(payload["message"].as_str().unwrap_or_default().contains("llm.timeout_secs"));
    });
}

#[test]
fn config_attributes_model_to_command_line_override() {
    with_env(&[("PLANDESK_LLM_MODEL", "from-env")], || {
        let options = LoadOptions {
            overrides: ConfigOverrides {
                llm_model: Some("qwen2.5".to_string()),
                ..ConfigOverrides::default()
            },
            ..local_options()
        };

        let output = config::run(&options).output;
        assert!(output.contains("- llm.model = qwen2.5 (source: override (--model))"));
    });
}

#[test]
fn explicit_missing_config_file_is_a_config_failure() {
    with_env(&[], || {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("does-not-exist/custom.toml")),
            require_file: true,
            ..LoadOptions::default()
        };

        let result = ask::run(&options, "support", "hello");
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
    });
}

fn local_options() -> LoadOptions {
    LoadOptions {
        config_path: Some(PathBuf::from("does-not-exist/plandesk.toml")),
        ..LoadOptions::default()
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "PLANDESK_LLM_PROVIDER",
        "PLANDESK_LLM_API_KEY",
        "PLANDESK_LLM_BASE_URL",
        "PLANDESK_LLM_MODEL",
        "PLANDESK_LLM_TIMEOUT_SECS",
        "PLANDESK_LLM_MAX_TOOL_ROUNDS",
        "PLANDESK_SERVER_BIND_ADDRESS",
        "PLANDESK_SERVER_PORT",
        "PLANDESK_LOGGING_LEVEL",
        "PLANDESK_LOGGING_FORMAT",
        "PLANDESK_LOG_LEVEL",
        "PLANDESK_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}

use std::env;
use std::fs;
use std::path::Path;

use plandesk_core::config::{resolve_config_path, AppConfig, LoadOptions};
use plandesk_core::errors::ApplicationError;
use toml::Value;

use crate::commands::CommandResult;

struct Field<'a> {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: &'a str,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            let error = ApplicationError::Configuration(error.to_string());
            return CommandResult::from_application_error("config", &error);
        }
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let timeout_secs = config.llm.timeout_secs.to_string();
    let max_tool_rounds = config.llm.max_tool_rounds.to_string();
    let port = config.server.port.to_string();
    let log_format = format!("{:?}", config.logging.format).to_ascii_lowercase();
    let api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };

    let fields = [
        Field {
            key_path: "llm.provider",
            env_keys: &["PLANDESK_LLM_PROVIDER"],
            value: config.llm.provider.as_str(),
        },
        Field { key_path: "llm.api_key", env_keys: &["PLANDESK_LLM_API_KEY"], value: api_key },
        Field {
            key_path: "llm.base_url",
            env_keys: &["PLANDESK_LLM_BASE_URL"],
            value: &config.llm.base_url,
        },
        Field { key_path: "llm.model", env_keys: &["PLANDESK_LLM_MODEL"], value: &config.llm.model },
        Field {
            key_path: "llm.timeout_secs",
            env_keys: &["PLANDESK_LLM_TIMEOUT_SECS"],
            value: &timeout_secs,
        },
        Field {
            key_path: "llm.max_tool_rounds",
            env_keys: &["PLANDESK_LLM_MAX_TOOL_ROUNDS"],
            value: &max_tool_rounds,
        },
        Field {
            key_path: "server.bind_address",
            env_keys: &["PLANDESK_SERVER_BIND_ADDRESS"],
            value: &config.server.bind_address,
        },
        Field { key_path: "server.port", env_keys: &["PLANDESK_SERVER_PORT"], value: &port },
        Field {
            key_path: "logging.level",
            env_keys: &["PLANDESK_LOGGING_LEVEL", "PLANDESK_LOG_LEVEL"],
            value: &config.logging.level,
        },
        Field {
            key_path: "logging.format",
            env_keys: &["PLANDESK_LOGGING_FORMAT", "PLANDESK_LOG_FORMAT"],
            value: &log_format,
        },
    ];

    let mut lines = vec!["effective config (source precedence: override > env > file > default):".to_string()];
    for field in &fields {
        if field.key_path == "llm.model" && options.overrides.llm_model.is_some() {
            lines.push(render_line(field.key_path, field.value, "override (--model)".to_string()));
            continue;
        }
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, field.value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::{contains_path, render_line};

    #[test]
    fn contains_path_walks_nested_tables() {
        let doc: toml::Value = "[llm]\nmodel = \"x\"\n".parse().expect("toml");
        assert!(contains_path(&doc, "llm.model"));
        assert!(!contains_path(&doc, "llm.base_url"));
        assert!(!contains_path(&doc, "server.port"));
    }

    #[test]
    fn render_line_includes_source() {
        assert_eq!(
            render_line("server.port", "8080", "default".to_string()),
            "- server.port = 8080 (source: default)"
        );
    }
}

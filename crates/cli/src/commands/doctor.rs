use std::time::Duration;

use plandesk_core::catalog::{Catalog, Scenario};
use plandesk_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CHAT, EXIT_CONFIG};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = exit_code(&report);

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

/// The first failing check decides the code: endpoint failures are chat failures, the rest
/// are configuration failures.
fn exit_code(report: &DoctorReport) -> u8 {
    match report.checks.iter().find(|check| check.status == CheckStatus::Fail) {
        None => 0,
        Some(check) if check.name == "llm_endpoint" => EXIT_CHAT,
        Some(_) => EXIT_CONFIG,
    }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = vec![check_catalog()];

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_llm_endpoint(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "llm_endpoint",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog() -> DoctorCheck {
    let broken: Vec<&str> = Scenario::ALL
        .iter()
        .map(|scenario| scenario.key())
        .filter(|key| Catalog::lookup(key).map(|agent| agent.tools.is_empty()).unwrap_or(true))
        .collect();

    if broken.is_empty() {
        DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Pass,
            details: format!("{} scenarios resolve to agents with tools", Scenario::ALL.len()),
        }
    } else {
        DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Fail,
            details: format!("scenarios without usable agents: {}", broken.join(", ")),
        }
    }
}

fn check_llm_endpoint(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "llm_endpoint",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let models_url = format!("{}/models", config.llm.base_url.trim_end_matches('/'));
    let result = runtime.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout_secs.min(10)))
            .build()
            .map_err(|error| format!("failed to build http client: {error}"))?;

        let mut request = client.get(&models_url);
        if let Some(api_key) = &config.llm.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response =
            request.send().await.map_err(|error| format!("llm endpoint unreachable: {error}"))?;
        if !response.status().is_success() {
            return Err(format!("llm endpoint returned {}", response.status()));
        }
        Ok::<(), String>(())
    });

    match result {
        Ok(()) => DoctorCheck {
            name: "llm_endpoint",
            status: CheckStatus::Pass,
            details: format!("reached `{models_url}`"),
        },
        Err(error) => DoctorCheck { name: "llm_endpoint", status: CheckStatus::Fail, details: error },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

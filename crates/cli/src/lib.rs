pub mod commands;

use clap::{Parser, Subcommand};
use plandesk_core::config::{ConfigOverrides, LoadOptions};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "plandesk",
    about = "Plandesk operator CLI",
    long_about = "Route customer messages to the support, billing or sales agent, invoke plan tools directly, and inspect configuration readiness.",
    after_help = "Examples:\n  plandesk ask --scenario sales \"I'm on 150 Mbps, anything faster?\"\n  plandesk tool recommend_plan --input '{\"current_plan\": \"150 Mbps\"}'\n  plandesk doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file path (defaults to plandesk.toml or config/plandesk.toml)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override llm.model for this invocation")]
    model: Option<String>,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            require_file: self.config.is_some(),
            config_path: self.config.clone(),
            overrides: ConfigOverrides { llm_model: self.model.clone(), ..ConfigOverrides::default() },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Send a customer message to the agent for a scenario")]
    Ask {
        #[arg(long, short, default_value = "support", help = "support | billing | sales")]
        scenario: String,
        #[arg(help = "What the customer says")]
        message: String,
    },
    #[command(about = "List the configured agents and their tools")]
    Agents,
    #[command(about = "Invoke a plan tool directly with a JSON argument object")]
    Tool {
        #[arg(help = "recommend_plan | submit_order")]
        name: String,
        #[arg(long, help = "JSON object passed to the tool, defaults to {}")]
        input: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog integrity and LLM endpoint reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    let result = match cli.command {
        Command::Ask { scenario, message } => commands::ask::run(&options, &scenario, &message),
        Command::Agents => commands::agents::run(),
        Command::Tool { name, input } => commands::tool::run(&name, input.as_deref()),
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

use std::process::ExitCode;

fn main() -> ExitCode {
    plandesk_cli::run()
}

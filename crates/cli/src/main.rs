use std::process::ExitCode;

fn main() -> ExitCode {
    replique_cli::run()
}

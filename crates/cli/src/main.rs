use std::process::ExitCode;

fn main() -> ExitCode {
    econnect_cli::run()
}

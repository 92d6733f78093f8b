pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "econnect",
    about = "eConnect operator CLI",
    long_about = "Inspect eConnect configuration, check ERP and SMTP readiness, and preview the zonal manager map.",
    after_help = "Examples:\n  econnect doctor --json\n  econnect config\n  econnect zonal-map --customer \"Acme Pharma\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, ERP reachability, and SMTP readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Build the customer to zonal manager map from the ERP and print it as JSON")]
    ZonalMap {
        #[arg(long, help = "Only print the manager for this customer")]
        customer: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::ZonalMap { customer } => commands::zonal_map::run(customer.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

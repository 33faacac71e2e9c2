#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use std::process;

use s3cli_config::ProviderTable;

use crate::commands::Outcome;
use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_CONFIG: &str = "s3cli_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "s3cli_cli::command";

/// Exit status of `exists` when the object is missing.
const EXIT_NOT_FOUND: i32 = 3;

#[tokio::main]
async fn main() {
    let error = match run().await {
        Ok(Outcome::Missing) => process::exit(EXIT_NOT_FOUND),
        Ok(Outcome::Print(line)) => {
            println!("{line}");
            process::exit(0);
        }
        Ok(Outcome::Done) => process::exit(0),
        Err(error) => error,
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_COMMAND,
            error = %format_args!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<Outcome> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log_build_info();

    let table = ProviderTable::new();
    let config = cli.load_config(&table)?;

    commands::execute(cli.command, &config).await
}

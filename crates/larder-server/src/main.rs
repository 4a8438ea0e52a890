//! # Larder
//!
//! Command-line entry point. Loads configuration, wires the database and
//! cache pools, runs one command, prints its JSON result and closes the
//! pools again.

use clap::Parser;
use larder_config::ConfigLoader;
use larder_core::telemetry::init_tracing;
use larder_core::{ErrorResponse, LarderResult};
use larder_server::cli::Cli;
use larder_server::commands::execute;
use larder_server::di::AppContext;
use larder_server::startup::print_startup_info;
use std::process::ExitCode;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {}", e);
            let response = ErrorResponse::from_error(&e);
            if let Ok(body) = serde_json::to_string_pretty(&response) {
                eprintln!("{body}");
            }
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> LarderResult<()> {
    let config = ConfigLoader::new(&cli.config_dir)?.get().await;
    init_tracing(&config.logging)?;
    print_startup_info(&config);

    let ctx = AppContext::build(&config).await?;
    debug!("Executing {:?}", cli.command);
    let result = execute(cli.command, &ctx).await;
    ctx.shutdown().await;

    let output = serde_json::to_string_pretty(&result?)?;
    println!("{output}");
    Ok(())
}

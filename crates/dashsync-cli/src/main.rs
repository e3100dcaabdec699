mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.quiet);

    match commands::run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error!(
                event = "cli.command_failed",
                command = cli.command.name(),
                exit_code = failure.exit_code(),
                error = %failure
            );
            eprintln!("error: {failure}");
            ExitCode::from(failure.exit_code())
        }
    }
}

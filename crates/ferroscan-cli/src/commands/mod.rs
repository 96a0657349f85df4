mod dedupe;
mod extract;
mod scan;

use std::process::ExitCode;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    match &cli.command {
        Command::Scan(args) => scan::run(args, cli.format, cli.pretty, cli.timeout_ms).await,
        Command::Dedupe(args) => dedupe::run(args),
        Command::Extract(args) => extract::run(args),
    }
}

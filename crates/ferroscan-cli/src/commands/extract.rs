use std::io::{self, Write};
use std::process::ExitCode;

use crate::cli::FileArgs;
use crate::error::CliError;
use crate::symbols_file::extract_first_column;

pub fn run(args: &FileArgs) -> Result<ExitCode, CliError> {
    let symbols = extract_first_column(&args.input)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", symbols.join(" "))?;
    Ok(ExitCode::SUCCESS)
}

use std::io::{self, Write};
use std::process::ExitCode;

use ferroscan_core::universe::dedupe_first_seen;
use tracing::warn;

use crate::cli::FileArgs;
use crate::error::CliError;
use crate::symbols_file::read_symbol_list;

pub fn run(args: &FileArgs) -> Result<ExitCode, CliError> {
    let symbols = read_symbol_list(&args.input)?;
    if symbols.is_empty() {
        warn!(path = %args.input.display(), "no symbols found in file");
        return Ok(ExitCode::SUCCESS);
    }

    let stdout = io::stdout();
    write_report(&mut stdout.lock(), symbols)?;
    Ok(ExitCode::SUCCESS)
}

/// Duplicate report followed by the first-seen unique list.
fn write_report<W: Write>(out: &mut W, symbols: Vec<String>) -> Result<(), CliError> {
    let (unique, duplicates) = dedupe_first_seen(symbols);

    if duplicates.is_empty() {
        writeln!(out, "No duplicates found.")?;
    } else {
        writeln!(out, "Found {} symbols with duplicates:", duplicates.len())?;
        for duplicate in &duplicates {
            writeln!(out, "{} x{}", duplicate.value, duplicate.count)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Deduplicated symbols:")?;
    writeln!(out, "{}", unique.join(" "))?;
    Ok(())
}

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use ferroscan_core::{normalize_batch, ClientConfig, DataClient, Scanner};
use tracing::info;

use crate::cli::{OutputFormat, ScanArgs};
use crate::error::CliError;
use crate::output;
use crate::symbols_file::read_symbol_list;

/// Exit status when no instrument in a non-empty universe produced a record.
const NOTHING_COMPUTED: u8 = 3;

pub async fn run(
    args: &ScanArgs,
    format: OutputFormat,
    pretty: bool,
    timeout_ms: Option<u64>,
) -> Result<ExitCode, CliError> {
    let mut codes = args.symbols.clone();
    if let Some(path) = &args.symbols_file {
        codes.extend(read_symbol_list(path)?);
    }
    if codes.is_empty() {
        return Err(CliError::Input(String::from(
            "no symbols given; pass codes or --symbols-file",
        )));
    }

    let universe = normalize_batch(&codes, &args.exclude, args.mode);
    if !universe.excluded.is_empty() {
        info!(excluded = universe.excluded.len(), "excluded instruments removed");
    }
    if universe.is_empty() {
        return Err(CliError::Input(String::from(
            "no valid symbols left after normalization and exclusion",
        )));
    }

    let mut client_config = ClientConfig::from_env();
    if let Some(timeout_ms) = timeout_ms {
        client_config = client_config.with_timeout(Duration::from_millis(timeout_ms));
    }
    let client = DataClient::with_reqwest(client_config)?;
    let scanner = Scanner::new(&client, args.scan_config())?.with_name_mode(args.names);

    let report = scanner.scan(&universe, &args.filters(), args.sort).await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Table => output::write_table(&mut out, &report, scanner.config())?,
        OutputFormat::Json => output::write_json(&mut out, &report, pretty)?,
    }

    if report.computed == 0 {
        return Ok(ExitCode::from(NOTHING_COMPUTED));
    }
    Ok(ExitCode::SUCCESS)
}

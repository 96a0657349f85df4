//! Readers for local symbol lists.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CliError;

/// First-row cell values treated as a CSV header rather than a symbol.
const HEADER_NAMES: [&str; 4] = ["symbol", "code", "ticker", "stock"];

const BOM: char = '\u{feff}';

/// Read a whitespace-separated symbol file.
pub fn read_symbol_list(path: &Path) -> Result<Vec<String>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_symbol_list(&text))
}

/// Split on whitespace and commas, ignoring an enclosing `[` ... `]`.
pub fn parse_symbol_list(text: &str) -> Vec<String> {
    let trimmed = text.trim_start_matches(BOM).trim();
    let inner = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    inner
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// First column of a CSV file, skipping blanks and a header cell.
pub fn extract_first_column(path: &Path) -> Result<Vec<String>, CliError> {
    let file = File::open(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    extract_first_column_from(file)
}

pub fn extract_first_column_from<R: Read>(reader: R) -> Result<Vec<String>, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut symbols = Vec::new();
    let mut first_value = true;
    for record in reader.records() {
        let record = record?;
        let Some(cell) = record.get(0) else {
            continue;
        };
        let value = cell.trim_start_matches(BOM).trim();
        if value.is_empty() {
            continue;
        }

        if first_value {
            first_value = false;
            if HEADER_NAMES.contains(&value.to_ascii_lowercase().as_str()) {
                continue;
            }
        }
        symbols.push(value.to_owned());
    }

    Ok(symbols)
}

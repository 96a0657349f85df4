use std::io::Write;

use ferroscan_core::{IndicatorRecord, ScanConfig, ScanReport};

use crate::error::CliError;

const NAME_WIDTH: usize = 10;

pub fn write_json<W: Write>(out: &mut W, report: &ScanReport, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, report)?;
    } else {
        serde_json::to_writer(&mut *out, report)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Summary line, then one fixed-width row per surviving record.
pub fn write_table<W: Write>(
    out: &mut W,
    report: &ScanReport,
    config: &ScanConfig,
) -> Result<(), CliError> {
    writeln!(out)?;
    writeln!(out, "{}", report.result.summary())?;
    writeln!(out)?;

    let records = &report.result.records;
    let code_width = records
        .iter()
        .map(|record| record.code.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let atr_window = config.primary_atr_window().unwrap_or_default();

    let header = format!(
        "{:<code_width$} {:<NAME_WIDTH$} {:>7} {:>7} {:>7} {:>7} {:>6} {:>6} {:>5} {:>6} {:>5} {:>5} {:>5} {:>5} {:>6} {:>6}",
        "Code",
        "Name",
        "LC",
        format!("MA{}", config.reference_window),
        format!("MA{:+.0}%", config.pct_offset),
        format!("MA{:+.0}SD", config.z_offset),
        "ΔLC%",
        format!("SD{}", config.volatility_window),
        "Z-SD",
        format!("ATR{atr_window}"),
        "Z-ATR",
        format!("RSI{}", config.rsi_period),
        "D1Y%",
        "D5Y%",
        "P/E",
        "Mgn%",
    );
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(header.chars().count()))?;

    for record in records {
        writeln!(out, "{}", table_row(record, code_width))?;
    }
    Ok(())
}

fn table_row(record: &IndicatorRecord, code_width: usize) -> String {
    let name = record.name.chars().take(NAME_WIDTH).collect::<String>();
    let fundamentals = &record.fundamentals;
    [
        format!("{:<code_width$}", record.code),
        format!("{name:<NAME_WIDTH$}"),
        number(record.latest_close, 7, 3),
        number(record.ma_reference, 7, 3),
        number(record.ma_pct_band, 7, 3),
        number(record.ma_sd_band, 7, 3),
        number(record.delta_pct, 6, 2),
        number(record.volatility, 6, 3),
        number(record.z_sd, 5, 2),
        number(record.atr_primary, 6, 3),
        number(record.z_atr, 5, 2),
        number(record.rsi, 5, 2),
        number(fundamentals.div_yield_1y, 5, 2),
        number(fundamentals.div_yield_5y, 5, 2),
        number(fundamentals.best_pe(), 6, 2),
        number(fundamentals.profit_margin, 6, 2),
    ]
    .join(" ")
}

fn number(value: f64, width: usize, precision: usize) -> String {
    if value.is_finite() {
        format!("{value:>width$.precision$}")
    } else {
        format!("{:>width$}", "nan")
    }
}

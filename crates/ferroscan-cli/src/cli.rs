//! CLI argument definitions for ferroscan.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Fetch history and fundamentals, compute indicators, filter and rank |
//! | `dedupe` | Report duplicate codes in a symbol file and print the unique list |
//! | `extract` | Print the first column of a CSV file as a symbol list |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | env / `20000` | Per-request timeout in ms |
//!
//! # Examples
//!
//! ```bash
//! # SGX codes more than 5% below their 20-day average
//! ferroscan scan --mode sg D05 O39 U11 --delta -5
//!
//! # Symbols from a file, ranked by dividend yield
//! ferroscan scan --symbols-file sgx.txt --mode sg --div 4 --sort div
//!
//! # Crypto with per-record threshold, JSON output
//! ferroscan --format json scan --mode crypto BTC ETH SOL --delta z
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ferroscan_core::{FilterSpec, MarketMode, Metric, NameMode, ScanConfig, Threshold};

/// Ferroscan - moving-average, volatility and fundamentals screener
#[derive(Debug, Parser)]
#[command(
    name = "ferroscan",
    author,
    version,
    about = "Moving-average, volatility and fundamentals screener",
    long_about = "Ferroscan fetches a year of daily history and basic fundamentals for a batch \
of stocks, crypto pairs or indices, computes moving averages, volatility, ATR and RSI, and \
ranks the instruments against optional thresholds.\n\
\n\
Use 'ferroscan <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for scan results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-request timeout in milliseconds (overrides FERROSCAN_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width table preceded by a one-line summary.
    Table,
    /// The full scan report as a JSON object.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan a batch of instruments and rank them against thresholds.
    ///
    /// Every threshold is optional; an absent flag leaves that metric
    /// unfiltered. A threshold <= 0 keeps values at or below it, a
    /// threshold > 0 keeps values strictly above it.
    Scan(ScanArgs),

    /// Report duplicate codes in a whitespace-separated symbol file.
    Dedupe(FileArgs),

    /// Print the first column of a CSV file, space-separated.
    Extract(FileArgs),
}

/// Arguments for the `scan` command.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Instrument codes (e.g. D05 O39 for sg, AAPL for us, BTC for crypto).
    pub symbols: Vec<String>,

    /// File with whitespace-separated codes; an enclosing [ ] is ignored.
    #[arg(long, short = 'f')]
    pub symbols_file: Option<PathBuf>,

    /// Asset class deciding how bare codes map to provider symbols.
    #[arg(long, default_value = "us")]
    pub mode: MarketMode,

    /// Codes to leave out after de-duplication.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Delta% vs MA20 threshold, or 'z' / 'zatr' for Delta% <= the record's own Z.
    #[arg(long, allow_hyphen_values = true)]
    pub delta: Option<Threshold>,

    /// Minimum dividend yield in percent (best of 1Y and 5Y).
    #[arg(long, allow_hyphen_values = true)]
    pub div: Option<f64>,

    /// Z-SD threshold.
    #[arg(long, allow_hyphen_values = true)]
    pub z: Option<f64>,

    /// Z-ATR threshold.
    #[arg(long, allow_hyphen_values = true)]
    pub zatr: Option<f64>,

    /// Maximum RSI.
    #[arg(long, allow_hyphen_values = true)]
    pub rsi: Option<f64>,

    /// RSI slope threshold.
    #[arg(long, allow_hyphen_values = true)]
    pub rsi_slope: Option<f64>,

    /// Maximum P/E (best positive of trailing and forward).
    #[arg(long, allow_hyphen_values = true)]
    pub pe: Option<f64>,

    /// Minimum net profit margin in percent.
    #[arg(long, allow_hyphen_values = true)]
    pub margin: Option<f64>,

    /// Sort metric: delta, z, zatr, rsi, rsi-slope, div, pe, margin, sd, atr.
    #[arg(long, default_value = "delta")]
    pub sort: Metric,

    /// Name lookup: auto (batch then search), search, or none.
    #[arg(long, default_value = "auto")]
    pub names: NameMode,

    /// Chart range code passed to the provider (e.g. 1y, 1mo).
    #[arg(long, default_value = "1y")]
    pub range: String,

    /// Pause after each instrument in milliseconds.
    #[arg(long, default_value_t = 300)]
    pub sleep_ms: u64,

    /// Percentage band offset around MA20.
    #[arg(long, default_value_t = -4.0, allow_hyphen_values = true)]
    pub pct_offset: f64,

    /// Standard-deviation band offset around MA20.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub z_offset: f64,
}

impl ScanArgs {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            range: self.range.clone(),
            pct_offset: self.pct_offset,
            z_offset: self.z_offset,
            delay: Duration::from_millis(self.sleep_ms),
            ..ScanConfig::for_mode(self.mode)
        }
    }

    pub fn filters(&self) -> FilterSpec {
        FilterSpec {
            delta: self.delta,
            div: self.div,
            z: self.z,
            zatr: self.zatr,
            rsi: self.rsi,
            rsi_slope: self.rsi_slope,
            pe: self.pe,
            margin: self.margin,
        }
    }
}

/// Arguments for the file tooling commands.
#[derive(Debug, Args)]
pub struct FileArgs {
    /// Path to the input file.
    #[arg(long, short = 'i')]
    pub input: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferroscan_core::PerRecord;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn scan_accepts_negative_and_per_record_thresholds() {
        let cli = parse(&[
            "ferroscan", "scan", "--mode", "sg", "D05", "O39", "--delta", "-5", "--z", "-1.5",
        ]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.mode, MarketMode::Sg);
        assert_eq!(args.symbols, vec!["D05", "O39"]);
        assert_eq!(args.delta, Some(Threshold::Fixed(-5.0)));
        assert_eq!(args.z, Some(-1.5));

        let cli = parse(&["ferroscan", "scan", "BTC", "--mode", "crypto", "--delta", "zatr"]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.delta, Some(Threshold::PerRecord(PerRecord::ZAtr)));
    }

    #[test]
    fn scan_defaults_build_config_and_empty_filters() {
        let cli = parse(&["ferroscan", "scan", "AAPL"]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        let config = args.scan_config();
        assert_eq!(config.mode, MarketMode::Us);
        assert_eq!(config.range, "1y");
        assert_eq!(config.pct_offset, -4.0);
        assert_eq!(config.delay, Duration::from_millis(300));
        assert_eq!(args.filters(), FilterSpec::default());
        assert_eq!(args.sort, Metric::Delta);
        assert_eq!(args.names, NameMode::Auto);
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn exclude_accepts_comma_lists() {
        let cli = parse(&["ferroscan", "scan", "A", "B", "C", "--exclude", "B,C"]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.exclude, vec!["B", "C"]);
    }

    #[test]
    fn invalid_threshold_and_mode_are_rejected() {
        assert!(Cli::try_parse_from(["ferroscan", "scan", "A", "--delta", "lots"]).is_err());
        assert!(Cli::try_parse_from(["ferroscan", "scan", "A", "--mode", "forex"]).is_err());
        assert!(Cli::try_parse_from(["ferroscan", "scan", "A", "--sort", "volume"]).is_err());
    }

    #[test]
    fn file_commands_take_input_path() {
        let cli = parse(&["ferroscan", "dedupe", "--input", "symbols.txt"]);
        assert!(matches!(
            cli.command,
            Command::Dedupe(FileArgs { input }) if input == PathBuf::from("symbols.txt")
        ));
    }
}

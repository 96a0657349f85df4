use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 20;
const SGX_SUFFIX: &str = ".SI";
const FIAT_PAIR_SUFFIX: &str = "-USD";
const INDEX_PREFIX: char = '^';

/// Provider-canonical market symbol/ticker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol to uppercase.
    ///
    /// Exchange codes may start with a digit (`9CI.SI`) and index symbols
    /// start with `^`, so both are accepted as leading characters.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !(first.is_ascii_alphanumeric() || first == INDEX_PREFIX) {
                return Err(ValidationError::SymbolInvalidStart { ch: first });
            }
        }

        for (index, ch) in normalized.chars().enumerate().skip(1) {
            let valid = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '=';
            if !valid {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

/// Asset-class mode selecting how bare user codes map to provider symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketMode {
    /// Singapore exchange listings, suffixed with `.SI`.
    Sg,
    /// US listings, used as-is.
    #[default]
    Us,
    /// Cryptocurrencies quoted against USD (`BTC` -> `BTC-USD`).
    Crypto,
    /// Market indices, prefixed with `^`.
    Index,
}

impl MarketMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sg => "sg",
            Self::Us => "us",
            Self::Crypto => "crypto",
            Self::Index => "index",
        }
    }

    /// Map a bare code to the provider's canonical symbol. Idempotent.
    pub fn canonical(self, code: &str) -> Result<Symbol, ValidationError> {
        let bare = code.trim().to_ascii_uppercase();
        let mapped = match self {
            Self::Sg if !bare.ends_with(SGX_SUFFIX) => format!("{bare}{SGX_SUFFIX}"),
            // Any existing pair (`ETH-BTC`) is left alone.
            Self::Crypto if !bare.contains('-') => format!("{bare}{FIAT_PAIR_SUFFIX}"),
            Self::Index if !bare.starts_with(INDEX_PREFIX) => format!("{INDEX_PREFIX}{bare}"),
            _ => bare,
        };
        Symbol::parse(&mapped)
    }

    /// Short code shown to the user: the canonical symbol without the mode's affix.
    pub fn display_code(self, symbol: &Symbol) -> String {
        let raw = symbol.as_str();
        let stripped = match self {
            Self::Sg => raw.strip_suffix(SGX_SUFFIX),
            Self::Crypto => raw.strip_suffix(FIAT_PAIR_SUFFIX),
            Self::Index => raw.strip_prefix(INDEX_PREFIX),
            Self::Us => None,
        };
        stripped.unwrap_or(raw).to_owned()
    }
}

impl Display for MarketMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sg" => Ok(Self::Sg),
            "us" => Ok(Self::Us),
            "crypto" => Ok(Self::Crypto),
            "index" => Ok(Self::Index),
            _ => Err(ValidationError::InvalidMarketMode {
                value: value.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_symbol() {
        let parsed = Symbol::parse(" aapl ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "AAPL");
    }

    #[test]
    fn accepts_digit_and_caret_starts() {
        assert!(Symbol::parse("9CI.SI").is_ok());
        assert!(Symbol::parse("^GSPC").is_ok());
    }

    #[test]
    fn rejects_invalid_start() {
        let err = Symbol::parse("$AAPL").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidStart { .. }));
    }

    #[test]
    fn rejects_invalid_chars() {
        let err = Symbol::parse("AAPL$").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidChar { .. }));
    }

    #[test]
    fn sg_mode_appends_suffix_once() {
        let mode = MarketMode::Sg;
        assert_eq!(mode.canonical("d05").expect("valid").as_str(), "D05.SI");
        assert_eq!(mode.canonical("D05.SI").expect("valid").as_str(), "D05.SI");
    }

    #[test]
    fn crypto_mode_appends_fiat_pair_once() {
        let mode = MarketMode::Crypto;
        assert_eq!(mode.canonical("btc").expect("valid").as_str(), "BTC-USD");
        assert_eq!(mode.canonical("BTC-USD").expect("valid").as_str(), "BTC-USD");
        assert_eq!(mode.canonical("eth-btc").expect("valid").as_str(), "ETH-BTC");
    }

    #[test]
    fn index_mode_prepends_marker_once() {
        let mode = MarketMode::Index;
        assert_eq!(mode.canonical("gspc").expect("valid").as_str(), "^GSPC");
        assert_eq!(mode.canonical("^GSPC").expect("valid").as_str(), "^GSPC");
    }

    #[test]
    fn us_mode_only_uppercases() {
        assert_eq!(
            MarketMode::Us.canonical(" goog ").expect("valid").as_str(),
            "GOOG"
        );
    }

    #[test]
    fn display_code_strips_mode_affix() {
        let symbol = MarketMode::Sg.canonical("C6L").expect("valid");
        assert_eq!(MarketMode::Sg.display_code(&symbol), "C6L");

        let symbol = MarketMode::Index.canonical("GSPC").expect("valid");
        assert_eq!(MarketMode::Index.display_code(&symbol), "GSPC");
    }
}

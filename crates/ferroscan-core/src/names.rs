//! Display-name resolution: batch quote, then per-symbol search, then identity.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapters::yahoo;
use crate::{DataClient, Symbol, ValidationError};

/// How names are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMode {
    /// Batch quote lookup, then search for whatever it missed.
    #[default]
    Auto,
    /// Per-symbol search only.
    Search,
    /// No requests; names equal symbols.
    None,
}

impl NameMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Search => "search",
            Self::None => "none",
        }
    }
}

impl Display for NameMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NameMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "search" => Ok(Self::Search),
            "none" => Ok(Self::None),
            _ => Err(ValidationError::InvalidNameMode {
                value: value.to_owned(),
            }),
        }
    }
}

pub struct NameResolver<'a> {
    client: &'a DataClient,
    mode: NameMode,
}

impl<'a> NameResolver<'a> {
    pub fn new(client: &'a DataClient, mode: NameMode) -> Self {
        Self { client, mode }
    }

    /// Name for every symbol; a symbol without any resolved name maps to itself.
    pub async fn resolve(&self, symbols: &[Symbol]) -> HashMap<Symbol, String> {
        let mut names = HashMap::with_capacity(symbols.len());

        if self.mode == NameMode::Auto {
            self.batch_lookup(symbols, &mut names).await;
        }

        if self.mode != NameMode::None {
            for symbol in symbols {
                let resolved = names
                    .get(symbol)
                    .is_some_and(|name| name.as_str() != symbol.as_str());
                if resolved {
                    continue;
                }
                if let Some(name) = self.search(symbol).await {
                    names.insert(symbol.clone(), name);
                }
            }
        }

        for symbol in symbols {
            names
                .entry(symbol.clone())
                .or_insert_with(|| symbol.to_string());
        }
        names
    }

    async fn batch_lookup(&self, symbols: &[Symbol], names: &mut HashMap<Symbol, String>) {
        let batch_size = self.client.config().name_batch_size.max(1);

        for chunk in symbols.chunks(batch_size) {
            let result = self
                .client
                .fetch_with_fallback(
                    "quote names",
                    &yahoo::quote_urls(chunk),
                    yahoo::parse_quote_names,
                )
                .await;

            match result {
                Ok(success) => {
                    for (raw_symbol, name) in success.data {
                        if let Some(symbol) = chunk.iter().find(|s| s.as_str() == raw_symbol) {
                            names.insert(symbol.clone(), name);
                        }
                    }
                }
                Err(unavailable) => {
                    debug!(
                        symbols = chunk.len(),
                        %unavailable,
                        "batch name lookup failed, falling back to search"
                    );
                }
            }
        }
    }

    async fn search(&self, symbol: &Symbol) -> Option<String> {
        match self
            .client
            .fetch_with_fallback(
                "search",
                &yahoo::search_urls(symbol),
                yahoo::parse_search_name,
            )
            .await
        {
            Ok(success) => Some(success.data),
            Err(unavailable) => {
                warn!(symbol = %symbol, %unavailable, "name lookup failed, using symbol");
                None
            }
        }
    }
}

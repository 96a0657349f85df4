use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::fallback::FailureNote;
use crate::fundamentals::FundamentalsResolver;
use crate::indicators::{compute_record, RecordIdentity};
use crate::names::{NameMode, NameResolver};
use crate::session::SessionState;
use crate::{
    DataClient, IndicatorRecord, ScanConfig, ScanError, Symbol, Universe, ValidationError,
};

use super::{screen, FilterSpec, Metric, ScreenResult};

/// An instrument left out of the batch and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedInstrument {
    pub symbol: Symbol,
    pub reason: String,
    pub failures: Vec<FailureNote>,
}

/// Everything one batch run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Session state after warm-up; `None` when the universe was empty.
    pub session: Option<SessionState>,
    /// Number of instruments that yielded a record.
    pub computed: usize,
    pub dropped: Vec<DroppedInstrument>,
    pub result: ScreenResult,
}

/// Runs one batch: warm-up, names, per-instrument history and fundamentals,
/// indicators, then screening.
pub struct Scanner<'a> {
    client: &'a DataClient,
    config: ScanConfig,
    names: NameMode,
}

impl<'a> Scanner<'a> {
    pub fn new(client: &'a DataClient, config: ScanConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            names: NameMode::default(),
        })
    }

    pub fn with_name_mode(mut self, names: NameMode) -> Self {
        self.names = names;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Process every symbol sequentially. Instruments without usable history
    /// are dropped and reported; nothing else aborts the batch.
    pub async fn scan(
        &self,
        universe: &Universe,
        filters: &FilterSpec,
        sort: Metric,
    ) -> ScanReport {
        let Some(first) = universe.symbols.first() else {
            return ScanReport {
                session: None,
                computed: 0,
                dropped: Vec::new(),
                result: screen(Vec::new(), filters, sort),
            };
        };

        let session = self.client.ensure_warm(first).await;
        let names = NameResolver::new(self.client, self.names)
            .resolve(&universe.symbols)
            .await;
        let fundamentals = FundamentalsResolver::new(self.client);

        info!(
            instruments = universe.symbols.len(),
            mode = %self.config.mode.as_str(),
            "scanning universe"
        );

        let mut records = Vec::with_capacity(universe.symbols.len());
        let mut dropped = Vec::new();

        for symbol in &universe.symbols {
            match self.scan_one(symbol, &fundamentals, &names).await {
                Ok(record) => records.push(record),
                Err((error, failures)) => {
                    warn!(symbol = %symbol, %error, "instrument dropped");
                    dropped.push(DroppedInstrument {
                        symbol: symbol.clone(),
                        reason: error.to_string(),
                        failures,
                    });
                }
            }

            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        let computed = records.len();
        ScanReport {
            session: Some(session),
            computed,
            dropped,
            result: screen(records, filters, sort),
        }
    }

    async fn scan_one(
        &self,
        symbol: &Symbol,
        fundamentals: &FundamentalsResolver<'_>,
        names: &HashMap<Symbol, String>,
    ) -> Result<IndicatorRecord, (ScanError, Vec<FailureNote>)> {
        let series = match self.client.fetch_series(symbol, &self.config.range).await {
            Ok(success) => success.data,
            Err(unavailable) => {
                let error = ScanError::HistoryUnavailable {
                    attempts: unavailable.failures.len(),
                };
                let notes = unavailable.failures.iter().map(FailureNote::from).collect();
                return Err((error, notes));
            }
        };

        if series.latest_close().is_nan() {
            return Err((ScanError::NoValidClose, Vec::new()));
        }

        let resolved = fundamentals.resolve(symbol).await;
        debug!(symbol = %symbol, tier = ?resolved.tier, "fundamentals");

        let identity = RecordIdentity {
            code: self.config.mode.display_code(symbol),
            symbol: symbol.clone(),
            name: names
                .get(symbol)
                .cloned()
                .unwrap_or_else(|| symbol.to_string()),
        };
        Ok(compute_record(
            identity,
            &series,
            resolved.fundamentals,
            &self.config,
        ))
    }
}

//! Batch normalization of user-supplied codes into a scan universe.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::Serialize;
use tracing::warn;

use crate::{MarketMode, Symbol, ValidationError};

/// An input that appeared more than once before de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duplicate<T> {
    pub value: T,
    pub count: usize,
}

/// Result of normalizing one batch of codes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Universe {
    /// Unique canonical symbols in first-seen order, exclusions removed.
    pub symbols: Vec<Symbol>,
    pub duplicates: Vec<Duplicate<Symbol>>,
    /// Symbols removed because they were on the exclude list.
    pub excluded: Vec<Symbol>,
    /// Inputs that could not be turned into a symbol.
    pub rejected: Vec<RejectedInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedInput {
    pub input: String,
    pub reason: String,
}

impl Universe {
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Duplicate report in `SYM (xN)` form, comma separated.
    pub fn duplicate_summary(&self) -> Option<String> {
        if self.duplicates.is_empty() {
            return None;
        }
        Some(
            self.duplicates
                .iter()
                .map(|duplicate| format!("{} (x{})", duplicate.value, duplicate.count))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Keep the first occurrence of every value and count the repeats.
///
/// Duplicates are reported in the order their value was first seen.
pub fn dedupe_first_seen<T>(values: impl IntoIterator<Item = T>) -> (Vec<T>, Vec<Duplicate<T>>)
where
    T: Eq + Hash + Clone,
{
    let mut unique = Vec::new();
    let mut counts: HashMap<T, usize> = HashMap::new();

    for value in values {
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            unique.push(value);
        }
        *count += 1;
    }

    let duplicates = unique
        .iter()
        .filter_map(|value| {
            let count = counts.get(value).copied().unwrap_or(0);
            (count > 1).then(|| Duplicate {
                value: value.clone(),
                count,
            })
        })
        .collect();

    (unique, duplicates)
}

/// Map codes to canonical symbols, collapse duplicates and subtract excludes.
pub fn normalize_batch<I, E>(codes: I, excludes: E, mode: MarketMode) -> Universe
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    E: IntoIterator,
    E::Item: AsRef<str>,
{
    let mut rejected = Vec::new();
    let mut canonical = |input: &str| -> Option<Symbol> {
        match mode.canonical(input) {
            Ok(symbol) => Some(symbol),
            Err(error) => {
                warn!(input, %error, "skipping invalid instrument code");
                rejected.push(reject(input, &error));
                None
            }
        }
    };

    let mapped = codes
        .into_iter()
        .filter_map(|code| canonical(code.as_ref()))
        .collect::<Vec<_>>();
    let excluded_set = excludes
        .into_iter()
        .filter_map(|code| canonical(code.as_ref()))
        .collect::<HashSet<_>>();

    let (unique, duplicates) = dedupe_first_seen(mapped);
    let (excluded, symbols): (Vec<_>, Vec<_>) = unique
        .into_iter()
        .partition(|symbol| excluded_set.contains(symbol));

    let universe = Universe {
        symbols,
        duplicates,
        excluded,
        rejected,
    };
    if let Some(report) = universe.duplicate_summary() {
        warn!(duplicates = %report, "duplicate instrument codes will be de-duplicated");
    }
    universe
}

fn reject(input: &str, error: &ValidationError) -> RejectedInput {
    RejectedInput {
        input: input.to_owned(),
        reason: error.to_string(),
    }
}

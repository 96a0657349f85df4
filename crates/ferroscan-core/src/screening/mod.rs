//! Filter, sort and summarize computed records.
//!
//! | Item | Role |
//! |------|------|
//! | [`FilterSpec`] | Optional thresholds, applied in a fixed order |
//! | [`SortKey`] | Metric plus direction derived from the threshold sign |
//! | [`screen`] | Pure filter-then-sort over a batch of records |
//! | [`Scanner`] | Fetch, compute and screen a whole universe |

mod filter;
mod scanner;

use std::cmp::Ordering;

use serde::Serialize;

use crate::IndicatorRecord;

pub use filter::{
    parse_fixed, passes_sign_rule, FilterSpec, Metric, PerRecord, Predicate, SortKey, Threshold,
};
pub use scanner::{DroppedInstrument, ScanReport, Scanner};

/// Filtered and sorted records plus what it took to get there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenResult {
    /// Records with a finite Delta%; the base every filter starts from.
    pub processed: usize,
    /// Labels of the active filters, in application order.
    pub applied: Vec<String>,
    pub sort: SortKey,
    pub records: Vec<IndicatorRecord>,
}

impl ScreenResult {
    /// `Processed N valid stocks, M passed filter(s): ...`, plural when more
    /// than one filter is active.
    pub fn summary(&self) -> String {
        let plural = if self.applied.len() > 1 { "s" } else { "" };
        let filters = if self.applied.is_empty() {
            String::from("no extra filters")
        } else {
            self.applied.join("; ")
        };
        format!(
            "Processed {} valid stocks, {} passed filter{plural}: {filters}",
            self.processed,
            self.records.len()
        )
    }
}

/// Keep admissible records that pass every active predicate, then sort.
///
/// The sort is stable and places NaN values last in either direction.
pub fn screen(records: Vec<IndicatorRecord>, filters: &FilterSpec, sort: Metric) -> ScreenResult {
    let predicates = filters.predicates();
    let admissible = records
        .into_iter()
        .filter(|record| record.delta_pct.is_finite())
        .collect::<Vec<_>>();
    let processed = admissible.len();

    let mut kept = admissible
        .into_iter()
        .filter(|record| predicates.iter().all(|predicate| predicate.keeps(record)))
        .collect::<Vec<_>>();

    let sort = SortKey::for_metric(sort, filters);
    kept.sort_by(|left, right| {
        compare_nan_last(
            sort.metric.value(left),
            sort.metric.value(right),
            sort.descending,
        )
    });

    ScreenResult {
        processed,
        applied: predicates.iter().map(|predicate| predicate.label()).collect(),
        sort,
        records: kept,
    }
}

fn compare_nan_last(left: f64, right: f64, descending: bool) -> Ordering {
    match (left.is_nan(), right.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if descending => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
        (false, false) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{Fundamentals, Symbol};

    fn record(code: &str, delta_pct: f64) -> IndicatorRecord {
        IndicatorRecord {
            code: code.to_owned(),
            symbol: Symbol::parse(code).expect("valid symbol"),
            name: code.to_owned(),
            latest_close: 100.0,
            sessions: 250,
            moving_averages: BTreeMap::new(),
            ma_reference: 100.0,
            ma_pct_band: 96.0,
            ma_sd_band: 100.0,
            delta_pct,
            volatility: 2.0,
            z_sd: delta_pct / 2.0,
            atr: BTreeMap::new(),
            atr_primary: 1.5,
            z_atr: delta_pct / 1.5,
            rsi: 50.0,
            rsi_slope: 0.0,
            rsi_r2: f64::NAN,
            fundamentals: Fundamentals::unknown(),
        }
    }

    fn codes(result: &ScreenResult) -> Vec<&str> {
        result.records.iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn negative_delta_keeps_at_or_below_and_sorts_ascending() {
        let records = vec![record("A", -6.0), record("B", -3.0), record("C", -8.0)];
        let filters = FilterSpec {
            delta: Some(Threshold::Fixed(-5.0)),
            ..FilterSpec::default()
        };

        let result = screen(records, &filters, Metric::Delta);

        assert_eq!(codes(&result), vec!["C", "A"]);
        assert_eq!(result.processed, 3);
        assert_eq!(
            result.summary(),
            "Processed 3 valid stocks, 2 passed filter: Delta% ≤ -5.00%"
        );
    }

    #[test]
    fn positive_delta_keeps_strictly_above_and_sorts_descending() {
        let records = vec![record("A", 6.0), record("B", 3.0), record("C", 8.0), record("D", 5.0)];
        let filters = FilterSpec {
            delta: Some(Threshold::Fixed(5.0)),
            ..FilterSpec::default()
        };

        let result = screen(records, &filters, Metric::Delta);

        assert_eq!(codes(&result), vec!["C", "A"]);
        assert!(result.sort.descending);
    }

    #[test]
    fn nan_delta_is_not_admissible() {
        let records = vec![record("A", f64::NAN), record("B", 1.0)];
        let result = screen(records, &FilterSpec::default(), Metric::Delta);

        assert_eq!(codes(&result), vec!["B"]);
        assert_eq!(
            result.summary(),
            "Processed 1 valid stocks, 1 passed filter: no extra filters"
        );
    }

    #[test]
    fn per_record_delta_compares_against_own_z() {
        let mut within = record("IN", -6.0);
        within.z_sd = -5.0;
        let mut outside = record("OUT", -4.0);
        outside.z_sd = -5.0;
        let mut unknown = record("NAN", -9.0);
        unknown.z_sd = f64::NAN;
        let filters = FilterSpec {
            delta: Some(Threshold::PerRecord(PerRecord::ZSd)),
            ..FilterSpec::default()
        };

        let result = screen(vec![within, outside, unknown], &filters, Metric::Delta);

        assert_eq!(codes(&result), vec!["IN"]);
    }

    #[test]
    fn per_record_delta_compares_against_own_zatr() {
        let mut within = record("IN", -4.0);
        within.z_sd = -9.0;
        within.z_atr = -3.0;
        let mut outside = record("OUT", -6.0);
        outside.z_sd = -1.0;
        outside.z_atr = -7.0;
        let mut equal = record("EQ", -2.0);
        equal.z_atr = -2.0;
        let mut unknown = record("NAN", -9.0);
        unknown.z_atr = f64::NAN;
        let filters = FilterSpec {
            delta: Some(Threshold::PerRecord(PerRecord::ZAtr)),
            ..FilterSpec::default()
        };

        let result = screen(vec![within, outside, equal, unknown], &filters, Metric::Delta);

        assert_eq!(codes(&result), vec!["IN", "EQ"]);
        assert!(!result.sort.descending);
        assert_eq!(result.applied, vec![String::from("Delta% ≤ Z-ATR (per-record)")]);
    }

    #[test]
    fn fundamentals_filters_use_best_values_and_drop_unknowns() {
        let mut payer = record("PAY", -1.0);
        payer.fundamentals = Fundamentals {
            div_yield_1y: 2.0,
            div_yield_5y: 5.5,
            pe_trailing: -3.0,
            pe_forward: 11.0,
            ..Fundamentals::unknown()
        };
        let unknown = record("UNK", -1.0);
        let filters = FilterSpec {
            div: Some(5.0),
            pe: Some(12.0),
            ..FilterSpec::default()
        };

        let result = screen(vec![payer, unknown], &filters, Metric::Div);

        assert_eq!(codes(&result), vec!["PAY"]);
        assert_eq!(
            result.applied,
            vec!["Div1Y/5Y ≥ 5.00%".to_owned(), "P/E ≤ 12.00".to_owned()]
        );
    }

    #[test]
    fn nan_sort_values_go_last_and_ties_keep_input_order() {
        let mut first = record("FIRST", 1.0);
        first.rsi = 40.0;
        let mut missing = record("MISSING", 1.0);
        missing.rsi = f64::NAN;
        let mut second = record("SECOND", 1.0);
        second.rsi = 40.0;
        let mut low = record("LOW", 1.0);
        low.rsi = 20.0;

        let result = screen(
            vec![first, missing, second, low],
            &FilterSpec::default(),
            Metric::Rsi,
        );

        assert_eq!(codes(&result), vec!["LOW", "FIRST", "SECOND", "MISSING"]);
    }

    #[test]
    fn volatility_sorts_are_descending() {
        let mut calm = record("CALM", 1.0);
        calm.volatility = 0.5;
        let mut wild = record("WILD", 1.0);
        wild.volatility = 4.0;

        let result = screen(vec![calm, wild], &FilterSpec::default(), Metric::Sd);

        assert_eq!(codes(&result), vec!["WILD", "CALM"]);
    }
}

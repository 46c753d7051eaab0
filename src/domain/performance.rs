//! Window performance: percentage change between the first and last rows of a
//! filtered view, per instrument.

use crate::domain::error::DegenerateBaseline;
use crate::domain::filter::FilteredView;
use crate::domain::instrument::InstrumentId;
use std::collections::BTreeMap;

/// Signed percentage per instrument. Only instruments with a usable pair of
/// boundary observations appear.
pub type PerformanceResult = BTreeMap<InstrumentId, f64>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceReport {
    pub performance: PerformanceResult,
    /// Instruments whose first observation was zero.
    pub degenerate: Vec<DegenerateBaseline>,
    /// Instruments with no rows, or no quote on the first or last row.
    pub excluded: Vec<InstrumentId>,
}

impl PerformanceReport {
    pub fn get(&self, instrument: &InstrumentId) -> Option<f64> {
        self.performance.get(instrument).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.performance.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Gain,
    Loss,
    Unchanged,
}

impl Trend {
    pub fn of(pct: f64) -> Self {
        if pct > 0.0 {
            Trend::Gain
        } else if pct < 0.0 {
            Trend::Loss
        } else {
            Trend::Unchanged
        }
    }
}

/// (last / first - 1) * 100
pub fn percent_change(first: f64, last: f64) -> f64 {
    (last / first - 1.0) * 100.0
}

/// `CODE: +12.34%`, two decimals, explicit sign on gains.
pub fn format_performance(instrument: &InstrumentId, pct: f64) -> String {
    let sign = if Trend::of(pct) == Trend::Gain { "+" } else { "" };
    format!("{}: {}{:.2}%", instrument, sign, pct)
}

fn observed(cell: Option<&Option<f64>>) -> Option<f64> {
    cell.copied().flatten().filter(|v| v.is_finite())
}

/// Computes endpoint performance for every column in `view`.
///
/// Interior gaps are ignored; only the first and last rows matter. A zero
/// first value is reported as [`DegenerateBaseline`] and the instrument is
/// left out while the others are still computed.
pub fn compute(view: &FilteredView) -> PerformanceReport {
    let mut report = PerformanceReport::default();

    for (instrument, values) in view.table().columns() {
        let (Some(first), Some(last)) = (observed(values.first()), observed(values.last())) else {
            tracing::debug!(%instrument, "no quote at window edge, excluded");
            report.excluded.push(instrument.clone());
            continue;
        };

        if first == 0.0 {
            tracing::warn!(%instrument, "zero baseline, performance undefined");
            report.degenerate.push(DegenerateBaseline {
                instrument: instrument.to_string(),
            });
            continue;
        }

        let pct = percent_change(first, last);
        if !pct.is_finite() {
            tracing::warn!(%instrument, first, last, "performance overflowed, excluded");
            report.excluded.push(instrument.clone());
            continue;
        }
        report.performance.insert(instrument.clone(), pct);
    }

    report
}

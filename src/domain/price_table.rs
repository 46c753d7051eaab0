//! Wide, date-indexed closing-price table.

use crate::domain::error::PricelensError;
use crate::domain::instrument::InstrumentId;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

/// Closing prices, one row per date and one column per instrument.
///
/// Rows are strictly increasing by date. Every column holds exactly one cell
/// per row; a `None` cell means the instrument had no quote on that date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<InstrumentId, Vec<Option<f64>>>,
}

impl PriceTable {
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: BTreeMap<InstrumentId, Vec<Option<f64>>>,
    ) -> Result<Self, PricelensError> {
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(PricelensError::InvalidTable {
                reason: format!("dates not strictly increasing at {} -> {}", pair[0], pair[1]),
            });
        }
        for (instrument, values) in &columns {
            if values.len() != dates.len() {
                return Err(PricelensError::InvalidTable {
                    reason: format!(
                        "column {} has {} cells for {} dates",
                        instrument,
                        values.len(),
                        dates.len()
                    ),
                });
            }
        }
        Ok(Self { dates, columns })
    }

    /// Merges per-instrument `(date, close)` series onto the union of their
    /// dates. Instruments without a quote on a given date get an empty cell.
    pub fn from_series<I>(series: I) -> Result<Self, PricelensError>
    where
        I: IntoIterator<Item = (InstrumentId, Vec<(NaiveDate, f64)>)>,
    {
        let series: Vec<_> = series.into_iter().collect();
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(date, _)| *date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut columns = BTreeMap::new();
        for (instrument, points) in series {
            let mut by_date = BTreeMap::new();
            for (date, close) in points {
                if by_date.insert(date, close).is_some() {
                    return Err(PricelensError::InvalidTable {
                        reason: format!("duplicate date {} for {}", date, instrument),
                    });
                }
            }
            let values = dates.iter().map(|d| by_date.get(d).copied()).collect();
            columns.insert(instrument, values);
        }

        Ok(Self { dates, columns })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// No rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }

    /// At least one cell carries a price.
    pub fn has_observations(&self) -> bool {
        self.columns
            .values()
            .any(|values| values.iter().any(Option::is_some))
    }

    pub fn instruments(&self) -> impl Iterator<Item = &InstrumentId> {
        self.columns.keys()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&InstrumentId, &[Option<f64>])> {
        self.columns.iter().map(|(id, values)| (id, values.as_slice()))
    }

    pub fn contains(&self, instrument: &InstrumentId) -> bool {
        self.columns.contains_key(instrument)
    }

    pub fn column(&self, instrument: &InstrumentId) -> Option<&[Option<f64>]> {
        self.columns.get(instrument).map(Vec::as_slice)
    }

    pub fn value(&self, row: usize, instrument: &InstrumentId) -> Option<f64> {
        self.columns.get(instrument)?.get(row).copied().flatten()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// New table holding only the columns accepted by `keep`.
    pub fn retain_columns<P>(&self, mut keep: P) -> Self
    where
        P: FnMut(&InstrumentId) -> bool,
    {
        Self {
            dates: self.dates.clone(),
            columns: self
                .columns
                .iter()
                .filter(|(id, _)| keep(id))
                .map(|(id, values)| (id.clone(), values.clone()))
                .collect(),
        }
    }

    /// New table holding `rows` of the columns accepted by `keep`.
    pub(crate) fn select<P>(&self, rows: Range<usize>, mut keep: P) -> Self
    where
        P: FnMut(&InstrumentId) -> bool,
    {
        Self {
            dates: self.dates[rows.clone()].to_vec(),
            columns: self
                .columns
                .iter()
                .filter(|(id, _)| keep(id))
                .map(|(id, values)| (id.clone(), values[rows.clone()].to_vec()))
                .collect(),
        }
    }
}

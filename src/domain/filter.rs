//! Date-window and column filtering of a price table.

use crate::domain::date_range::DateRange;
use crate::domain::instrument::{InstrumentId, InstrumentSet};
use crate::domain::price_table::PriceTable;
use chrono::NaiveDate;

/// Which columns a filter keeps.
///
/// `Only` with an empty set keeps nothing; it never falls back to `All`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelection {
    All,
    Only(InstrumentSet),
}

impl ColumnSelection {
    fn keeps(&self, instrument: &InstrumentId) -> bool {
        match self {
            ColumnSelection::All => true,
            ColumnSelection::Only(set) => set.contains(instrument),
        }
    }
}

/// A price table narrowed to a date window and a column subset.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub range: DateRange,
    table: PriceTable,
}

impl FilteredView {
    pub fn table(&self) -> &PriceTable {
        &self.table
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.table.dates()
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Keeps the rows dated inside `range` (inclusive) and the columns named by
/// `columns`. Requested columns missing from `table` are skipped. An inverted
/// range gives a view with no rows.
pub fn filter(table: &PriceTable, range: DateRange, columns: &ColumnSelection) -> FilteredView {
    let rows = if range.is_inverted() {
        0..0
    } else {
        let dates = table.dates();
        let lo = dates.partition_point(|d| *d < range.start);
        let hi = dates.partition_point(|d| *d <= range.end);
        lo..hi.max(lo)
    };

    if let ColumnSelection::Only(set) = columns {
        for missing in set.iter().filter(|id| !table.contains(id)) {
            tracing::debug!(instrument = %missing, "requested column not in table");
        }
    }

    FilteredView {
        range,
        table: table.select(rows, |id| columns.keeps(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn sample_table() -> PriceTable {
        PriceTable::from_series(vec![
            (
                InstrumentId::from("X"),
                vec![(d(1), 10.0), (d(2), 12.0), (d(3), 11.0), (d(4), 13.0), (d(5), 15.0)],
            ),
            (InstrumentId::from("Y"), vec![(d(2), 5.0), (d(4), 6.0)]),
        ])
        .unwrap()
    }

    fn only(codes: &[&str]) -> ColumnSelection {
        ColumnSelection::Only(codes.iter().copied().collect())
    }

    #[test]
    fn keeps_rows_inside_inclusive_window() {
        let view = filter(&sample_table(), DateRange::new(d(2), d(4)), &ColumnSelection::All);
        assert_eq!(view.dates(), &[d(2), d(3), d(4)]);
        assert_eq!(view.column_count(), 2);
    }

    #[test]
    fn window_between_rows_is_empty() {
        let table = PriceTable::from_series(vec![(
            InstrumentId::from("X"),
            vec![(d(1), 1.0), (d(10), 2.0)],
        )])
        .unwrap();
        let view = filter(&table, DateRange::new(d(3), d(5)), &ColumnSelection::All);
        assert_eq!(view.row_count(), 0);
        assert!(view.is_empty());
    }

    #[test]
    fn window_wider_than_table_keeps_everything() {
        let table = sample_table();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2100, 1, 1).unwrap(),
        );
        let view = filter(&table, range, &ColumnSelection::All);
        assert_eq!(view.table(), &table);
    }

    #[test]
    fn inverted_window_yields_empty_view() {
        let view = filter(&sample_table(), DateRange::new(d(5), d(1)), &ColumnSelection::All);
        assert_eq!(view.row_count(), 0);
        assert_eq!(view.column_count(), 2);
    }

    #[test]
    fn selects_exact_columns() {
        let view = filter(&sample_table(), DateRange::new(d(1), d(5)), &only(&["Y"]));
        let ids: Vec<_> = view.table().instruments().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["Y"]);
    }

    #[test]
    fn unknown_columns_are_omitted() {
        let view = filter(&sample_table(), DateRange::new(d(1), d(5)), &only(&["X", "NOPE"]));
        let ids: Vec<_> = view.table().instruments().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["X"]);
    }

    #[test]
    fn empty_selection_keeps_no_columns() {
        let view = filter(&sample_table(), DateRange::new(d(1), d(5)), &only(&[]));
        assert_eq!(view.column_count(), 0);
        assert_eq!(view.row_count(), 5);
        assert!(view.is_empty());
    }

    #[test]
    fn empty_table_filters_to_empty_view() {
        let view = filter(
            &PriceTable::default(),
            DateRange::new(d(1), d(5)),
            &ColumnSelection::All,
        );
        assert!(view.is_empty());
    }
}

//! CSV directory price adapter.
//!
//! One `<instrument>.csv` file per instrument, with at least a `date` and a
//! `close` column (`date,open,high,low,close,volume` works as-is). Blank close
//! cells mean no quote that day. An instrument without a file is left out of
//! the table; the fetch fails only when none of them has one.

use crate::domain::date_range::DateRange;
use crate::domain::error::PricelensError;
use crate::domain::instrument::{InstrumentId, InstrumentSet};
use crate::domain::price_table::PriceTable;
use crate::ports::market_data_port::MarketDataFetcher;
use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &InstrumentId) -> PathBuf {
        self.base_path.join(format!("{}.csv", instrument))
    }

    /// `Ok(None)` when the instrument has no file.
    fn read_closes(
        &self,
        instrument: &InstrumentId,
        range: DateRange,
    ) -> Result<Option<Vec<(NaiveDate, f64)>>, PricelensError> {
        let unavailable = |reason: String| PricelensError::DataUnavailable {
            instruments: instrument.to_string(),
            reason,
        };

        let path = self.csv_path(instrument);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(unavailable(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| unavailable(format!("CSV header error: {}", e)))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| unavailable(format!("missing {} column", name)))
        };
        let date_col = column("date")?;
        let close_col = column("close")?;

        let mut closes = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| unavailable(format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(date_col)
                .ok_or_else(|| unavailable("missing date value".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| unavailable(format!("invalid date format: {}", e)))?;

            if !range.contains(date) {
                continue;
            }

            let close_str = record.get(close_col).unwrap_or("").trim();
            if close_str.is_empty() {
                continue;
            }
            let close: f64 = close_str
                .parse()
                .map_err(|e| unavailable(format!("invalid close value: {}", e)))?;

            closes.push((date, close));
        }

        closes.sort_by_key(|(date, _)| *date);
        Ok(Some(closes))
    }
}

impl MarketDataFetcher for CsvPriceAdapter {
    fn fetch(
        &self,
        instruments: &InstrumentSet,
        range: DateRange,
    ) -> Result<PriceTable, PricelensError> {
        let mut series = Vec::with_capacity(instruments.len());
        let mut missing = Vec::new();
        for instrument in instruments {
            match self.read_closes(instrument, range)? {
                Some(closes) => {
                    tracing::debug!(%instrument, rows = closes.len(), "read closes");
                    series.push((instrument.clone(), closes));
                }
                None => missing.push(instrument.to_string()),
            }
        }

        if series.is_empty() && !instruments.is_empty() {
            return Err(PricelensError::DataUnavailable {
                instruments: instruments.joined(),
                reason: format!("no price files under {}", self.base_path.display()),
            });
        }
        if !missing.is_empty() {
            tracing::warn!(missing = %missing.join(","), "no price file, instruments left out");
        }
        PriceTable::from_series(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("PETR4.SA.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-17,30.0,31.0,29.0,30.5,1000\n\
             2024-01-15,28.0,29.0,27.0,28.5,1000\n\
             2024-01-16,29.0,30.0,28.0,29.5,1000\n",
        )
        .unwrap();
        fs::write(
            path.join("VALE3.SA.csv"),
            "Date,Close\n2024-01-15,70.0\n2024-01-16,\n2024-01-18,72.0\n",
        )
        .unwrap();
        fs::write(path.join("BAD.SA.csv"), "date,close\n2024-01-15,abc\n").unwrap();

        (dir, path)
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn set(codes: &[&str]) -> InstrumentSet {
        codes.iter().copied().collect()
    }

    #[test]
    fn fetch_merges_instruments_on_shared_dates() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let table = adapter
            .fetch(&set(&["PETR4.SA", "VALE3.SA"]), DateRange::new(d(1), d(31)))
            .unwrap();

        assert_eq!(table.dates(), &[d(15), d(16), d(17), d(18)]);
        assert_eq!(
            table.column(&InstrumentId::from("PETR4.SA")).unwrap(),
            &[Some(28.5), Some(29.5), Some(30.5), None]
        );
        assert_eq!(
            table.column(&InstrumentId::from("VALE3.SA")).unwrap(),
            &[Some(70.0), None, None, Some(72.0)]
        );
    }

    #[test]
    fn fetch_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let table = adapter
            .fetch(&set(&["PETR4.SA"]), DateRange::new(d(16), d(16)))
            .unwrap();

        assert_eq!(table.dates(), &[d(16)]);
    }

    #[test]
    fn fetch_unknown_instrument_is_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let result = adapter.fetch(&set(&["XYZ.SA"]), DateRange::new(d(1), d(31)));
        assert!(matches!(result, Err(PricelensError::DataUnavailable { .. })));
    }

    #[test]
    fn missing_file_leaves_column_out() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let table = adapter
            .fetch(&set(&["PETR4.SA", "GONE3.SA"]), DateRange::new(d(1), d(31)))
            .unwrap();

        let ids: Vec<_> = table.instruments().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["PETR4.SA"]);
        assert_eq!(table.dates(), &[d(15), d(16), d(17)]);
    }

    #[test]
    fn fetch_bad_close_is_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let result = adapter.fetch(&set(&["BAD.SA"]), DateRange::new(d(1), d(31)));
        assert!(matches!(result, Err(PricelensError::DataUnavailable { .. })));
    }
}

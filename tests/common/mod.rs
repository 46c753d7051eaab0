#![allow(dead_code)]

use chrono::NaiveDate;
use pricelens::domain::date_range::DateRange;
use pricelens::domain::error::PricelensError;
use pricelens::domain::instrument::{InstrumentId, InstrumentSet};
use pricelens::domain::price_table::PriceTable;
use pricelens::ports::catalog_port::InstrumentCatalog;
use pricelens::ports::market_data_port::MarketDataFetcher;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Serves fixed close series and records every call.
pub struct MockFetcher {
    pub data: HashMap<String, Vec<(NaiveDate, f64)>>,
    pub errors: HashMap<String, String>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<InstrumentSet>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_closes(mut self, code: &str, closes: Vec<(NaiveDate, f64)>) -> Self {
        self.data.insert(code.to_string(), closes);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataFetcher for MockFetcher {
    fn fetch(
        &self,
        instruments: &InstrumentSet,
        range: DateRange,
    ) -> Result<PriceTable, PricelensError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(instruments.clone());

        let mut series = Vec::new();
        for id in instruments {
            if let Some(reason) = self.errors.get(id.as_str()) {
                return Err(PricelensError::Io(std::io::Error::other(reason.clone())));
            }
            if let Some(closes) = self.data.get(id.as_str()) {
                let kept = closes
                    .iter()
                    .copied()
                    .filter(|(date, _)| range.contains(*date))
                    .collect();
                series.push((id.clone(), kept));
            }
        }
        PriceTable::from_series(series)
    }
}

pub struct MockCatalog(pub Vec<String>);

impl InstrumentCatalog for MockCatalog {
    fn list(&self) -> Result<Vec<InstrumentId>, PricelensError> {
        Ok(self.0.iter().map(|c| InstrumentId::from(c.as_str())).collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn id(code: &str) -> InstrumentId {
    InstrumentId::from(code)
}

pub fn set(codes: &[&str]) -> InstrumentSet {
    codes.iter().copied().collect()
}

/// Consecutive daily closes starting at `start`.
pub fn series(start: NaiveDate, closes: &[f64]) -> Vec<(NaiveDate, f64)> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| (start + chrono::Duration::days(i as i64), *close))
        .collect()
}

/// Dates D1..D5 = 2024-01-01..05, X = [10, 12, 11, 13, 15].
pub fn sample_table() -> PriceTable {
    PriceTable::from_series(vec![(
        id("X"),
        series(date(2024, 1, 1), &[10.0, 12.0, 11.0, 13.0, 15.0]),
    )])
    .unwrap()
}

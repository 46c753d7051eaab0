//! Memoizing cache in front of a [`MarketDataFetcher`].
//!
//! Cache-aside: look the key up, on a miss call the fetcher, store, return.
//! Misses on the same key are serialized through a per-key in-flight lock so
//! the fetcher runs at most once per key while a result is pending. Failed
//! fetches are never stored; the next call for that key fetches again.

use crate::domain::date_range::DateRange;
use crate::domain::error::PricelensError;
use crate::domain::instrument::InstrumentSet;
use crate::domain::price_table::PriceTable;
use crate::ports::cache_store_port::CacheStore;
use crate::ports::market_data_port::MarketDataFetcher;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one fetch: canonical instrument set plus requested range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub instruments: InstrumentSet,
    pub range: DateRange,
}

impl FetchKey {
    pub fn new(instruments: InstrumentSet, range: DateRange) -> Self {
        Self { instruments, range }
    }
}

/// Every call is counted once, as a hit or as a miss; a caller that waited
/// on another's fetch and then found the table counts as a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub failures: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
}

type Slot = Arc<Mutex<()>>;

pub struct FetchCache<F, S> {
    fetcher: F,
    store: Mutex<S>,
    in_flight: Mutex<HashMap<FetchKey, Slot>>,
    counters: Counters,
}

impl<F, S> FetchCache<F, S>
where
    F: MarketDataFetcher,
    S: CacheStore,
{
    pub fn new(fetcher: F, store: S) -> Self {
        Self {
            fetcher,
            store: Mutex::new(store),
            in_flight: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Returns the table for `(instruments, range)`, fetching it on first use.
    ///
    /// Any fetcher failure, or an empty table, surfaces as
    /// [`PricelensError::DataUnavailable`] and leaves the key uncached.
    pub fn get_prices(
        &self,
        instruments: &InstrumentSet,
        range: DateRange,
    ) -> Result<Arc<PriceTable>, PricelensError> {
        let key = FetchKey::new(instruments.clone(), range);

        if let Some(table) = self.lookup(&key) {
            return Ok(table);
        }

        let slot = self.in_flight.lock().entry(key.clone()).or_default().clone();
        let result = {
            let _pending = slot.lock();
            // A concurrent caller may have filled the key while we waited.
            match self.lookup(&key) {
                Some(table) => Ok(table),
                None => {
                    self.counters.misses.fetch_add(1, Ordering::Relaxed);
                    self.fetch_and_store(&key)
                }
            }
        };
        self.release(&key, slot);
        result
    }

    pub fn contains(&self, key: &FetchKey) -> bool {
        self.store.lock().get(key).is_some()
    }

    pub fn invalidate(&self, key: &FetchKey) -> bool {
        self.store.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.store.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, key: &FetchKey) -> Option<Arc<PriceTable>> {
        let table = self.store.lock().get(key)?;
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(instruments = %key.instruments.joined(), range = %key.range, "cache hit");
        Some(table)
    }

    fn fetch_and_store(&self, key: &FetchKey) -> Result<Arc<PriceTable>, PricelensError> {
        tracing::info!(
            instruments = key.instruments.len(),
            range = %key.range,
            "fetching prices"
        );
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);

        let table = match self.fetcher.fetch(&key.instruments, key.range) {
            Ok(table) => table,
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "fetch failed");
                return Err(unavailable(key, e));
            }
        };

        let table = self.restrict_to_request(key, table);
        if table.is_empty() {
            self.counters.failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(instruments = %key.instruments.joined(), "fetch returned no data");
            return Err(PricelensError::DataUnavailable {
                instruments: key.instruments.joined(),
                reason: "fetcher returned no data".into(),
            });
        }

        let table = Arc::new(table);
        self.store.lock().insert(key.clone(), Arc::clone(&table));
        Ok(table)
    }

    fn restrict_to_request(&self, key: &FetchKey, table: PriceTable) -> PriceTable {
        let extra: Vec<_> = table
            .instruments()
            .filter(|id| !key.instruments.contains(id))
            .map(ToString::to_string)
            .collect();
        if extra.is_empty() {
            return table;
        }
        tracing::warn!(dropped = %extra.join(","), "fetcher returned unrequested columns");
        table.retain_columns(|id| key.instruments.contains(id))
    }

    fn release(&self, key: &FetchKey, slot: Slot) {
        let mut in_flight = self.in_flight.lock();
        // Slots are only cloned or dropped under this lock, so a count of one
        // means the map holds the last reference and nobody is waiting.
        drop(slot);
        if in_flight
            .get(key)
            .is_some_and(|current| Arc::strong_count(current) == 1)
        {
            in_flight.remove(key);
        }
    }
}

fn unavailable(key: &FetchKey, err: PricelensError) -> PricelensError {
    match err {
        PricelensError::DataUnavailable { .. } => err,
        other => PricelensError::DataUnavailable {
            instruments: key.instruments.joined(),
            reason: other.to_string(),
        },
    }
}

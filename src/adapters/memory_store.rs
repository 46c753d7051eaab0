//! Unbounded in-memory cache store.

use crate::domain::fetch_cache::FetchKey;
use crate::domain::price_table::PriceTable;
use crate::ports::cache_store_port::CacheStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Plain `HashMap` store with no eviction. Lives as long as the session.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: HashMap<FetchKey, Arc<PriceTable>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for InMemoryStore {
    fn get(&self, key: &FetchKey) -> Option<Arc<PriceTable>> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: FetchKey, table: Arc<PriceTable>) {
        self.entries.insert(key, table);
    }

    fn remove(&mut self, key: &FetchKey) -> Option<Arc<PriceTable>> {
        self.entries.remove(key)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

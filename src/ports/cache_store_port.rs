//! Key-value store behind the fetch cache.

use crate::domain::fetch_cache::FetchKey;
use crate::domain::price_table::PriceTable;
use std::sync::Arc;

/// Storage for fetched tables. The cache serializes access, so
/// implementations need no locking of their own.
pub trait CacheStore: Send {
    fn get(&self, key: &FetchKey) -> Option<Arc<PriceTable>>;
    fn insert(&mut self, key: FetchKey, table: Arc<PriceTable>);
    fn remove(&mut self, key: &FetchKey) -> Option<Arc<PriceTable>>;
    fn clear(&mut self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

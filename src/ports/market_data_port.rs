//! Market data access port.

use crate::domain::date_range::DateRange;
use crate::domain::error::PricelensError;
use crate::domain::instrument::InstrumentSet;
use crate::domain::price_table::PriceTable;

/// Bulk closing-price source. Implementations may block on I/O.
///
/// The returned table should only carry columns for `instruments`; callers
/// going through the fetch cache get extra columns dropped.
pub trait MarketDataFetcher: Send + Sync {
    fn fetch(
        &self,
        instruments: &InstrumentSet,
        range: DateRange,
    ) -> Result<PriceTable, PricelensError>;
}

impl<T: MarketDataFetcher + ?Sized> MarketDataFetcher for std::sync::Arc<T> {
    fn fetch(
        &self,
        instruments: &InstrumentSet,
        range: DateRange,
    ) -> Result<PriceTable, PricelensError> {
        (**self).fetch(instruments, range)
    }
}

//! One interactive viewing session: catalog, fetch cache and the
//! filter/performance pipeline behind a single entry point.

use crate::domain::date_range::DateRange;
use crate::domain::error::PricelensError;
use crate::domain::fetch_cache::FetchCache;
use crate::domain::filter::{filter, ColumnSelection, FilteredView};
use crate::domain::instrument::{InstrumentId, InstrumentSet};
use crate::domain::performance::{compute, PerformanceReport};
use crate::domain::price_table::PriceTable;
use crate::ports::cache_store_port::CacheStore;
use crate::ports::catalog_port::InstrumentCatalog;
use crate::ports::market_data_port::MarketDataFetcher;
use chrono::NaiveDate;
use std::sync::Arc;

/// What the user picked. An empty pick is `None`, never an implicit "all".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    None,
    All,
    Only(InstrumentSet),
}

impl Selection {
    /// Maps a raw multi-select value: nothing picked means nothing shown.
    pub fn from_picked(picked: InstrumentSet) -> Self {
        if picked.is_empty() {
            Selection::None
        } else {
            Selection::Only(picked)
        }
    }
}

/// Open-ended view window; a missing side snaps to the table's bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Window {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn resolve(&self, bounds: DateRange) -> DateRange {
        DateRange::new(
            self.from.unwrap_or(bounds.start),
            self.to.unwrap_or(bounds.end),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    NoSelection,
    NoDataInRange { range: Option<DateRange> },
    Ready {
        view: FilteredView,
        report: PerformanceReport,
    },
}

pub struct Session<F, S> {
    instruments: Vec<InstrumentId>,
    universe: InstrumentSet,
    fetch_range: DateRange,
    cache: FetchCache<F, S>,
}

impl<F, S> Session<F, S>
where
    F: MarketDataFetcher,
    S: CacheStore,
{
    /// Loads the catalog; prices are fetched lazily on first use.
    pub fn open(
        catalog: &dyn InstrumentCatalog,
        cache: FetchCache<F, S>,
        fetch_range: DateRange,
    ) -> Result<Self, PricelensError> {
        let instruments = catalog.list()?;
        let universe = instruments.iter().cloned().collect();
        Ok(Self {
            instruments,
            universe,
            fetch_range,
            cache,
        })
    }

    /// Catalog instruments in catalog order.
    pub fn instruments(&self) -> &[InstrumentId] {
        &self.instruments
    }

    pub fn cache(&self) -> &FetchCache<F, S> {
        &self.cache
    }

    /// Picked codes that are not in the catalog, in sorted order.
    pub fn unknown(&self, selection: &Selection) -> Vec<InstrumentId> {
        match selection {
            Selection::Only(set) => set
                .iter()
                .filter(|id| !self.universe.contains(id))
                .cloned()
                .collect(),
            Selection::None | Selection::All => Vec::new(),
        }
    }

    /// Prices for the whole catalog over the fetch range, memoized.
    pub fn prices(&self) -> Result<Arc<PriceTable>, PricelensError> {
        self.cache.get_prices(&self.universe, self.fetch_range)
    }

    /// First and last dates with data; what a date slider spans.
    pub fn bounds(&self) -> Result<Option<DateRange>, PricelensError> {
        let table = self.prices()?;
        Ok(table
            .first_date()
            .zip(table.last_date())
            .map(|(start, end)| DateRange::new(start, end)))
    }

    pub fn view(
        &self,
        selection: &Selection,
        window: Window,
    ) -> Result<ViewOutcome, PricelensError> {
        let columns = match selection {
            Selection::None => return Ok(ViewOutcome::NoSelection),
            Selection::All => ColumnSelection::All,
            Selection::Only(set) => ColumnSelection::Only(set.clone()),
        };
        let unknown = self.unknown(selection);
        if !unknown.is_empty() {
            let codes: Vec<_> = unknown.iter().map(InstrumentId::as_str).collect();
            tracing::warn!(codes = %codes.join(","), "selected instruments not in catalog");
        }

        let table = self.prices()?;
        let bounds = match (table.first_date(), table.last_date()) {
            (Some(start), Some(end)) => DateRange::new(start, end),
            _ => return Ok(ViewOutcome::NoDataInRange { range: None }),
        };
        let range = window.resolve(bounds);

        let view = filter(&table, range, &columns);
        if view.is_empty() || !view.table().has_observations() {
            tracing::debug!(%range, "no data in window");
            return Ok(ViewOutcome::NoDataInRange { range: Some(range) });
        }

        let report = compute(&view);
        Ok(ViewOutcome::Ready { view, report })
    }
}

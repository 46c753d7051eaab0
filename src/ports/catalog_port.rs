//! Instrument catalog port.

use crate::domain::error::PricelensError;
use crate::domain::instrument::InstrumentId;

/// Supplies the ordered list of instruments a user may pick from.
pub trait InstrumentCatalog {
    fn list(&self) -> Result<Vec<InstrumentId>, PricelensError>;
}

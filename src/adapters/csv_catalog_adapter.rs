//! Instrument catalog read from a delimited index-composition file.
//!
//! The file lists bare ticker codes in one column (e.g. `Código;Ação;Tipo`);
//! each code gets the exchange suffix appended (`PETR4` -> `PETR4.SA`).

use crate::domain::error::PricelensError;
use crate::domain::instrument::InstrumentId;
use crate::ports::catalog_port::InstrumentCatalog;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CsvCatalogAdapter {
    pub path: PathBuf,
    pub delimiter: u8,
    pub code_column: String,
    pub suffix: String,
}

impl CsvCatalogAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            delimiter: b';',
            code_column: "Código".to_string(),
            suffix: ".SA".to_string(),
        }
    }
}

impl InstrumentCatalog for CsvCatalogAdapter {
    fn list(&self) -> Result<Vec<InstrumentId>, PricelensError> {
        let catalog_err = |reason: String| PricelensError::Catalog { reason };

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| catalog_err(format!("failed to open {}: {}", self.path.display(), e)))?;

        let headers = rdr
            .headers()
            .map_err(|e| catalog_err(format!("header error: {}", e)))?;
        let code_idx = headers
            .iter()
            .position(|h| h.trim().trim_start_matches('\u{feff}') == self.code_column)
            .ok_or_else(|| catalog_err(format!("missing {} column", self.code_column)))?;

        let mut seen = HashSet::new();
        let mut instruments = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| catalog_err(format!("parse error: {}", e)))?;
            let code = record.get(code_idx).unwrap_or("").trim();
            if code.is_empty() {
                continue;
            }
            let id = InstrumentId::new(format!("{}{}", code, self.suffix));
            if seen.insert(id.clone()) {
                instruments.push(id);
            }
        }

        tracing::info!(count = instruments.len(), path = %self.path.display(), "catalog loaded");
        Ok(instruments)
    }
}

//! Application settings built from the INI configuration.
//!
//! ```ini
//! [catalog]
//! path = IBOV.csv
//! delimiter = semicolon
//! code_column = Código
//! suffix = .SA
//!
//! [prices]
//! dir = data/
//!
//! [range]
//! start_date = 2018-01-01
//! end_date = 2024-07-01
//!
//! [view]
//! show_table = true
//! ```

use crate::domain::date_range::DateRange;
use crate::domain::error::PricelensError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;

pub const DEFAULT_START_DATE: &str = "2018-01-01";
pub const DEFAULT_END_DATE: &str = "2024-07-01";
pub const DEFAULT_DELIMITER: u8 = b';';
pub const DEFAULT_CODE_COLUMN: &str = "Código";
pub const DEFAULT_SUFFIX: &str = ".SA";

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSettings {
    pub path: PathBuf,
    pub delimiter: u8,
    pub code_column: String,
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub prices_dir: PathBuf,
    /// Range requested from the fetcher; the view window is narrowed from it.
    pub fetch_range: DateRange,
    pub show_table: bool,
}

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PricelensError> {
        let catalog_path = require(config, "catalog", "path")?;
        let prices_dir = require(config, "prices", "dir")?;

        let delimiter = match config.get_nonempty("catalog", "delimiter") {
            Some(raw) => parse_delimiter(&raw).ok_or_else(|| PricelensError::ConfigInvalid {
                section: "catalog".into(),
                key: "delimiter".into(),
                reason: format!("unsupported delimiter {:?}", raw),
            })?,
            None => DEFAULT_DELIMITER,
        };
        let code_column = config
            .get_nonempty("catalog", "code_column")
            .unwrap_or_else(|| DEFAULT_CODE_COLUMN.to_string());
        // A blank suffix means bare codes.
        let suffix = config
            .get_string("catalog", "suffix")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string());

        let start = date_or_default(config, "start_date", DEFAULT_START_DATE)?;
        let end = date_or_default(config, "end_date", DEFAULT_END_DATE)?;
        if start > end {
            return Err(PricelensError::ConfigInvalid {
                section: "range".into(),
                key: "start_date".into(),
                reason: "start_date must not be after end_date".into(),
            });
        }

        Ok(Settings {
            catalog: CatalogSettings {
                path: PathBuf::from(catalog_path),
                delimiter,
                code_column,
                suffix,
            },
            prices_dir: PathBuf::from(prices_dir),
            fetch_range: DateRange::new(start, end),
            show_table: config.get_bool("view", "show_table", true),
        })
    }
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, PricelensError> {
    config
        .get_nonempty(section, key)
        .ok_or_else(|| PricelensError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })
}

fn date_or_default(
    config: &dyn ConfigPort,
    key: &str,
    default: &str,
) -> Result<NaiveDate, PricelensError> {
    let raw = config
        .get_nonempty("range", key)
        .unwrap_or_else(|| default.to_string());
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| PricelensError::ConfigInvalid {
        section: "range".into(),
        key: key.into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

/// Accepts a named delimiter or any single ASCII character.
pub fn parse_delimiter(raw: &str) -> Option<u8> {
    match raw.to_lowercase().as_str() {
        "semicolon" => Some(b';'),
        "comma" => Some(b','),
        "tab" => Some(b'\t'),
        "pipe" => Some(b'|'),
        other if other.len() == 1 && other.is_ascii() => other.bytes().next(),
        _ => None,
    }
}

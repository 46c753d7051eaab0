//! Core domain types and logic.

pub mod date_range;
pub mod error;
pub mod fetch_cache;
pub mod filter;
pub mod instrument;
pub mod performance;
pub mod price_table;
pub mod session;
pub mod settings;

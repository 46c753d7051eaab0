//! Port traits the domain consumes; adapters implement them.

pub mod cache_store_port;
pub mod catalog_port;
pub mod config_port;
pub mod market_data_port;

//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_catalog_adapter;
pub mod file_config_adapter;
pub mod memory_store;

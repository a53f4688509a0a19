//! Concrete adapter implementations for ports.

#[cfg(feature = "sqlite")]
pub mod sqlite_store_adapter;
pub mod candle_file_adapter;
pub mod console_notify_adapter;
pub mod console_report_adapter;
pub mod diagnostics;
pub mod file_config_adapter;
pub mod snapshot_file_adapter;

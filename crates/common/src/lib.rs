//! webtrees common library
//!
//! Shared code for the webtrees services:
//! - GEDCOM fact parsing and the record model (media, media files, individuals)
//! - Record lookup and visibility rules
//! - Storage traits with SeaORM and in-memory implementations
//! - Dashboard blocks and their HTML views
//! - Error types, configuration, authentication helpers and metrics

pub mod auth;
pub mod blocks;
pub mod config;
pub mod db;
pub mod errors;
pub mod gedcom;
pub mod metrics;
pub mod privacy;
pub mod records;
pub mod store;
pub mod views;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};
pub use records::{Media, MediaFile, Record, RecordResolver};
pub use store::{RecordStore, SettingStore};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

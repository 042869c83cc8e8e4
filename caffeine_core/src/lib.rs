#![forbid(unsafe_code)]

//! Core domain model and estimation engine for the caffeine tracker.
//!
//! This crate provides:
//! - Domain types (intake records, user profile)
//! - Half-life decay model and aggregation
//! - Caffeine state classification
//! - Record and profile stores (JSON files)
//! - Drink preset catalog, timeline sampling, CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod decay;
pub mod aggregate;
pub mod status;
pub mod engine;
pub mod timeline;
pub mod catalog;
pub mod input;
pub mod records;
pub mod profile;
pub mod export;

#[cfg(test)]
mod test_zone;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use aggregate::{
    bedtime_reference_instant, bedtime_residual_estimate_mg, latest_intake_instant,
    latest_intake_mg_per_kg, today_records, today_total_mg, total_residual_at,
};
pub use catalog::{get_default_catalog, Catalog, DrinkCatalogItem, DrinkCategory};
pub use decay::residual_at;
pub use engine::{evaluate, CaffeineReport};
pub use profile::{JsonProfileStore, MemoryProfileStore, ProfileStore};
pub use records::{JsonRecordStore, MemoryRecordStore, RecordStore};
pub use status::{classify, CaffeineState, CaffeineStatusSnapshot, WarningLevel};
pub use timeline::{build_timeline, TimelinePoint, TimelineWindow};

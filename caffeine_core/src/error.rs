//! Error types for the caffeine_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for caffeine_core operations
///
/// The estimation engine itself never produces one of these; they come from
/// persistence, configuration and user input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Rejected user input (amounts, times, profile values)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record store error
    #[error("Record error: {0}")]
    Record(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

//! Waymark: a resumable redirect-resolving harvester
//!
//! This crate walks a paginated listing, follows each row's popup link through
//! its redirect chain to a stable final URL, and then fetches the content of
//! every resolved URL in checkpointed batches with incremental reports.

pub mod batch;
pub mod clock;
pub mod config;
pub mod driver;
pub mod enumerator;
pub mod fetch;
pub mod harvest;
pub mod model;
pub mod output;
pub mod resolver;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Waymark operations
#[derive(Debug, Error)]
pub enum WaymarkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser driver error: {0}")]
    Driver(#[from] driver::DriverError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Manifest not found at {0}")]
    MissingManifest(String),

    #[error("No readable checkpoint in {0}")]
    MissingCheckpoint(String),

    #[error("No run directory under {0}")]
    NoRuns(String),

    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(usize),

    #[error("Checkpoint expects {expected} records but {found} were given")]
    RecordCountMismatch { expected: usize, found: usize },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Waymark operations
pub type Result<T> = std::result::Result<T, WaymarkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use batch::{BatchPlan, BatchRunner, RunContext};
pub use config::Config;
pub use model::{BatchResult, RedirectTrace, ResultLog, UrlRecord};
pub use resolver::RedirectResolver;
pub use state::{ErrorKind, ResolvePhase};
pub use storage::{CheckpointState, CheckpointStore, JsonCheckpointStore, Manifest};

//! Configuration module for Waymark
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use waymark::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("waymark.toml")).unwrap();
//! println!("Batches of {} records", config.batch.batch_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BatchConfig, BrowserConfig, Config, FetchConfig, FetchMode, ListingConfig, OutputConfig,
    ResolverConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;

//! Configuration module for Query-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and layering command-line overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use query_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Fetching at most {} pages per query", config.campaign.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BackendConfig, CampaignConfig, Config, ModifiersConfig, OutputConfig, PacingConfig,
    RetryConfig, SearchConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, parse_config, resolve_config, ConfigOverrides,
};
pub use validation::validate;

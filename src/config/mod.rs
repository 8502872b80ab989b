//! Configuration module for archive-tree
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use archive_tree::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("archive-tree.toml")).unwrap();
//! println!("Cache TTL: {}s", config.cache.ttl_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CacheBackend, CacheConfig, Config, HttpConfig, SourcesConfig, DEFAULT_ITKC_BASE_URL,
    DEFAULT_SILLOK_BASE_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;

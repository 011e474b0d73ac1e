//! Tagwalk Core Components
//!
//! This crate provides configuration loading for tagwalk: the optional YAML
//! config file, merging with command-line flags, and conversion into the
//! indexer's scan options.

mod config;
mod error;

pub use config::{default_config_path, CliOverrides, TagsConfig};
pub use error::ConfigError;

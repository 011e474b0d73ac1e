//! Core error types for tagwalk.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for the config schema
    #[error("Invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A value is out of range
    #[error("Invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

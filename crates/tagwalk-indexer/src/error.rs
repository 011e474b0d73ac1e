//! Indexer error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a tag file.
#[derive(Debug, Error)]
pub enum TagsError {
    /// I/O error on the tag file sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file could not be opened
    #[error("Error opening file '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a source file failed part way through
    #[error("Error reading file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A root path cannot be walked at all
    #[error("Cannot walk {path}: {message}")]
    Traversal { path: PathBuf, message: String },

    /// A rule pattern failed to compile
    #[error("Invalid pattern for {language} rule `{pattern}`: {source}")]
    Pattern {
        language: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An exclude glob failed to compile
    #[error("Invalid exclude pattern `{pattern}`: {source}")]
    Exclude {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The background scan task died
    #[error("Scan task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for TagsError {
    fn from(e: tokio::task::JoinError) -> Self {
        TagsError::Task(e.to_string())
    }
}

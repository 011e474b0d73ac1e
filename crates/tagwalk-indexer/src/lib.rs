//! Tagwalk Indexer
//!
//! This crate provides the tag extraction engine for tagwalk, including:
//! - A line reader that tracks line numbers and byte offsets
//! - Per-language regex rule sets and an extension catalog
//! - Per-file tag accumulation and the etags block serializer
//! - A scan engine with ordered concurrent scanning
//! - A sorted directory walker with exclude filters

mod error;
pub mod rules;
pub mod scanner;
pub mod source;
pub mod tag;
pub mod writer;

pub use error::TagsError;
pub use rules::{normalize_extension, RuleCatalog, RulePattern, RuleSet};
pub use scanner::{
    tag_file, ExcludeFilter, FileOutcome, ScanEngine, ScanOptions, ScanSummary, SkipReason, Walker,
    MAX_JOBS,
};
pub use source::{Line, LineSource, SourceLocation};
pub use tag::{LocatorPolicy, TagAccumulator, TagEntry};
pub use writer::TagFileWriter;

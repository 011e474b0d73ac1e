//! Pattern rules that recognise symbol-defining lines.
//!
//! Each supported language has a [`RuleSet`]: an ordered list of regular
//! expressions, each paired with a function pulling the symbol name out of
//! the match. The [`RuleCatalog`] maps file extensions onto rule sets.

mod catalog;
mod languages;

pub use catalog::{normalize_extension, RuleCatalog};
pub use languages::{LanguageRules, BUILTIN_LANGUAGES};

use crate::source::SourceLocation;
use crate::tag::{trim_cr, TagAccumulator};
use crate::TagsError;
use regex::bytes::{Captures, Regex};
use std::fmt;
use std::sync::Arc;

/// Pulls a symbol name out of a successful match.
pub type NameExtractor = Arc<dyn Fn(&Captures<'_>) -> Option<Vec<u8>> + Send + Sync>;

/// Extractor returning the text of capture group `index`.
pub fn capture_group(index: usize) -> NameExtractor {
    Arc::new(move |caps: &Captures<'_>| caps.get(index).map(|m| m.as_bytes().to_vec()))
}

/// A single compiled matcher plus its name extractor.
#[derive(Clone)]
pub struct RulePattern {
    regex: Regex,
    extractor: NameExtractor,
}

impl RulePattern {
    /// Compile `pattern`, taking the name from capture group `group`.
    pub fn new(pattern: &str, group: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            extractor: capture_group(group),
        })
    }

    /// Compile `pattern` with a custom extractor.
    pub fn with_extractor<F>(pattern: &str, extractor: F) -> Result<Self, regex::Error>
    where
        F: Fn(&Captures<'_>) -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        Ok(Self {
            regex: Regex::new(pattern)?,
            extractor: Arc::new(extractor),
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Match `line` and extract a non-empty name.
    pub fn extract(&self, line: &[u8]) -> Option<Vec<u8>> {
        let caps = self.regex.captures(line)?;
        (self.extractor)(&caps).filter(|name| !name.is_empty())
    }
}

impl fmt::Debug for RulePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RulePattern")
            .field("regex", &self.regex.as_str())
            .finish_non_exhaustive()
    }
}

/// Ordered rules for one language.
#[derive(Debug, Clone)]
pub struct RuleSet {
    language: String,
    patterns: Vec<RulePattern>,
    reserved: Vec<Vec<u8>>,
}

impl RuleSet {
    pub fn new(language: impl Into<String>, patterns: Vec<RulePattern>) -> Self {
        Self {
            language: language.into(),
            patterns,
            reserved: Vec::new(),
        }
    }

    /// Reject these names; a pattern producing one falls through to the next.
    pub fn with_reserved(mut self, words: &[&str]) -> Self {
        self.reserved = words.iter().map(|w| w.as_bytes().to_vec()).collect();
        self
    }

    /// Compile a rule set from `(regex, capture group)` pairs.
    pub fn compile(language: &str, rules: &[(&str, usize)]) -> Result<Self, TagsError> {
        let patterns = rules
            .iter()
            .map(|&(pattern, group)| {
                RulePattern::new(pattern, group).map_err(|source| TagsError::Pattern {
                    language: language.to_string(),
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(language, patterns))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn patterns(&self) -> &[RulePattern] {
        &self.patterns
    }

    /// Name defined by `line`, from the first pattern that yields one.
    pub fn match_line(&self, line: &[u8]) -> Option<Vec<u8>> {
        let line = trim_cr(line);
        self.patterns.iter().find_map(|pattern| {
            pattern
                .extract(line)
                .filter(|name| !self.reserved.contains(name))
        })
    }

    /// Check one line and record at most one tag for it.
    ///
    /// Returns whether a tag was recorded.
    pub fn check_line(
        &self,
        acc: &mut TagAccumulator,
        line: &[u8],
        location: SourceLocation,
    ) -> bool {
        match self.match_line(line) {
            Some(name) => {
                acc.record(name, line, location);
                true
            }
            None => false,
        }
    }
}

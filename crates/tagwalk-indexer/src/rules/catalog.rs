//! Extension to rule set mapping.

use super::languages::BUILTIN_LANGUAGES;
use super::RuleSet;
use crate::TagsError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Files with this exact base name are tagged as Ruby.
const RAKEFILE: &str = "Rakefile";
const RUBY_EXTENSION: &str = ".rb";

/// Normalised lookup key for `path`.
///
/// The key is the lower-cased substring from the final `.` of the base name,
/// dot included. `.rake` files and files named exactly `Rakefile` map to
/// `.rb`.
pub fn normalize_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    if name == RAKEFILE {
        return Some(RUBY_EXTENSION.to_string());
    }

    let dot = name.rfind('.')?;
    let ext = name[dot..].to_lowercase();
    if ext == ".rake" {
        return Some(RUBY_EXTENSION.to_string());
    }
    Some(ext)
}

/// Immutable mapping from normalised extension to rule set.
///
/// Several extensions may share one rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    by_extension: HashMap<String, Arc<RuleSet>>,
}

impl RuleCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile the built-in language tables.
    pub fn builtin() -> Result<Self, TagsError> {
        let mut catalog = Self::new();
        for language in BUILTIN_LANGUAGES {
            let rules = RuleSet::compile(language.name, language.patterns)?
                .with_reserved(language.reserved);
            catalog.register(language.extensions, rules);
        }
        debug!(
            languages = BUILTIN_LANGUAGES.len(),
            extensions = catalog.by_extension.len(),
            "Compiled rule catalog"
        );
        Ok(catalog)
    }

    /// Bind `rules` to every extension in `extensions`.
    ///
    /// Extensions are given with their leading dot, e.g. `".go"`.
    pub fn register(&mut self, extensions: &[&str], rules: RuleSet) -> Arc<RuleSet> {
        let rules = Arc::new(rules);
        for ext in extensions {
            self.by_extension
                .insert(ext.to_lowercase(), Arc::clone(&rules));
        }
        rules
    }

    /// Rule set for `path`, if its extension is known.
    pub fn resolve(&self, path: &Path) -> Option<&Arc<RuleSet>> {
        let ext = normalize_extension(path)?;
        self.by_extension.get(&ext)
    }

    /// Rule set registered under a normalised extension.
    pub fn get(&self, extension: &str) -> Option<&Arc<RuleSet>> {
        self.by_extension.get(extension)
    }

    /// All known extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<_> = self.by_extension.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

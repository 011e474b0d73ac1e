//! Scan engine.
//!
//! Drives a rule set over every line of a file, collects the tags, and
//! submits the file's block to the tag file writer. Files can be scanned
//! concurrently; blocks are always written in traversal order.

mod walker;

pub use walker::{ExcludeFilter, Walker};

use crate::rules::{RuleCatalog, RuleSet};
use crate::source::LineSource;
use crate::tag::{LocatorPolicy, TagAccumulator};
use crate::writer::TagFileWriter;
use crate::TagsError;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, trace, warn};

/// Upper bound on parallel scanning workers.
pub const MAX_JOBS: usize = u16::MAX as usize;

/// Options for a tagging run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Number of files scanned in parallel (1 = sequential, capped at `MAX_JOBS`)
    pub jobs: usize,
    /// Log every tagged file at info level
    pub verbose: bool,
    /// How locator text is derived from matched lines
    pub locator: LocatorPolicy,
    /// Whether to follow symlinks
    pub follow_symlinks: bool,
    /// Whether to honour .gitignore files and skip hidden entries
    pub respect_gitignore: bool,
    /// Globs matched against file base names to skip
    pub exclude: Vec<String>,
    /// Directory base names not to descend into
    pub exclude_dir: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            jobs: num_cpus(),
            verbose: false,
            locator: LocatorPolicy::default(),
            follow_symlinks: false,
            respect_gitignore: false,
            exclude: Vec::new(),
            exclude_dir: Vec::new(),
        }
    }
}

/// Why a file produced no block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No rule set for the file's extension
    NoRuleSet,
    /// The file could not be opened
    OpenFailed,
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Written { tags: usize },
    Skipped(SkipReason),
}

/// Counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Paths handed to the engine
    pub files: usize,
    /// Files that produced a block
    pub tagged: usize,
    /// Files without a rule set
    pub unrecognized: usize,
    /// Files that could not be opened
    pub failed: usize,
    /// Total tag entries written
    pub tags: usize,
    /// Bytes written to the tag file
    pub bytes: u64,
    /// Run duration in milliseconds
    pub duration_ms: u64,
}

/// Extract the tags of one file.
///
/// Returns `Ok(None)` without touching the file when no rule set matches its
/// extension. A read error part way through ends the file early; the tags
/// found up to that point are kept.
pub fn tag_file(
    catalog: &RuleCatalog,
    locator: LocatorPolicy,
    path: &Path,
) -> Result<Option<TagAccumulator>, TagsError> {
    let Some(rules) = catalog.resolve(path) else {
        return Ok(None);
    };

    let source = LineSource::open(path)?;
    let acc = TagAccumulator::with_locator(path, locator);
    Ok(Some(scan_lines(rules, source, acc)))
}

/// Run `rules` over every line of `source`, stopping at the first read error.
fn scan_lines<R: BufRead>(
    rules: &RuleSet,
    mut source: LineSource<R>,
    mut acc: TagAccumulator,
) -> TagAccumulator {
    loop {
        match source.read_line() {
            Ok(Some(line)) => {
                rules.check_line(&mut acc, line.text, line.location);
            }
            Ok(None) => break,
            Err(e) => {
                warn!(path = ?acc.path(), error = %e, "Read failed, keeping tags found so far");
                break;
            }
        }
    }

    trace!(path = ?acc.path(), language = rules.language(), tags = acc.len(), "Scanned file");
    acc
}

/// A finished scan waiting for its turn at the writer.
struct Scanned {
    index: usize,
    path: PathBuf,
    result: Result<Option<TagAccumulator>, TagsError>,
}

/// Turns file paths into tag file blocks.
pub struct ScanEngine<W: Write> {
    catalog: Arc<RuleCatalog>,
    options: ScanOptions,
    writer: TagFileWriter<W>,
    summary: ScanSummary,
    sink_error: Option<TagsError>,
    started: Instant,
}

impl<W: Write> ScanEngine<W> {
    /// Create an engine writing to `sink`.
    pub fn new(catalog: Arc<RuleCatalog>, options: ScanOptions, sink: W) -> Self {
        Self {
            catalog,
            options,
            writer: TagFileWriter::new(sink),
            summary: ScanSummary::default(),
            sink_error: None,
            started: Instant::now(),
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Counters so far.
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    /// Scan one file and write its block. Per-file errors are logged, never
    /// returned.
    pub fn process_file(&mut self, path: &Path) -> FileOutcome {
        let result = tag_file(&self.catalog, self.options.locator, path);
        self.submit(path, result)
    }

    fn submit(
        &mut self,
        path: &Path,
        result: Result<Option<TagAccumulator>, TagsError>,
    ) -> FileOutcome {
        self.summary.files += 1;

        let acc = match result {
            Ok(Some(acc)) => acc,
            Ok(None) => {
                trace!(path = ?path, "No rule set, skipping");
                self.summary.unrecognized += 1;
                return FileOutcome::Skipped(SkipReason::NoRuleSet);
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "Skipping file");
                self.summary.failed += 1;
                return FileOutcome::Skipped(SkipReason::OpenFailed);
            }
        };

        if self.options.verbose {
            info!("{}", path.display());
        } else {
            debug!(path = ?path, tags = acc.len(), "Tagged file");
        }

        let tags = acc.len();
        self.summary.tagged += 1;
        self.summary.tags += tags;

        if self.sink_error.is_none() {
            if let Err(e) = self.writer.write_block(acc) {
                error!(error = %e, "Writing tag file failed");
                self.sink_error = Some(e);
            }
        }

        FileOutcome::Written { tags }
    }

    /// Flush the tag file and hand back the sink with the run's counters.
    pub fn finalize(self) -> Result<(W, ScanSummary), TagsError> {
        if let Some(e) = self.sink_error {
            return Err(e);
        }

        let mut summary = self.summary;
        summary.bytes = self.writer.bytes();
        summary.duration_ms = self.started.elapsed().as_millis() as u64;

        let sink = self.writer.finish()?;

        info!(
            files = summary.files,
            tagged = summary.tagged,
            tags = summary.tags,
            skipped = summary.unrecognized,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "Scan complete"
        );

        Ok((sink, summary))
    }

    /// Submit finished scans in index order, buffering early arrivals.
    fn drain_ordered(mut self, mut rx: mpsc::Receiver<Scanned>) -> Result<(W, ScanSummary), TagsError> {
        let mut pending = BTreeMap::new();
        let mut next = 0;

        while let Some(scanned) = rx.blocking_recv() {
            pending.insert(scanned.index, scanned);
            while let Some(ready) = pending.remove(&next) {
                self.submit(&ready.path, ready.result);
                next += 1;
            }
        }

        if !pending.is_empty() {
            return Err(TagsError::Task(format!(
                "{} scanned files never reached the writer",
                pending.len()
            )));
        }

        self.finalize()
    }
}

impl<W: Write + Send + 'static> ScanEngine<W> {
    /// Scan `paths` and write their blocks in the given order.
    ///
    /// Up to `options.jobs` files are scanned at once on the blocking pool; a
    /// single writer task reorders finished files so the output is identical
    /// to processing them one by one.
    pub async fn scan_all(mut self, paths: Vec<PathBuf>) -> Result<(W, ScanSummary), TagsError> {
        let jobs = self.options.jobs.clamp(1, MAX_JOBS);

        if jobs == 1 {
            return tokio::task::spawn_blocking(move || {
                for path in &paths {
                    self.process_file(path);
                }
                self.finalize()
            })
            .await?;
        }

        debug!(files = paths.len(), jobs, "Starting parallel scan");

        let catalog = Arc::clone(&self.catalog);
        let locator = self.options.locator;

        let (tx, rx) = mpsc::channel(jobs.saturating_mul(2));
        let writer = tokio::task::spawn_blocking(move || self.drain_ordered(rx));

        let semaphore = Arc::new(Semaphore::new(jobs));
        let mut workers = JoinSet::new();

        for (index, path) in paths.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| TagsError::Task(e.to_string()))?;
            let tx = tx.clone();
            let catalog = Arc::clone(&catalog);

            workers.spawn_blocking(move || {
                let result = tag_file(&catalog, locator, &path);
                // The writer only stops receiving once every sender is gone
                let _ = tx.blocking_send(Scanned {
                    index,
                    path,
                    result,
                });
                drop(permit);
            });
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            joined?;
        }

        writer.await?
    }
}

/// Get the number of CPUs available.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

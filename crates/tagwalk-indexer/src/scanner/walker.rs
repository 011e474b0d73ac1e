//! Directory walker with exclude filters.

use super::ScanOptions;
use crate::TagsError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decides which directory entries the walker visits.
///
/// Directories are excluded by exact base name; files by glob against their
/// base name. Roots are never excluded.
#[derive(Debug, Clone)]
pub struct ExcludeFilter {
    dirs: Vec<String>,
    files: GlobSet,
}

impl ExcludeFilter {
    pub fn new(exclude: &[String], exclude_dir: &[String]) -> Result<Self, TagsError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in exclude {
            let glob = Glob::new(pattern).map_err(|source| TagsError::Exclude {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let files = builder.build().map_err(|source| TagsError::Exclude {
            pattern: exclude.join(", "),
            source,
        })?;

        Ok(Self {
            dirs: exclude_dir.to_vec(),
            files,
        })
    }

    /// Whether the walker should visit `entry`.
    pub fn allows(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
        self.allows_name(&entry.file_name().to_string_lossy(), is_dir)
    }

    fn allows_name(&self, name: &str, is_dir: bool) -> bool {
        if is_dir {
            if self.dirs.iter().any(|d| d == name) {
                info!(dir = name, "Excluding dir");
                return false;
            }
            true
        } else {
            !self.files.is_match(name)
        }
    }
}

/// Walks the scan roots in a stable, sorted order.
pub struct Walker {
    roots: Vec<PathBuf>,
    follow_symlinks: bool,
    respect_gitignore: bool,
    filter: Arc<ExcludeFilter>,
}

impl Walker {
    /// Create a walker over `roots` using the filters in `options`.
    pub fn new(roots: Vec<PathBuf>, options: &ScanOptions) -> Result<Self, TagsError> {
        let filter = ExcludeFilter::new(&options.exclude, &options.exclude_dir)?;
        Ok(Self {
            roots,
            follow_symlinks: options.follow_symlinks,
            respect_gitignore: options.respect_gitignore,
            filter: Arc::new(filter),
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Fail if any root is missing or cannot be listed.
    pub fn check_roots(&self) -> Result<(), TagsError> {
        for root in &self.roots {
            let traversal = |e: std::io::Error| TagsError::Traversal {
                path: root.clone(),
                message: e.to_string(),
            };
            let metadata = std::fs::metadata(root).map_err(traversal)?;
            if metadata.is_dir() {
                std::fs::read_dir(root).map_err(traversal)?;
            }
        }
        Ok(())
    }

    /// Call `visit` once for every regular file, in traversal order.
    ///
    /// Returns the number of files visited.
    pub fn walk_with<F>(&self, mut visit: F) -> Result<usize, TagsError>
    where
        F: FnMut(PathBuf),
    {
        self.check_roots()?;

        let mut visited = 0;
        for root in &self.roots {
            let filter = Arc::clone(&self.filter);
            let mut builder = WalkBuilder::new(root);
            builder
                .follow_links(self.follow_symlinks)
                .standard_filters(self.respect_gitignore)
                .sort_by_file_name(|a, b| a.cmp(b))
                .filter_entry(move |entry| filter.allows(entry));

            for result in builder.build() {
                match result {
                    Ok(entry) => {
                        if is_regular_file(&entry) {
                            visit(display_path(entry.path()));
                            visited += 1;
                        }
                    }
                    Err(e) if e.depth() == Some(0) => {
                        return Err(TagsError::Traversal {
                            path: root.clone(),
                            message: e.to_string(),
                        });
                    }
                    Err(e) => {
                        // Don't fail the entire walk for individual errors
                        warn!(root = ?root, error = %e, "Walk error");
                    }
                }
            }
        }

        debug!(count = visited, "Files discovered");
        Ok(visited)
    }

    /// Walk every root and collect the file paths in traversal order.
    pub fn walk(&self) -> Result<Vec<PathBuf>, TagsError> {
        let mut entries = Vec::new();
        self.walk_with(|path| entries.push(path))?;
        Ok(entries)
    }
}

/// Regular files, plus symlinks to regular files when links are not followed.
fn is_regular_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => std::fs::metadata(entry.path())
            .map(|m| m.is_file())
            .unwrap_or(false),
        _ => false,
    }
}

/// Drop leading `./` components so a `.` root yields `src/a.go`.
fn display_path(path: &Path) -> PathBuf {
    path.components()
        .skip_while(|c| matches!(c, Component::CurDir))
        .collect()
}

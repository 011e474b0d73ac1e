//! tagwalk CLI
//!
//! Walks source trees and writes an Emacs TAGS file to the current directory.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tagwalk_core::{CliOverrides, TagsConfig};
use tagwalk_indexer::{RuleCatalog, ScanEngine, ScanOptions, ScanSummary, Walker};
use tempfile::NamedTempFile;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output file, always written to the current directory
const TAGS_FILE: &str = "TAGS";

#[derive(Parser, Debug)]
#[command(name = "tagwalk")]
#[command(about = "Generate an Emacs TAGS file for a source tree")]
#[command(version, disable_version_flag = true)]
struct Cli {
    /// Files or directories to scan (default: current directory)
    paths: Vec<PathBuf>,

    /// Display the version number
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Display files as processed
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Exclude files whose name matches this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Exclude directories with this name (repeatable)
    #[arg(long = "exclude-dir", value_name = "NAME")]
    exclude_dir: Vec<String>,

    /// Number of files to scan in parallel
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    jobs: Option<u16>,

    /// Honour .gitignore files and skip hidden files
    #[arg(long)]
    gitignore: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,

    /// Read settings from this YAML file instead of the user config
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn roots(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        }
    }

    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            exclude: self.exclude.clone(),
            exclude_dir: self.exclude_dir.clone(),
            jobs: self.jobs.map(usize::from),
            respect_gitignore: self.gitignore,
            follow_symlinks: self.follow_symlinks,
            verbose: self.verbose,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => TagsConfig::load_from(path).context("Failed to load config")?,
        None => TagsConfig::load(),
    };
    let options = config.merge_cli(cli.overrides()).scan_options();
    debug!(jobs = options.jobs, roots = ?cli.roots(), "Starting scan");

    run(cli.roots(), options, Path::new(TAGS_FILE)).await?;

    Ok(())
}

/// Crates whose info events `--verbose` turns on, whatever RUST_LOG says
const VERBOSE_DIRECTIVES: [&str; 3] = ["tagwalk=info", "tagwalk_core=info", "tagwalk_indexer=info"];

fn init_logging(verbose: bool) -> Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env.as_deref(), verbose)?)
        .with_target(false)
        .without_time()
        .init();
    Ok(())
}

/// RUST_LOG directives (default `warn`) with the verbose directives layered on top.
fn log_filter(env: Option<&str>, verbose: bool) -> Result<EnvFilter> {
    let mut filter = env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    if verbose {
        for directive in VERBOSE_DIRECTIVES {
            filter = filter.add_directive(directive.parse()?);
        }
    }
    Ok(filter)
}

/// Tag every file under `roots` and atomically replace `output`.
async fn run(roots: Vec<PathBuf>, options: ScanOptions, output: &Path) -> Result<ScanSummary> {
    let catalog = Arc::new(RuleCatalog::builtin().context("Failed to compile tag rules")?);
    let walker = Walker::new(roots, &options)?;

    // Fail before creating any output if a root is unusable
    walker.check_roots()?;

    let temp = create_temp_output(output)?;
    let engine = ScanEngine::new(catalog, options, temp);

    let (temp, summary) = if engine.options().jobs <= 1 {
        tokio::task::spawn_blocking(move || scan_streaming(&walker, engine)).await??
    } else {
        let paths = walker.walk()?;
        engine.scan_all(paths).await?
    };

    temp.persist(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(summary)
}

/// Feed files to the engine as the walker finds them.
fn scan_streaming(
    walker: &Walker,
    mut engine: ScanEngine<NamedTempFile>,
) -> Result<(NamedTempFile, ScanSummary)> {
    walker.walk_with(|path| {
        engine.process_file(&path);
    })?;
    Ok(engine.finalize()?)
}

/// Temporary file next to `output`, renamed over it once the scan succeeds.
fn create_temp_output(output: &Path) -> Result<NamedTempFile> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .context("Failed to set tag file permissions")?;
    }

    Ok(temp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "tagwalk",
            "-V",
            "--exclude",
            "*.min.js",
            "--exclude-dir",
            "vendor",
            "--exclude-dir",
            "target",
            "src",
            "lib",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.exclude, vec!["*.min.js"]);
        assert_eq!(cli.exclude_dir, vec!["vendor", "target"]);
        assert_eq!(cli.roots(), vec![PathBuf::from("src"), PathBuf::from("lib")]);
    }

    #[test]
    fn test_default_root_is_current_dir() {
        let cli = Cli::try_parse_from(["tagwalk"]).unwrap();
        assert_eq!(cli.roots(), vec![PathBuf::from(".")]);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_lowercase_v_prints_version() {
        let err = Cli::try_parse_from(["tagwalk", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_verbose_overrides_env_filter() {
        let filter = log_filter(Some("warn"), true).unwrap().to_string();
        assert!(filter.contains("tagwalk_indexer=info"), "{filter}");

        let quiet = log_filter(Some("warn"), false).unwrap().to_string();
        assert!(!quiet.contains("tagwalk_indexer"), "{quiet}");

        let default = log_filter(None, true).unwrap().to_string();
        assert!(default.contains("warn"), "{default}");
        assert!(default.contains("tagwalk_indexer=info"), "{default}");
    }

    #[test]
    fn test_zero_jobs_rejected() {
        assert!(Cli::try_parse_from(["tagwalk", "-j", "0"]).is_err());
    }

    #[tokio::test]
    async fn test_run_writes_tags_file() {
        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("src");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(src.join("app.py"), "class App:\n    def run(self):\n        pass\n").unwrap();
        std::fs::write(src.join("notes.txt"), "def nothing\n").unwrap();

        let output = temp_dir.path().join("TAGS");
        for jobs in [1, 4] {
            let options = ScanOptions {
                jobs,
                ..ScanOptions::default()
            };
            let summary = run(vec![src.clone()], options, &output).await.unwrap();
            assert_eq!(summary.tagged, 1);
            assert_eq!(summary.tags, 2);

            let data = std::fs::read(&output).unwrap();
            let text = String::from_utf8(data).unwrap();
            assert!(text.starts_with("\x0c\n"));
            assert!(text.contains("class App:\x7fApp\x011,0\n"));
            assert!(text.contains("    def run(self):\x7frun\x012,11\n"));
            assert!(!text.contains("notes.txt"));
        }
    }

    #[tokio::test]
    async fn test_missing_root_leaves_existing_tags() {
        let temp_dir = tempdir().unwrap();
        let output = temp_dir.path().join("TAGS");
        std::fs::write(&output, "previous").unwrap();

        let result = run(
            vec![temp_dir.path().join("missing")],
            ScanOptions::default(),
            &output,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous");
    }
}

//! Configuration for a tagwalk run.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tagwalk_indexer::{LocatorPolicy, ScanOptions, MAX_JOBS};

/// Settings read from the config file and merged with command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsConfig {
    /// File base-name globs to skip
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Directory names not to descend into
    #[serde(default)]
    pub exclude_dir: Vec<String>,

    /// Parallel scanning workers (default: available cores)
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Honour .gitignore files and skip hidden entries
    #[serde(default)]
    pub respect_gitignore: bool,

    /// Follow symbolic links
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Truncate locator text to this many bytes
    #[serde(default)]
    pub max_locator_len: Option<usize>,

    /// Log every tagged file
    #[serde(default)]
    pub verbose: bool,
}

/// Flags given on the command line. They extend or override the file config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub exclude: Vec<String>,
    pub exclude_dir: Vec<String>,
    pub jobs: Option<usize>,
    pub respect_gitignore: bool,
    pub follow_symlinks: bool,
    pub verbose: bool,
}

/// Default location of the user config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tagwalk").join("config.yaml"))
}

impl TagsConfig {
    /// Load the user config file, falling back to defaults
    pub fn load() -> Self {
        let Some(config_path) = default_config_path() else {
            return Self::default();
        };

        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Ignoring config file: {}", e);
                }
            }
        }

        Self::default()
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(jobs) = self.jobs {
            if !(1..=MAX_JOBS).contains(&jobs) {
                return Err(ConfigError::Invalid {
                    field: "jobs",
                    message: format!("must be between 1 and {MAX_JOBS}"),
                });
            }
        }
        if self.max_locator_len == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_locator_len",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply command-line flags on top of this config
    pub fn merge_cli(mut self, cli: CliOverrides) -> Self {
        self.exclude.extend(cli.exclude);
        self.exclude_dir.extend(cli.exclude_dir);
        if cli.jobs.is_some() {
            self.jobs = cli.jobs;
        }
        self.respect_gitignore |= cli.respect_gitignore;
        self.follow_symlinks |= cli.follow_symlinks;
        self.verbose |= cli.verbose;
        self
    }

    /// Build the immutable options the scan engine runs with
    pub fn scan_options(&self) -> ScanOptions {
        let defaults = ScanOptions::default();
        ScanOptions {
            jobs: self.jobs.unwrap_or(defaults.jobs).clamp(1, MAX_JOBS),
            verbose: self.verbose,
            locator: LocatorPolicy {
                max_len: self.max_locator_len,
            },
            follow_symlinks: self.follow_symlinks,
            respect_gitignore: self.respect_gitignore,
            exclude: self.exclude.clone(),
            exclude_dir: self.exclude_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = TagsConfig::default();
        assert!(config.exclude.is_empty());
        assert_eq!(config.jobs, None);
        assert!(!config.respect_gitignore);
    }

    #[test]
    fn test_load_from_yaml() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "exclude:\n  - \"*.min.js\"\nexclude_dir: [vendor, target]\njobs: 2\nmax_locator_len: 120\n",
        )
        .unwrap();

        let config = TagsConfig::load_from(&path).unwrap();
        assert_eq!(config.exclude, vec!["*.min.js"]);
        assert_eq!(config.exclude_dir, vec!["vendor", "target"]);
        assert_eq!(config.jobs, Some(2));
        assert_eq!(config.max_locator_len, Some(120));
        assert!(!config.follow_symlinks);
    }

    #[test]
    fn test_load_from_rejects_bad_yaml() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "jobs: [not, a, number]\n").unwrap();

        let err = TagsConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_rejects_zero_jobs() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "jobs: 0\n").unwrap();

        let err = TagsConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "jobs", .. }));
    }

    #[test]
    fn test_load_from_rejects_huge_jobs() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "jobs: 9223372036854775809\n").unwrap();

        let err = TagsConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "jobs", .. }));

        let capped = TagsConfig {
            jobs: Some(usize::MAX),
            ..TagsConfig::default()
        };
        assert_eq!(capped.scan_options().jobs, MAX_JOBS);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = TagsConfig::load_from(Path::new("/no/such/tagwalk.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_cli_flags_extend_config() {
        let config = TagsConfig {
            exclude_dir: vec!["vendor".to_string()],
            jobs: Some(4),
            ..TagsConfig::default()
        };
        let merged = config.merge_cli(CliOverrides {
            exclude_dir: vec!["node_modules".to_string()],
            jobs: Some(1),
            verbose: true,
            ..CliOverrides::default()
        });

        assert_eq!(merged.exclude_dir, vec!["vendor", "node_modules"]);
        assert_eq!(merged.jobs, Some(1));
        assert!(merged.verbose);
    }

    #[test]
    fn test_scan_options_conversion() {
        let config = TagsConfig {
            exclude: vec!["*.gen.go".to_string()],
            max_locator_len: Some(80),
            respect_gitignore: true,
            ..TagsConfig::default()
        };
        let options = config.scan_options();

        assert!(options.jobs >= 1);
        assert_eq!(options.exclude, vec!["*.gen.go"]);
        assert_eq!(options.locator.max_len, Some(80));
        assert!(options.respect_gitignore);
    }

    #[test]
    fn test_config_serialization() {
        let config = TagsConfig {
            jobs: Some(3),
            ..TagsConfig::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: TagsConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}

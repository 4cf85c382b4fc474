//! Run configuration.
//!
//! Defaults reproduce the directory layout of the scraping project. A TOML
//! file may override any field, and command-line flags override the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_INPUT_DIR: &str = "fourth jsons";
pub const DEFAULT_OUTPUT_DIR: &str = "neo4j_import";
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory holding the question JSON files.
    pub input_dir: PathBuf,
    /// Directory receiving the CSV tables.
    pub output_dir: PathBuf,
    /// Chunk size for `split` and progress-log interval for `export`.
    pub batch_size: usize,
    /// Label table layered over the built-in one.
    pub labels: Option<PathBuf>,
    /// Only read files whose name ends with this, e.g. `-data.json`.
    pub file_suffix: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            batch_size: DEFAULT_BATCH_SIZE,
            labels: None,
            file_suffix: None,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub labels: Option<PathBuf>,
    pub file_suffix: Option<String>,
}

impl ExportConfig {
    /// Parses a TOML config file. Relative paths inside it stay relative to
    /// the working directory.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parse config file {}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Defaults, then the optional file, then the overrides.
    pub fn resolve(config_file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(dir) = overrides.input_dir {
            self.input_dir = dir;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(size) = overrides.batch_size {
            self.batch_size = size;
        }
        if let Some(path) = overrides.labels {
            self.labels = Some(path);
        }
        if let Some(suffix) = overrides.file_suffix {
            self.file_suffix = Some(suffix);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        Ok(())
    }

    /// File-name suffix filter, ignoring a blank value.
    pub fn suffix(&self) -> Option<&str> {
        self.file_suffix.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_project_layout() {
        let config = ExportConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("fourth jsons"));
        assert_eq!(config.output_dir, PathBuf::from("neo4j_import"));
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.suffix(), None);
    }

    #[test]
    fn file_values_sit_under_overrides() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            "input_dir = \"raw\"\nbatch_size = 25\nfile_suffix = \"-data.json\"\n",
        )
        .unwrap();
        let overrides = ConfigOverrides {
            input_dir: Some(PathBuf::from("cleaned")),
            ..ConfigOverrides::default()
        };
        let config = ExportConfig::resolve(Some(file.path()), overrides).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("cleaned"));
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.output_dir, PathBuf::from("neo4j_import"));
        assert_eq!(config.suffix(), Some("-data.json"));
    }

    #[test]
    fn unknown_keys_and_zero_batch_are_rejected() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "input = \"raw\"\n").unwrap();
        assert!(ExportConfig::resolve(Some(file.path()), ConfigOverrides::default()).is_err());

        let overrides = ConfigOverrides {
            batch_size: Some(0),
            ..ConfigOverrides::default()
        };
        assert!(ExportConfig::resolve(None, overrides).is_err());
    }
}

//! Configuration loading and management for changenote-lint
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted to typed settings with embedded defaults
//! - Only the surroundings are configurable: where reports live, how results are shown
//! - The rule set itself is fixed and never read from configuration

use crate::domain::violations::{LintError, LintResult, Severity};
use crate::report::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched in the working directory when no config is given
pub const DEFAULT_CONFIG_FILES: &[&str] =
    &["changenote_lint.yaml", "changenote_lint.yml", ".changenote_lint.yaml"];

const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintConfig {
    /// Configuration format version
    pub version: String,
    /// Where change reports are read from
    #[serde(default)]
    pub data: DataConfig,
    /// Rules document shown by `rules --doc`
    #[serde(default = "default_rules_document")]
    pub rules_document: PathBuf,
    /// Result presentation
    #[serde(default)]
    pub output: OutputConfig,
    /// Batch validation behaviour
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding change report files
    pub directory: PathBuf,
    /// Directory holding the smaller subset of reports
    pub subset_directory: PathBuf,
    /// Glob a file name must match to be listed
    pub file_pattern: String,
    /// Globs of file names to leave out
    pub exclude: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
            subset_directory: PathBuf::from("data").join("subset"),
            file_pattern: "*.json".to_string(),
            exclude: Vec::new(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// One of human, json, junit, github
    pub format: String,
    /// Only show entries holding a violation of exactly this severity
    pub severity_filter: Option<Severity>,
    pub use_colors: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: "human".to_string(), severity_filter: None, use_colors: true }
    }
}

/// Batch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl LintConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> LintResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            LintError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            LintError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> LintResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| LintError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load the first default config file found in `dir`, or defaults
    pub fn discover<P: AsRef<Path>>(dir: P) -> LintResult<Self> {
        for name in DEFAULT_CONFIG_FILES {
            let candidate = dir.as_ref().join(name);
            if candidate.exists() {
                tracing::debug!("Using configuration {}", candidate.display());
                return Self::load_from_file(candidate);
            }
        }

        Ok(Self::default())
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> LintResult<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(LintError::config(format!(
                "Unsupported configuration version: {}. Supported versions: {}",
                self.version,
                SUPPORTED_VERSIONS.join(", ")
            )));
        }

        for pattern in std::iter::once(&self.data.file_pattern).chain(&self.data.exclude) {
            glob::Pattern::new(pattern).map_err(|e| {
                LintError::config(format!("Invalid file pattern '{pattern}': {e}"))
            })?;
        }

        if OutputFormat::from_str(&self.output.format).is_none() {
            return Err(LintError::config(format!(
                "Unknown output format '{}'. Available formats: {}",
                self.output.format,
                OutputFormat::all_formats().join(", ")
            )));
        }

        Ok(())
    }

    /// Configured output format
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_str(&self.output.format).unwrap_or(OutputFormat::Human)
    }

    /// Directory for full or subset reports
    pub fn data_directory(&self, subset: bool) -> &Path {
        if subset {
            &self.data.subset_directory
        } else {
            &self.data.directory
        }
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> LintResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| LintError::config(format!("Failed to serialize config: {e}")))
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            data: DataConfig::default(),
            rules_document: default_rules_document(),
            output: OutputConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

fn default_rules_document() -> PathBuf {
    PathBuf::from("change-notes.md")
}

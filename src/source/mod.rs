//! Access to change report files and the rules document
//!
//! Architecture: Infrastructure Layer - The data source owns every file system concern
//! - Lists report files in the data directory (or its subset) newest first
//! - Resolves requested names without letting them escape the data directory
//! - Reads and parses reports; the engine only ever sees parsed JSON

use crate::config::LintConfig;
use crate::domain::violations::{LintError, LintResult};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Change report files on disk
#[derive(Debug, Clone)]
pub struct DataSource {
    data_dir: PathBuf,
    subset_dir: PathBuf,
    file_pattern: glob::Pattern,
    exclude: Vec<glob::Pattern>,
    rules_document: PathBuf,
}

impl DataSource {
    /// Create a data source from configuration
    pub fn from_config(config: &LintConfig) -> LintResult<Self> {
        let compile = |pattern: &str| {
            glob::Pattern::new(pattern)
                .map_err(|e| LintError::config(format!("Invalid file pattern '{pattern}': {e}")))
        };

        Ok(Self {
            data_dir: config.data.directory.clone(),
            subset_dir: config.data.subset_directory.clone(),
            file_pattern: compile(&config.data.file_pattern)?,
            exclude: config.data.exclude.iter().map(|p| compile(p)).collect::<LintResult<_>>()?,
            rules_document: config.rules_document.clone(),
        })
    }

    /// Directory for full or subset reports
    pub fn directory(&self, subset: bool) -> &Path {
        if subset {
            &self.subset_dir
        } else {
            &self.data_dir
        }
    }

    /// Whether a file name would be listed
    pub fn accepts(&self, file_name: &str) -> bool {
        self.file_pattern.matches(file_name) && !self.exclude.iter().any(|p| p.matches(file_name))
    }

    /// Report file names directly inside the directory, sorted newest first
    pub fn list_files(&self, subset: bool) -> LintResult<Vec<String>> {
        let dir = self.directory(subset);
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| LintError::Io { source: e.into() })?;

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(name) = entry.file_name().to_str() {
                if self.accepts(name) {
                    files.push(name.to_string());
                }
            }
        }

        // Report names carry their date, so reverse name order lists the latest first
        files.sort_unstable_by(|a, b| b.cmp(a));
        tracing::debug!("Found {} report files in {}", files.len(), dir.display());
        Ok(files)
    }

    /// Path of a report, refusing anything outside the data directory
    pub fn resolve(&self, name: &str, subset: bool) -> LintResult<PathBuf> {
        let dir = self.directory(subset);
        let real_dir = dir.canonicalize()?;
        let real_path = dir.join(name).canonicalize()?;

        if !real_path.starts_with(&real_dir) {
            tracing::warn!("Rejected path outside data directory: {}", name);
            return Err(LintError::access_denied(name));
        }

        Ok(real_path)
    }

    /// Read and parse a report
    pub fn load(&self, name: &str, subset: bool) -> LintResult<JsonValue> {
        let path = self.resolve(name, subset)?;
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| LintError::parse(name, e.to_string()))
    }

    /// Text of the rules document
    pub fn rules_document(&self) -> LintResult<String> {
        fs::read_to_string(&self.rules_document).map_err(|e| {
            LintError::config(format!(
                "Failed to read rules document '{}': {}",
                self.rules_document.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source_in(root: &Path, exclude: Vec<String>) -> DataSource {
        let mut config = LintConfig::default();
        config.data.directory = root.join("data");
        config.data.subset_directory = root.join("data").join("subset");
        config.data.exclude = exclude;
        config.rules_document = root.join("change-notes.md");
        DataSource::from_config(&config).unwrap()
    }

    fn setup() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        fs::create_dir_all(data.join("subset")).unwrap();
        fs::write(data.join("2024-01-15.json"), "[]").unwrap();
        fs::write(data.join("2024-03-01.json"), "[]").unwrap();
        fs::write(data.join("2024-02-01.draft.json"), "[]").unwrap();
        fs::write(data.join("notes.txt"), "ignored").unwrap();
        fs::write(data.join("subset").join("2024-01-15.json"), r#"[{"ChangeNote": "x"}]"#).unwrap();
        fs::write(temp_dir.path().join("secret.json"), "[]").unwrap();
        temp_dir
    }

    #[test]
    fn test_list_files_newest_first() {
        let temp_dir = setup();
        let source = source_in(temp_dir.path(), vec![]);

        assert_eq!(
            source.list_files(false).unwrap(),
            vec!["2024-03-01.json", "2024-02-01.draft.json", "2024-01-15.json"]
        );
        assert_eq!(source.list_files(true).unwrap(), vec!["2024-01-15.json"]);
    }

    #[test]
    fn test_exclude_patterns() {
        let temp_dir = setup();
        let source = source_in(temp_dir.path(), vec!["*.draft.json".to_string()]);

        assert_eq!(source.list_files(false).unwrap(), vec!["2024-03-01.json", "2024-01-15.json"]);
        assert!(!source.accepts("2024-02-01.draft.json"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let temp_dir = setup();
        let source = source_in(temp_dir.path(), vec![]);

        assert!(matches!(
            source.resolve("../secret.json", false),
            Err(LintError::AccessDenied { .. })
        ));
        assert!(source.resolve("2024-01-15.json", false).is_ok());
        assert!(matches!(source.resolve("missing.json", false), Err(LintError::Io { .. })));
    }

    #[test]
    fn test_load_parses_or_reports() {
        let temp_dir = setup();
        fs::write(temp_dir.path().join("data").join("bad.json"), "[{").unwrap();
        let source = source_in(temp_dir.path(), vec![]);

        let data = source.load("2024-01-15.json", true).unwrap();
        assert_eq!(data[0]["ChangeNote"], "x");

        let error = source.load("bad.json", false).unwrap_err();
        assert!(matches!(error, LintError::Parse { .. }));
        assert!(error.to_string().contains("bad.json"));
    }

    #[test]
    fn test_rules_document() {
        let temp_dir = setup();
        let source = source_in(temp_dir.path(), vec![]);
        assert!(source.rules_document().is_err());

        fs::write(temp_dir.path().join("change-notes.md"), "# Rules").unwrap();
        assert_eq!(source.rules_document().unwrap(), "# Rules");
    }
}

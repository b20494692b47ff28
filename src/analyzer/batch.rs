//! Batch validation over many change reports
//!
//! Every input is validated in isolation: an unreadable file or malformed
//! content produces a failed result for that input only. Results keep input
//! order whether or not the batch runs in parallel.

use crate::analyzer::ValidationEngine;
use crate::domain::violations::{BatchReport, LintResult, ValidationResult};
use crate::source::DataSource;
use rayon::prelude::*;
use serde_json::Value as JsonValue;
use std::time::Instant;

/// One labeled input whose loading may already have failed
#[derive(Debug)]
pub struct BatchInput {
    pub label: String,
    pub data: LintResult<JsonValue>,
}

impl BatchInput {
    pub fn new(label: impl Into<String>, data: LintResult<JsonValue>) -> Self {
        Self { label: label.into(), data }
    }
}

/// Runs the engine over many inputs
pub struct BatchValidator {
    engine: ValidationEngine,
    parallel: bool,
}

impl BatchValidator {
    pub fn new(engine: ValidationEngine) -> Self {
        Self { engine, parallel: true }
    }

    /// Enable or disable parallel validation
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The engine applied to each input
    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    /// Validate inputs that have already been loaded
    pub fn validate_inputs(&self, inputs: Vec<BatchInput>) -> BatchReport {
        let start_time = Instant::now();

        let results = if self.parallel && inputs.len() > 1 {
            inputs.par_iter().map(|input| self.validate_input(input)).collect()
        } else {
            inputs.iter().map(|input| self.validate_input(input)).collect()
        };

        let mut report = BatchReport::new(results);
        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        report
    }

    /// Load and validate files from a data source.
    ///
    /// An empty `files` list validates every file the source lists.
    pub fn validate_files(
        &self,
        source: &DataSource,
        files: &[String],
        subset: bool,
    ) -> LintResult<BatchReport> {
        let files = if files.is_empty() { source.list_files(subset)? } else { files.to_vec() };
        let start_time = Instant::now();

        let validate = |name: &String| match source.load(name, subset) {
            Ok(data) => self.engine.validate(&data, name),
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", name, e);
                ValidationResult::failed(name.as_str(), e.to_string())
            }
        };

        let results = if self.parallel && files.len() > 1 {
            files.par_iter().map(validate).collect()
        } else {
            files.iter().map(validate).collect()
        };

        let mut report = BatchReport::new(results);
        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        Ok(report)
    }

    fn validate_input(&self, input: &BatchInput) -> ValidationResult {
        match &input.data {
            Ok(data) => self.engine.validate(data, &input.label),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", input.label, e);
                ValidationResult::failed(input.label.as_str(), e.to_string())
            }
        }
    }
}

impl Default for BatchValidator {
    fn default() -> Self {
        Self::new(ValidationEngine::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::INVALID_FORMAT_ERROR;
    use crate::config::LintConfig;
    use crate::domain::violations::LintError;
    use rstest::rstest;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn three_inputs() -> Vec<BatchInput> {
        vec![
            BatchInput::new("first.json", Ok(json!([{"SimCorpReference": "D-1"}]))),
            BatchInput::new("second.json", Ok(json!({"not": "an array"}))),
            BatchInput::new("third.json", Ok(json!([{"ChangeNote": "Improved XYZ"}]))),
        ]
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_malformed_input_does_not_abort_batch(#[case] parallel: bool) {
        let report = BatchValidator::default().with_parallel(parallel).validate_inputs(three_inputs());

        assert_eq!(report.total_files, 3);
        let labels: Vec<_> = report.results.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(labels, vec!["first.json", "second.json", "third.json"]);

        assert_eq!(report.results[0].total_violations, 2);
        assert_eq!(report.results[0].statistics.errors, 1);
        assert_eq!(report.results[0].statistics.info, 1);

        let failed = &report.results[1];
        assert_eq!(failed.error.as_deref(), Some(INVALID_FORMAT_ERROR));
        assert_eq!(failed.total_entries, 0);
        assert_eq!(failed.total_violations, 0);

        assert_eq!(report.results[2].statistics.warnings, 1);
    }

    #[test]
    fn test_load_failure_becomes_failed_result() {
        let inputs = vec![
            BatchInput::new("ok.json", Ok(json!([]))),
            BatchInput::new("broken.json", Err(LintError::parse("broken.json", "EOF while parsing"))),
        ];

        let report = BatchValidator::default().validate_inputs(inputs);

        assert!(report.results[0].error.is_none());
        let error = report.results[1].error.as_deref().unwrap();
        assert!(error.contains("EOF while parsing"));
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_validate_files_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(data_dir.join("2024-01.json"), r#"[{"ChangeNote": "Fine text"}]"#).unwrap();
        fs::write(data_dir.join("2024-02.json"), "{ not json").unwrap();
        fs::write(data_dir.join("2024-03.json"), r#"{"entries": []}"#).unwrap();

        let mut config = LintConfig::default();
        config.data.directory = data_dir;
        let source = DataSource::from_config(&config).unwrap();

        let report = BatchValidator::default().validate_files(&source, &[], false).unwrap();

        let labels: Vec<_> = report.results.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(labels, vec!["2024-03.json", "2024-02.json", "2024-01.json"]);
        assert_eq!(report.results[0].error.as_deref(), Some(INVALID_FORMAT_ERROR));
        assert!(report.results[1].is_failure());
        assert!(!report.results[2].is_failure());
        assert_eq!(report.results[2].total_entries, 1);
        assert_eq!(report.results[2].total_violations, 0);
    }

    #[test]
    fn test_explicit_missing_file_is_isolated() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.json"), "[]").unwrap();

        let mut config = LintConfig::default();
        config.data.directory = temp_dir.path().to_path_buf();
        let source = DataSource::from_config(&config).unwrap();

        let files = vec!["a.json".to_string(), "missing.json".to_string()];
        let report = BatchValidator::default().validate_files(&source, &files, false).unwrap();

        assert_eq!(report.total_files, 2);
        assert!(!report.results[0].is_failure());
        assert!(report.results[1].is_failure());
    }
}

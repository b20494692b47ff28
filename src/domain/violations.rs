//! Core domain models for change note violations and validation results
//!
//! Architecture: Rich Domain Models - Results derive their statistics from their violations
//! - EntryViolations groups every violation of one entry, in rule order
//! - ValidationResult acts as the aggregate root for one change report
//! - BatchReport collects independently validated reports, failures included

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity levels for change note violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Hints that an entry may need a second look
    Info,
    /// Content that should be reviewed before publishing
    Warning,
    /// Content that must not be published as is
    Error,
}

impl Severity {
    /// Whether this severity level should fail a check
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Convert to string for display
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(LintError::config(format!("Unknown severity '{other}'"))),
        }
    }
}

/// Entry field a violation points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum EntryField {
    ChangeNote,
    CustomerApplyNote,
}

impl EntryField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChangeNote => "ChangeNote",
            Self::CustomerApplyNote => "CustomerApplyNote",
        }
    }
}

/// A single rule failure on one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Severity level of this violation
    pub severity: Severity,
    /// Identifier of the rule that fired
    pub rule: String,
    /// Field that triggered the rule
    pub field: EntryField,
    /// Human-readable explanation, including matched text where relevant
    pub message: String,
    /// Reference of the offending entry
    pub reference: String,
    /// Matched substrings, for rules that extract examples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl Violation {
    /// Create a new violation
    pub fn new(
        rule: impl Into<String>,
        severity: Severity,
        field: EntryField,
        message: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            rule: rule.into(),
            field,
            message: message.into(),
            reference: reference.into(),
            details: None,
        }
    }

    /// Attach the matched substrings
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }

    /// Whether this violation is blocking
    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }

    /// Format violation for display
    pub fn format_display(&self) -> String {
        format!(
            "{} [{}] {}: {}",
            self.reference,
            self.severity.as_str(),
            self.rule,
            self.message
        )
    }
}

/// Count of violations by severity level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub errors: usize,
    #[serde(default)]
    pub warnings: usize,
    #[serde(default)]
    pub info: usize,
}

impl Statistics {
    /// Total number of violations across all severities
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.info
    }

    /// Count for a single severity
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.errors,
            Severity::Warning => self.warnings,
            Severity::Info => self.info,
        }
    }

    /// Add a violation to the counts
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => self.info += 1,
        }
    }

    /// Add another set of counts to this one
    pub fn merge(&mut self, other: &Statistics) {
        self.errors += other.errors;
        self.warnings += other.warnings;
        self.info += other.info;
    }
}

/// All violations of one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryViolations {
    /// Zero-based position of the entry in its report
    pub entry_index: usize,
    /// Reference exactly as the entry carried it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Snapshot of the change note, or `"(empty)"`
    pub change_note: String,
    /// Violations in rule order
    pub violations: Vec<Violation>,
}

impl EntryViolations {
    /// Marker used as the change note snapshot for entries without one
    pub const EMPTY_NOTE: &'static str = "(empty)";

    /// Whether any violation has the given severity
    pub fn has_severity(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity == severity)
    }
}

/// Validation outcome for one change report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Source file name or label
    pub filename: String,
    /// Why the report could not be validated, if it could not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_entries: usize,
    #[serde(default)]
    pub entries_with_violations: usize,
    pub total_violations: usize,
    #[serde(default)]
    pub statistics: Statistics,
    /// Groups for entries with at least one violation, in entry order
    pub violations: Vec<EntryViolations>,
}

impl ValidationResult {
    /// Build a result from entry groups, deriving every count from them
    pub fn from_groups(
        filename: impl Into<String>,
        total_entries: usize,
        groups: Vec<EntryViolations>,
    ) -> Self {
        let mut statistics = Statistics::default();
        for violation in groups.iter().flat_map(|g| &g.violations) {
            statistics.add(violation.severity);
        }

        Self {
            filename: filename.into(),
            error: None,
            total_entries,
            entries_with_violations: groups.len(),
            total_violations: groups.iter().map(|g| g.violations.len()).sum(),
            statistics,
            violations: groups,
        }
    }

    /// Result for a report that could not be validated
    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            error: Some(error.into()),
            total_entries: 0,
            entries_with_violations: 0,
            total_violations: 0,
            statistics: Statistics::default(),
            violations: Vec::new(),
        }
    }

    /// Whether validation itself failed
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Whether the result contains any violations
    pub fn has_violations(&self) -> bool {
        self.total_violations > 0
    }

    /// Whether the result contains blocking violations
    pub fn has_errors(&self) -> bool {
        self.statistics.errors > 0
    }

    /// Every violation across all groups, in entry order
    pub fn all_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().flat_map(|g| g.violations.iter())
    }

    /// Groups containing at least one violation of the given severity, in entry order
    pub fn groups_with_severity(&self, severity: Severity) -> impl Iterator<Item = &EntryViolations> {
        self.violations.iter().filter(move |g| g.has_severity(severity))
    }
}

/// Results of validating many change reports in one request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total_files: usize,
    pub results: Vec<ValidationResult>,
    /// When the batch was validated
    pub validated_at: DateTime<Utc>,
    /// Wall-clock time of the batch in milliseconds
    #[serde(default)]
    pub execution_time_ms: u64,
}

impl BatchReport {
    /// Create a report from per-file results
    pub fn new(results: Vec<ValidationResult>) -> Self {
        Self {
            total_files: results.len(),
            results,
            validated_at: Utc::now(),
            execution_time_ms: 0,
        }
    }

    /// Set the execution time
    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.execution_time_ms = duration_ms;
    }

    /// Severity counts summed over every file
    pub fn statistics(&self) -> Statistics {
        let mut totals = Statistics::default();
        for result in &self.results {
            totals.merge(&result.statistics);
        }
        totals
    }

    /// Entries summed over every file
    pub fn total_entries(&self) -> usize {
        self.results.iter().map(|r| r.total_entries).sum()
    }

    /// Files that could not be validated
    pub fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.is_failure())
    }

    /// Whether any file has blocking violations or failed to validate
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|r| r.has_errors() || r.is_failure())
    }
}

/// Error types that can occur around validation
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    /// Configuration file could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File could not be read or accessed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Change report content is not valid JSON
    #[error("Failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    /// Requested path escapes the data directory
    #[error("Access denied: {path}")]
    AccessDenied { path: String },

    /// Report could not be rendered
    #[error("Report error: {message}")]
    Report { message: String },
}

impl LintError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a parse error
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }

    /// Create an access error
    pub fn access_denied(path: impl Into<String>) -> Self {
        Self::AccessDenied { path: path.into() }
    }

    /// Create a report error
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report { message: message.into() }
    }
}

/// Result type for changenote-lint operations
pub type LintResult<T> = Result<T, LintError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(rule: &str, severity: Severity) -> Violation {
        Violation::new(rule, severity, EntryField::ChangeNote, "message", "D-1")
    }

    fn group(index: usize, violations: Vec<Violation>) -> EntryViolations {
        EntryViolations {
            entry_index: index,
            reference: Some("D-1".to_string()),
            change_note: EntryViolations::EMPTY_NOTE.to_string(),
            violations,
        }
    }

    #[test]
    fn test_violation_creation() {
        let v = violation("internal-reference", Severity::Error)
            .with_details(vec!["D-12345".to_string()]);

        assert_eq!(v.rule, "internal-reference");
        assert!(v.is_blocking());
        assert_eq!(v.details.as_deref(), Some(&["D-12345".to_string()][..]));
        assert_eq!(v.format_display(), "D-1 [error] internal-reference: message");
    }

    #[test]
    fn test_result_derives_statistics() {
        let result = ValidationResult::from_groups(
            "report.json",
            5,
            vec![
                group(0, vec![violation("a", Severity::Error), violation("b", Severity::Info)]),
                group(3, vec![violation("c", Severity::Warning)]),
            ],
        );

        assert_eq!(result.total_entries, 5);
        assert_eq!(result.entries_with_violations, 2);
        assert_eq!(result.total_violations, 3);
        assert_eq!(result.statistics, Statistics { errors: 1, warnings: 1, info: 1 });
        assert_eq!(result.statistics.total(), result.total_violations);
        assert!(result.has_errors());
        assert_eq!(result.all_violations().count(), 3);

        let indices: Vec<_> =
            result.groups_with_severity(Severity::Warning).map(|g| g.entry_index).collect();
        assert_eq!(indices, vec![3]);
    }

    #[test]
    fn test_failed_result_serialization() {
        let result = ValidationResult::failed("broken.json", "Invalid data format");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["error"], "Invalid data format");
        assert_eq!(json["totalEntries"], 0);
        assert_eq!(json["totalViolations"], 0);
        assert!(json["violations"].as_array().unwrap().is_empty());
        assert!(result.is_failure());
        assert!(!result.has_violations());
    }

    #[test]
    fn test_partial_result_defaults_statistics() {
        let parsed: ValidationResult = serde_json::from_str(
            r#"{"filename":"x.json","totalEntries":0,"totalViolations":0,"violations":[]}"#,
        )
        .unwrap();

        assert_eq!(parsed.statistics, Statistics::default());
        assert_eq!(parsed.entries_with_violations, 0);
    }

    #[test]
    fn test_batch_totals() {
        let ok = ValidationResult::from_groups(
            "a.json",
            2,
            vec![group(1, vec![violation("a", Severity::Warning)])],
        );
        let failed = ValidationResult::failed("b.json", "unreadable");
        let batch = BatchReport::new(vec![ok, failed]);

        assert_eq!(batch.total_files, 2);
        assert_eq!(batch.total_entries(), 2);
        assert_eq!(batch.statistics().warnings, 1);
        assert_eq!(batch.failures().count(), 1);
        assert!(batch.has_errors());
    }

    #[test]
    fn test_severity_ordering_and_parsing() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warning);
        assert!("fatal".parse::<Severity>().is_err());
        assert_eq!(Severity::Info.to_string(), "info");
    }
}

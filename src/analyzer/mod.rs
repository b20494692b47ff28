//! Validation engine for change reports
//!
//! CDD Principle: Domain Services - The engine turns entries into a validation result
//! - Applies every check to every entry in catalog order
//! - Groups violations per entry and derives all counts from the groups
//! - Never fails: malformed input becomes a result carrying an error marker

pub mod batch;
pub mod rules;

use crate::domain::entry::ReportEntry;
use crate::domain::violations::{EntryViolations, ValidationResult, Violation};
use rules::EntryCheck;
use serde_json::Value as JsonValue;

pub use batch::{BatchInput, BatchValidator};

/// Error marker for input that is not a sequence of entries
pub const INVALID_FORMAT_ERROR: &str = "Invalid data format: expected array of entries";

/// Pure, stateless validator applying the fixed rule catalog
pub struct ValidationEngine {
    checks: Vec<Box<dyn EntryCheck>>,
}

impl ValidationEngine {
    /// Create an engine with the full rule catalog
    pub fn new() -> Self {
        Self { checks: rules::default_checks() }
    }

    /// Validate parsed report data.
    ///
    /// Anything other than a JSON array yields a failed result with
    /// [`INVALID_FORMAT_ERROR`] and zero counts.
    pub fn validate(&self, data: &JsonValue, label: &str) -> ValidationResult {
        let Some(items) = data.as_array() else {
            tracing::debug!(label, "input is not an array of entries");
            return ValidationResult::failed(label, INVALID_FORMAT_ERROR);
        };

        let entries: Vec<ReportEntry> = items.iter().map(ReportEntry::from_value).collect();
        self.validate_entries(&entries, label)
    }

    /// Validate already-typed entries
    pub fn validate_entries(&self, entries: &[ReportEntry], label: &str) -> ValidationResult {
        let groups: Vec<EntryViolations> = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| self.evaluate_group(index, entry))
            .collect();

        let result = ValidationResult::from_groups(label, entries.len(), groups);
        tracing::debug!(
            label,
            entries = result.total_entries,
            violations = result.total_violations,
            "validated change report"
        );
        result
    }

    /// Every violation of one entry, in catalog order
    pub fn evaluate_entry(&self, entry: &ReportEntry) -> Vec<Violation> {
        self.checks.iter().filter_map(|check| check.check(entry)).collect()
    }

    /// Number of checks applied to each entry
    pub fn rule_count(&self) -> usize {
        self.checks.len()
    }

    fn evaluate_group(&self, index: usize, entry: &ReportEntry) -> Option<EntryViolations> {
        let violations = self.evaluate_entry(entry);
        if violations.is_empty() {
            return None;
        }

        let change_note = match entry.change_note() {
            "" => EntryViolations::EMPTY_NOTE.to_string(),
            note => note.to_string(),
        };

        Some(EntryViolations {
            entry_index: index,
            reference: entry.reference.clone(),
            change_note,
            violations,
        })
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

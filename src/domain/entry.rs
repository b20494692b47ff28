//! Change report entries as they appear in exported change report files
//!
//! Architecture: Value Objects - Entries are immutable records with total accessors
//! - Absent fields are `None` and resolve to defined fallbacks instead of failing
//! - Wire names follow the export format (`SimCorpReference`, `ChangeNote`, ...)

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Fallback used wherever an entry carries no reference
pub const UNKNOWN_REFERENCE: &str = "Unknown";

/// One release-note record from a change report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Opaque item identifier
    #[serde(rename = "SimCorpReference", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Customer-facing description of the change
    #[serde(rename = "ChangeNote", default, skip_serializing_if = "Option::is_none")]
    pub change_note: Option<String>,
    /// Instructions for applying the change
    #[serde(rename = "CustomerApplyNote", default, skip_serializing_if = "Option::is_none")]
    pub customer_apply_note: Option<String>,
    /// Products the change belongs to
    #[serde(rename = "Products", default)]
    pub products: Vec<String>,
}

impl ReportEntry {
    /// Create an entry with the given reference and no notes
    pub fn new(reference: impl Into<String>) -> Self {
        Self { reference: Some(reference.into()), ..Default::default() }
    }

    /// Set the change note
    pub fn with_change_note(mut self, note: impl Into<String>) -> Self {
        self.change_note = Some(note.into());
        self
    }

    /// Set the customer apply note
    pub fn with_apply_note(mut self, note: impl Into<String>) -> Self {
        self.customer_apply_note = Some(note.into());
        self
    }

    /// Add a product
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.products.push(product.into());
        self
    }

    /// Build an entry from an arbitrary JSON value.
    ///
    /// Never fails: non-object values become an empty entry and fields
    /// holding anything other than a string count as absent.
    pub fn from_value(value: &JsonValue) -> Self {
        let text = |key: &str| value.get(key).and_then(JsonValue::as_str).map(str::to_string);

        let products = value
            .get("Products")
            .and_then(JsonValue::as_array)
            .map(|items| items.iter().filter_map(|p| p.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        Self {
            reference: text("SimCorpReference"),
            change_note: text("ChangeNote"),
            customer_apply_note: text("CustomerApplyNote"),
            products,
        }
    }

    /// Reference for traceability, `"Unknown"` when absent or empty
    pub fn reference_or_unknown(&self) -> &str {
        match self.reference.as_deref() {
            Some(reference) if !reference.is_empty() => reference,
            _ => UNKNOWN_REFERENCE,
        }
    }

    /// Change note text, empty when absent
    pub fn change_note(&self) -> &str {
        self.change_note.as_deref().unwrap_or("")
    }

    /// Customer apply note text, empty when absent
    pub fn customer_apply_note(&self) -> &str {
        self.customer_apply_note.as_deref().unwrap_or("")
    }

    /// Whether the change note has content once whitespace is trimmed
    pub fn has_change_note(&self) -> bool {
        !self.change_note().trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_export_shape() {
        let entry: ReportEntry = serde_json::from_value(json!({
            "SimCorpReference": "D-1",
            "ChangeNote": "Improved FX handling",
            "Products": ["Asset Manager"]
        }))
        .unwrap();

        assert_eq!(entry.reference.as_deref(), Some("D-1"));
        assert_eq!(entry.change_note(), "Improved FX handling");
        assert_eq!(entry.customer_apply_note(), "");
        assert_eq!(entry.products, vec!["Asset Manager".to_string()]);
    }

    #[test]
    fn test_from_value_is_lenient() {
        let entry = ReportEntry::from_value(&json!({
            "SimCorpReference": 42,
            "ChangeNote": null,
            "Products": ["A", 7]
        }));

        assert_eq!(entry.reference, None);
        assert_eq!(entry.change_note, None);
        assert_eq!(entry.products, vec!["A".to_string()]);

        assert_eq!(ReportEntry::from_value(&json!("not an entry")), ReportEntry::default());
    }

    #[test]
    fn test_fallbacks() {
        let entry = ReportEntry::default();
        assert_eq!(entry.reference_or_unknown(), UNKNOWN_REFERENCE);
        assert!(!entry.has_change_note());

        let entry = ReportEntry::new("").with_change_note("   ");
        assert_eq!(entry.reference_or_unknown(), UNKNOWN_REFERENCE);
        assert!(!entry.has_change_note());
    }
}

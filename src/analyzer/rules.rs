//! Per-entry checks, one per catalog rule
//!
//! Each check looks at a single entry and yields at most one violation. Checks
//! never fail: absent text is treated as empty and simply does not match,
//! except where absence is what the rule looks for.

use crate::domain::entry::ReportEntry;
use crate::domain::violations::Violation;
use crate::patterns::{
    self, rule_ids, RuleDefinition, CUSTOMER_PATTERNS, INTERNAL_REFERENCE_PATTERNS,
    REPETITION_THRESHOLD, TECHNICAL_DETAIL_PATTERNS,
};

/// A rule applied to one entry at a time
pub trait EntryCheck: Send + Sync {
    /// Catalog definition backing this check
    fn definition(&self) -> &'static RuleDefinition;

    /// Evaluate the entry
    fn check(&self, entry: &ReportEntry) -> Option<Violation>;

    /// Violation with the rule's severity, field and rendered message
    fn violation(&self, entry: &ReportEntry, matched: &str) -> Violation {
        let definition = self.definition();
        Violation::new(
            definition.id,
            definition.severity,
            definition.field,
            definition.render(matched),
            entry.reference_or_unknown(),
        )
    }
}

fn definition(id: &str) -> &'static RuleDefinition {
    patterns::rule(id).expect("every check has a catalog entry")
}

/// The checks in catalog order
pub fn default_checks() -> Vec<Box<dyn EntryCheck>> {
    vec![
        Box::new(MandatoryChangeNote),
        Box::new(UnknownAbbreviation),
        Box::new(CustomerReference),
        Box::new(InternalReference),
        Box::new(TechnicalInternalDetail),
        Box::new(ApplyNoteRepetition),
        Box::new(ReferenceWithoutNote),
    ]
}

pub struct MandatoryChangeNote;

impl EntryCheck for MandatoryChangeNote {
    fn definition(&self) -> &'static RuleDefinition {
        definition(rule_ids::MANDATORY_CHANGE_NOTE)
    }

    fn check(&self, entry: &ReportEntry) -> Option<Violation> {
        (!entry.has_change_note()).then(|| self.violation(entry, ""))
    }
}

pub struct UnknownAbbreviation;

impl EntryCheck for UnknownAbbreviation {
    fn definition(&self) -> &'static RuleDefinition {
        definition(rule_ids::UNKNOWN_ABBREVIATION)
    }

    fn check(&self, entry: &ReportEntry) -> Option<Violation> {
        let unknown = patterns::unknown_abbreviations(entry.change_note());
        if unknown.is_empty() {
            return None;
        }

        let details: Vec<String> = unknown.into_iter().map(str::to_string).collect();
        Some(self.violation(entry, &details.join(", ")).with_details(details))
    }
}

pub struct CustomerReference;

impl EntryCheck for CustomerReference {
    fn definition(&self) -> &'static RuleDefinition {
        definition(rule_ids::CUSTOMER_REFERENCE)
    }

    fn check(&self, entry: &ReportEntry) -> Option<Violation> {
        CUSTOMER_PATTERNS
            .is_match(entry.change_note())
            .then(|| self.violation(entry, ""))
    }
}

pub struct InternalReference;

impl EntryCheck for InternalReference {
    fn definition(&self) -> &'static RuleDefinition {
        definition(rule_ids::INTERNAL_REFERENCE)
    }

    fn check(&self, entry: &ReportEntry) -> Option<Violation> {
        let found = INTERNAL_REFERENCE_PATTERNS.first_matches(entry.change_note())?;
        let details: Vec<String> = found.into_iter().map(str::to_string).collect();
        Some(self.violation(entry, &details.join(", ")).with_details(details))
    }
}

pub struct TechnicalInternalDetail;

impl EntryCheck for TechnicalInternalDetail {
    fn definition(&self) -> &'static RuleDefinition {
        definition(rule_ids::TECHNICAL_INTERNAL_DETAIL)
    }

    fn check(&self, entry: &ReportEntry) -> Option<Violation> {
        TECHNICAL_DETAIL_PATTERNS
            .is_match(entry.change_note())
            .then(|| self.violation(entry, ""))
    }
}

pub struct ApplyNoteRepetition;

impl EntryCheck for ApplyNoteRepetition {
    fn definition(&self) -> &'static RuleDefinition {
        definition(rule_ids::APPLY_NOTE_REPETITION)
    }

    fn check(&self, entry: &ReportEntry) -> Option<Violation> {
        let apply_note = entry.customer_apply_note();
        let change_note = entry.change_note();
        if apply_note.is_empty() || change_note.is_empty() {
            return None;
        }

        let score = patterns::similarity(apply_note, change_note);
        tracing::debug!(reference = entry.reference_or_unknown(), score, "apply note similarity");
        (score > REPETITION_THRESHOLD).then(|| self.violation(entry, ""))
    }
}

pub struct ReferenceWithoutNote;

impl EntryCheck for ReferenceWithoutNote {
    fn definition(&self) -> &'static RuleDefinition {
        definition(rule_ids::REFERENCE_WITHOUT_NOTE)
    }

    fn check(&self, entry: &ReportEntry) -> Option<Violation> {
        (!entry.has_change_note()).then(|| self.violation(entry, ""))
    }
}

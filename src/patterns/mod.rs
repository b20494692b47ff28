//! Rule catalog and pattern tables for change note validation
//!
//! Architectural Principle: Constant Data - The rule set is fixed and versioned, not configured
//! - Allowlists and pattern groups are compiled once per process and shared read-only
//! - Pattern groups are ordered and evaluated until the first one matches
//! - Rule definitions mirror the normative statements of the change note rules document

pub mod similarity;

use crate::domain::violations::{EntryField, Severity};
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

pub use similarity::{bigrams, dice_coefficient, similarity};

/// Version of the fixed rule set
pub const RULESET_VERSION: &str = "2024.10";

/// Rule identifiers, in evaluation order
pub mod rule_ids {
    pub const MANDATORY_CHANGE_NOTE: &str = "mandatory-change-note";
    pub const UNKNOWN_ABBREVIATION: &str = "unknown-abbreviation";
    pub const CUSTOMER_REFERENCE: &str = "customer-reference";
    pub const INTERNAL_REFERENCE: &str = "internal-reference";
    pub const TECHNICAL_INTERNAL_DETAIL: &str = "technical-internal-detail";
    pub const APPLY_NOTE_REPETITION: &str = "apply-note-repetition";
    pub const REFERENCE_WITHOUT_NOTE: &str = "reference-without-note";
}

/// Abbreviations customers are known to understand
pub const KNOWN_ABBREVIATIONS: &[&str] = &[
    "FX", "API", "FRN", "TRS", "DWH", "PFC", "CSDR", "RVP", "APL", "DFS", "NOMA", "NFRD", "NACE",
    "SCD", "FIX", "USD", "EUR", "GBP", "INS", "P/L", "PnL", "ID", "UI", "URL", "SQL", "DB", "PR",
    "RC", "PC",
];

/// Product terms whose uppercase spelling may legitimately show up as a token
pub const DOMAIN_TERMS: &[&str] = &[
    "Asset Manager",
    "Portfolio",
    "Transaction",
    "Dealer Window",
    "Order Manager",
    "Compliance",
    "Front Office",
    "Middle Office",
    "Back Office",
    "Match",
    "Settlement",
    "Reconciliation",
    "Batch",
    "Data Warehouse",
    "Market Data",
    "Securities Lending",
    "Call Money",
    "Loan Facility",
    "Cash Viewer",
    "Central Trade Manager",
    "Data Selector",
    "FlexAnalytics",
];

/// Minimum similarity above which an apply note counts as repeating the change note
pub const REPETITION_THRESHOLD: f64 = 0.8;

lazy_static! {
    /// All-caps tokens of two or more letters, bounded by ASCII word boundaries
    static ref ABBREVIATION_TOKEN: Regex =
        Regex::new(r"(?-u)\b[A-Z]{2,}\b").expect("abbreviation token pattern compiles");

    static ref UPPERCASE_DOMAIN_TERMS: Vec<String> =
        DOMAIN_TERMS.iter().map(|term| term.to_uppercase()).collect();

    /// Phrases that tie a note to one customer
    pub static ref CUSTOMER_PATTERNS: PatternGroup = PatternGroup::new(
        "customer",
        &[r"customer specific", r"\bcustomer name\b", r"\bfor customer\b"],
    );

    /// Ticket identifiers and internal tool names
    pub static ref INTERNAL_REFERENCE_PATTERNS: PatternGroup = PatternGroup::new(
        "internal-reference",
        &[
            r"\b[DS]-\d{5,}\b",
            r"\bS-\d{5,}\b",
            r"\battachment\b",
            r"\bmonkey test\b",
            r"\bagility\b",
            r"\bsiebel\b",
            r"\bworksheet\b",
        ],
    );

    /// Internal process vocabulary
    pub static ref TECHNICAL_DETAIL_PATTERNS: PatternGroup = PatternGroup::new(
        "technical-detail",
        &[r"\bmonkey test\b", r"\bworksheet\b", r"\bagility item\b"],
    );
}

/// Ordered, case-insensitive patterns evaluated until the first one matches.
///
/// Patterns compile in ASCII mode: `\b`, `\d` and case folding never
/// consider non-ASCII characters.
#[derive(Debug)]
pub struct PatternGroup {
    name: &'static str,
    patterns: Vec<Regex>,
}

impl PatternGroup {
    fn new(name: &'static str, sources: &[&str]) -> Self {
        let patterns = sources
            .iter()
            .map(|source| {
                RegexBuilder::new(source)
                    .case_insensitive(true)
                    .unicode(false)
                    .build()
                    .expect("built-in pattern compiles")
            })
            .collect();

        Self { name, patterns }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether any pattern of the group matches
    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    /// Every match of the first pattern that matches at all.
    ///
    /// Later patterns are not consulted once one has matched, so the result
    /// only ever holds matches of a single pattern.
    pub fn first_matches<'t>(&self, text: &'t str) -> Option<Vec<&'t str>> {
        self.patterns.iter().find_map(|pattern| {
            let found: Vec<&str> = pattern.find_iter(text).map(|m| m.as_str()).collect();
            if found.is_empty() {
                None
            } else {
                tracing::debug!(group = self.name, pattern = pattern.as_str(), "pattern matched");
                Some(found)
            }
        })
    }
}

/// All-caps tokens that are neither known abbreviations nor part of a domain term.
///
/// The domain term check is a plain substring test against the uppercased
/// term, so `"MAN"` passes because of `"ASSET MANAGER"`. Duplicates are kept.
pub fn unknown_abbreviations(text: &str) -> Vec<&str> {
    ABBREVIATION_TOKEN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| !KNOWN_ABBREVIATIONS.contains(token))
        .filter(|token| !UPPERCASE_DOMAIN_TERMS.iter().any(|term| term.contains(token)))
        .collect()
}

/// Static description of one rule
#[derive(Debug, Clone, Copy)]
pub struct RuleDefinition {
    pub id: &'static str,
    pub severity: Severity,
    pub field: EntryField,
    /// Message template; `{match}` is replaced with the matched text
    pub message: &'static str,
    /// What the rule checks, for listings
    pub description: &'static str,
}

impl RuleDefinition {
    /// Render the message, substituting `{match}`
    pub fn render(&self, matched: &str) -> String {
        self.message.replace("{match}", matched)
    }
}

/// The fixed rule catalog, in evaluation order
pub const RULES: &[RuleDefinition] = &[
    RuleDefinition {
        id: rule_ids::MANDATORY_CHANGE_NOTE,
        severity: Severity::Error,
        field: EntryField::ChangeNote,
        message: "Empty Change Note is not allowed (mandatory as of 16.10.2024)",
        description: "Every entry must carry a non-blank Change Note.",
    },
    RuleDefinition {
        id: rule_ids::UNKNOWN_ABBREVIATION,
        severity: Severity::Warning,
        field: EntryField::ChangeNote,
        message: "Potential unknown abbreviation(s): {match}. Verify if known to customers.",
        description: "All-caps tokens must be known abbreviations or part of a product term.",
    },
    RuleDefinition {
        id: rule_ids::CUSTOMER_REFERENCE,
        severity: Severity::Error,
        field: EntryField::ChangeNote,
        message: "Change Note should not reference customer names or be customer-specific",
        description: "Change Notes must not name customers or describe customer-specific work.",
    },
    RuleDefinition {
        id: rule_ids::INTERNAL_REFERENCE,
        severity: Severity::Error,
        field: EntryField::ChangeNote,
        message: "Change Note contains internal references that customers won't understand: {match}",
        description: "Ticket identifiers (D-/S- followed by 5+ digits) and internal tool names are not allowed.",
    },
    RuleDefinition {
        id: rule_ids::TECHNICAL_INTERNAL_DETAIL,
        severity: Severity::Warning,
        field: EntryField::ChangeNote,
        message: "Change Note may contain internal tool/process references not known to customers",
        description: "Internal process vocabulary such as monkey tests or worksheets should be avoided.",
    },
    RuleDefinition {
        id: rule_ids::APPLY_NOTE_REPETITION,
        severity: Severity::Warning,
        field: EntryField::CustomerApplyNote,
        message: "Customer Apply Note appears to repeat Change Note information. Provide additional apply instructions instead.",
        description: "The Customer Apply Note must add instructions rather than restate the Change Note.",
    },
    RuleDefinition {
        id: rule_ids::REFERENCE_WITHOUT_NOTE,
        severity: Severity::Info,
        field: EntryField::ChangeNote,
        message: "Entry has reference but no Change Note. Verify if this should be excluded from change report or if Product field is set to 'Other'.",
        description: "Referenced entries without a Change Note may belong outside the change report.",
    },
];

/// Look up a rule definition by id
pub fn rule(id: &str) -> Option<&'static RuleDefinition> {
    RULES.iter().find(|r| r.id == id)
}

//! Report generation with multiple output formats
//!
//! CDD Principle: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - ValidationResult and BatchReport (domain) are converted to terminal, JSON, JUnit or GitHub output
//! - Severity filtering selects whole entry groups and never reorders them
//! - Domain logic remains pure while supporting multiple presentation needs

use crate::domain::violations::{
    BatchReport, EntryViolations, LintError, LintResult, Severity, Statistics, ValidationResult,
};
use std::io::Write;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with colors
    Human,
    /// JSON in the validation result shape
    Json,
    /// JUnit XML format for CI integration
    Junit,
    /// GitHub Actions workflow annotations
    GitHub,
}

impl OutputFormat {
    /// Parse format from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "junit" => Some(Self::Junit),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "junit", "github"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Whether to list matched substrings under a violation
    pub show_details: bool,
    /// Only show entries with a violation of this severity
    pub severity_filter: Option<Severity>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { use_colors: true, show_details: true, severity_filter: None }
    }
}

/// Entry groups holding at least one violation of `severity`, in original order
pub fn filter_groups(result: &ValidationResult, severity: Option<Severity>) -> Vec<&EntryViolations> {
    match severity {
        Some(severity) => result.groups_with_severity(severity).collect(),
        None => result.violations.iter().collect(),
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Red,
    Yellow,
    Cyan,
    Green,
    Dim,
    Bold,
}

impl From<Severity> for Tone {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Tone::Red,
            Severity::Warning => Tone::Yellow,
            Severity::Info => Tone::Cyan,
        }
    }
}

#[cfg(feature = "colors")]
fn paint(text: &str, tone: Tone, enabled: bool) -> String {
    use colored::Colorize;

    if !enabled {
        return text.to_string();
    }

    match tone {
        Tone::Red => text.red().to_string(),
        Tone::Yellow => text.yellow().to_string(),
        Tone::Cyan => text.cyan().to_string(),
        Tone::Green => text.green().to_string(),
        Tone::Dim => text.dimmed().to_string(),
        Tone::Bold => text.bold().to_string(),
    }
}

#[cfg(not(feature = "colors"))]
fn paint(text: &str, _tone: Tone, _enabled: bool) -> String {
    text.to_string()
}

/// Main report formatter that dispatches to specific formatters
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    /// Create a new report formatter with options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format one validation result
    pub fn format_result(&self, result: &ValidationResult, format: OutputFormat) -> LintResult<String> {
        match format {
            OutputFormat::Human => Ok(self.format_human(result)),
            OutputFormat::Json => to_pretty_json(&self.filtered(result)),
            OutputFormat::Junit => Ok(self.format_junit(std::slice::from_ref(result))),
            OutputFormat::GitHub => Ok(self.format_github(std::slice::from_ref(result))),
        }
    }

    /// Format a batch of validation results
    pub fn format_batch(&self, batch: &BatchReport, format: OutputFormat) -> LintResult<String> {
        match format {
            OutputFormat::Human => Ok(self.format_batch_human(batch)),
            OutputFormat::Json => {
                let results: Vec<ValidationResult> =
                    batch.results.iter().map(|r| self.filtered(r)).collect();
                to_pretty_json(&serde_json::json!({
                    "totalFiles": batch.total_files,
                    "results": results,
                    "validatedAt": batch.validated_at.to_rfc3339(),
                    "executionTimeMs": batch.execution_time_ms,
                }))
            }
            OutputFormat::Junit => Ok(self.format_junit(&batch.results)),
            OutputFormat::GitHub => Ok(self.format_github(&batch.results)),
        }
    }

    /// Write a formatted result to a writer
    pub fn write_result<W: Write>(
        &self,
        result: &ValidationResult,
        format: OutputFormat,
        mut writer: W,
    ) -> LintResult<()> {
        let formatted = self.format_result(result, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    /// Copy of the result holding only the groups that pass the severity filter
    fn filtered(&self, result: &ValidationResult) -> ValidationResult {
        let mut filtered = result.clone();
        if let Some(severity) = self.options.severity_filter {
            filtered.violations.retain(|g| g.has_severity(severity));
        }
        filtered
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        paint(text, tone, self.options.use_colors)
    }

    /// Format a result in human-readable format
    fn format_human(&self, result: &ValidationResult) -> String {
        let mut output = String::new();

        output.push_str(&format!("📊 {}\n", self.paint(&result.filename, Tone::Bold)));

        if let Some(error) = &result.error {
            output.push_str(&format!("  ❌ {}\n", self.paint(error, Tone::Red)));
            return output;
        }

        output.push_str(&format!(
            "  {} entries, {} with issues | {}\n\n",
            result.total_entries,
            result.entries_with_violations,
            self.format_statistics(&result.statistics)
        ));

        let groups = filter_groups(result, self.options.severity_filter);
        if groups.is_empty() {
            output.push_str(&format!(
                "  {}\n",
                self.paint("✓ No issues found. All change notes comply with the standards.", Tone::Green)
            ));
            return output;
        }

        for group in groups {
            output.push_str(&self.format_group(group));
        }

        output
    }

    fn format_group(&self, group: &EntryViolations) -> String {
        let mut output = String::new();
        let reference = group.reference.as_deref().unwrap_or(crate::domain::UNKNOWN_REFERENCE);

        output.push_str(&format!(
            "  #{} {}\n",
            group.entry_index + 1,
            self.paint(reference, Tone::Bold)
        ));
        output.push_str(&format!("    {}\n", self.paint(&truncate(&group.change_note, 100), Tone::Dim)));

        for violation in &group.violations {
            output.push_str(&format!(
                "    [{}] {} ({}): {}\n",
                self.paint(violation.severity.as_str(), violation.severity.into()),
                violation.rule,
                violation.field.as_str(),
                violation.message
            ));

            if self.options.show_details {
                if let Some(details) = &violation.details {
                    output.push_str(&format!("      → {}\n", details.join(", ")));
                }
            }
        }

        output.push('\n');
        output
    }

    fn format_batch_human(&self, batch: &BatchReport) -> String {
        let mut output = String::new();

        for result in &batch.results {
            output.push_str(&self.format_human(result));
            output.push('\n');
        }

        let failed = batch.failures().count();
        output.push_str(&format!(
            "📁 {} files, {} entries | {}",
            batch.total_files,
            batch.total_entries(),
            self.format_statistics(&batch.statistics())
        ));
        if failed > 0 {
            output.push_str(&format!(
                " | {}",
                self.paint(&format!("{failed} failed to validate"), Tone::Red)
            ));
        }
        output.push_str(&format!(" ({:.1}s)\n", batch.execution_time_ms as f64 / 1000.0));

        output
    }

    fn format_statistics(&self, statistics: &Statistics) -> String {
        let parts = [
            (Severity::Error, plural(statistics.errors, "error")),
            (Severity::Warning, plural(statistics.warnings, "warning")),
            (Severity::Info, format!("{} info", statistics.info)),
        ];

        parts
            .iter()
            .map(|(severity, text)| {
                if statistics.count(*severity) > 0 {
                    self.paint(text, (*severity).into())
                } else {
                    text.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Format results in JUnit XML format, one test case per entry group
    fn format_junit(&self, results: &[ValidationResult]) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<testsuites name=\"changenote-lint\">\n");

        for result in results {
            let groups = filter_groups(result, self.options.severity_filter);
            let failures = groups.iter().filter(|g| g.has_severity(Severity::Error)).count();
            let errors = usize::from(result.is_failure());

            xml.push_str(&format!(
                "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"{}\">\n",
                escape_xml(&result.filename),
                groups.len() + errors,
                failures,
                errors
            ));

            if let Some(error) = &result.error {
                xml.push_str("    <testcase classname=\"validation\" name=\"load\">\n");
                xml.push_str(&format!("      <error message=\"{}\"/>\n", escape_xml(error)));
                xml.push_str("    </testcase>\n");
            }

            for group in groups {
                let reference = group.reference.as_deref().unwrap_or(crate::domain::UNKNOWN_REFERENCE);
                xml.push_str(&format!(
                    "    <testcase classname=\"{}\" name=\"{}\">\n",
                    escape_xml(&result.filename),
                    escape_xml(&format!("entry {} ({})", group.entry_index, reference))
                ));

                let blocking: Vec<_> = group.violations.iter().filter(|v| v.is_blocking()).collect();
                if let Some(first) = blocking.first() {
                    xml.push_str(&format!("      <failure message=\"{}\">\n", escape_xml(&first.message)));
                    for violation in &blocking {
                        xml.push_str(&format!(
                            "        {}: {}\n",
                            violation.rule,
                            escape_xml(&violation.message)
                        ));
                    }
                    xml.push_str("      </failure>\n");
                }

                xml.push_str("    </testcase>\n");
            }

            xml.push_str("  </testsuite>\n");
        }

        xml.push_str("</testsuites>\n");
        xml
    }

    /// Format results as GitHub Actions annotations
    fn format_github(&self, results: &[ValidationResult]) -> String {
        let mut output = String::new();

        for result in results {
            if let Some(error) = &result.error {
                output.push_str(&format!("::error file={}::{}\n", result.filename, error));
                continue;
            }

            for group in filter_groups(result, self.options.severity_filter) {
                for violation in &group.violations {
                    let level = match violation.severity {
                        Severity::Error => "error",
                        Severity::Warning => "warning",
                        Severity::Info => "notice",
                    };

                    output.push_str(&format!(
                        "::{} file={},title={}::{} (entry {}, {})\n",
                        level,
                        result.filename,
                        violation.rule,
                        violation.message,
                        group.entry_index,
                        violation.reference
                    ));
                }
            }
        }

        output
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> LintResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| LintError::report(format!("JSON serialization failed: {e}")))
}

fn plural(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max_chars).collect();
    shortened.push('…');
    shortened
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

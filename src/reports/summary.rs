//! Summary report generator for shell output.
//!
//! Provides compact, human-readable output for terminal usage.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::diff::{DiffReport, RuleEntry};
use crate::naming::{IdentitySource, NamingNotice};
use crate::pipeline::{BatchItem, MergeSummary, ParseSummary, ValidationEntry};

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Shorten a title to at most `width` characters, ending in `...` when cut.
#[must_use]
pub fn truncate_title(title: &str, width: usize) -> String {
    if title.chars().count() <= width {
        return title.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut out: String = title.chars().take(keep).collect();
    out.push_str("...");
    out
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Summary reporter for shell output
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn header(&self, lines: &mut Vec<String>, title: &str) {
        lines.push(self.color(title, "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));
    }

    /// One `marker key  title` line per rule, keys padded to a common width
    fn rule_lines(
        &self,
        lines: &mut Vec<String>,
        entries: &[RuleEntry],
        marker: &str,
        color: &str,
        config: &ReportConfig,
    ) {
        let key_width = entries.iter().map(|e| display_key(&e.key).len()).max().unwrap_or(0);
        for entry in entries {
            lines.push(format!(
                "  {} {:<key_width$}  {}",
                self.color(marker, color),
                display_key(&entry.key),
                truncate_title(&entry.title, config.title_width)
            ));
        }
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn display_key(key: &str) -> &str {
    if key.is_empty() {
        "(no id)"
    } else {
        key
    }
}

impl ReportGenerator for SummaryReporter {
    fn generate_diff_report(
        &self,
        report: &DiffReport,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();
        self.header(&mut lines, "Checklist Diff");

        if let (Some(a), Some(b)) = (&config.metadata.a_path, &config.metadata.b_path) {
            lines.push(format!("{}  {} → {}", self.color("Files:", "cyan"), a, b));
        }
        if let Some(mismatch) = &report.stig_mismatch {
            lines.push(self.color(
                &format!(
                    "Warning: STIG ids differ ('{}' vs '{}'); results may be misleading",
                    mismatch.a, mismatch.b
                ),
                "yellow",
            ));
        }
        lines.push(format!(
            "{}  {} in both",
            self.color("Rules:", "cyan"),
            report.common
        ));

        if !report.has_changes() {
            lines.push(String::new());
            lines.push(format!("  {}", self.color("No differences", "dim")));
            return Ok(lines.join("\n"));
        }

        if !report.only_in_a.is_empty() {
            lines.push(String::new());
            lines.push(self.color(&format!("Only in A ({}):", report.only_in_a.len()), "bold"));
            self.rule_lines(&mut lines, &report.only_in_a, "-", "red", config);
        }
        if !report.only_in_b.is_empty() {
            lines.push(String::new());
            lines.push(self.color(&format!("Only in B ({}):", report.only_in_b.len()), "bold"));
            self.rule_lines(&mut lines, &report.only_in_b, "+", "green", config);
        }
        if !report.status_diffs.is_empty() {
            lines.push(String::new());
            lines.push(self.color(
                &format!("Status changes ({}):", report.status_diffs.len()),
                "bold",
            ));
            let key_width = report.status_diffs.iter().map(|d| d.key.len()).max().unwrap_or(0);
            for change in &report.status_diffs {
                lines.push(format!(
                    "  {} {:<key_width$}  {} → {}  {}",
                    self.color("~", "yellow"),
                    change.key,
                    change.a.as_deref().unwrap_or("(none)"),
                    change.b.as_deref().unwrap_or("(none)"),
                    self.color(&truncate_title(&change.title, config.title_width), "dim")
                ));
            }
        }

        let summary = report.summary();
        lines.push(String::new());
        lines.push(format!(
            "{}  {} {}",
            self.color("Total:", "cyan"),
            summary.total_changes,
            plural(summary.total_changes, "difference", "differences")
        ));

        Ok(lines.join("\n"))
    }

    fn generate_merge_report(
        &self,
        summary: &MergeSummary,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();
        self.header(&mut lines, "Checklist Merge");

        lines.push(format!("{}       {}", self.color("Old:", "cyan"), summary.old_path.display()));
        lines.push(format!(
            "{}  {}",
            self.color("Template:", "cyan"),
            summary.template_path.display()
        ));
        lines.push(format!("{}    {}", self.color("Output:", "cyan"), summary.output_path.display()));
        let source = match summary.identity.source {
            IdentitySource::HostName => "host name",
            IdentitySource::Prefix => "prefix",
            IdentitySource::FileStem => "file name",
        };
        lines.push(format!(
            "{}      {} ({source})",
            self.color("Host:", "cyan"),
            summary.identity.identifier
        ));
        lines.push(format!("{}      {}", self.color("STIG:", "cyan"), summary.stig_id));
        lines.push(format!(
            "{}     {} updated, {} added, {} dropped",
            self.color("Rules:", "cyan"),
            summary.updated,
            self.color(&format!("+{}", summary.added.len()), "green"),
            self.color(&format!("-{}", summary.dropped_keys.len()), "red")
        ));

        if let Some(mismatch) = &summary.forced_mismatch {
            lines.push(self.color(
                &format!("Warning: forced merge across STIG ids '{}' → '{}'", mismatch.a, mismatch.b),
                "yellow",
            ));
        }
        for notice in &summary.notices {
            let text = match notice {
                NamingNotice::MissingHostIdentity { fallback } => {
                    format!("Note: no host name or prefix; named after '{fallback}'")
                }
                NamingNotice::OutputCollision { candidate, resolved } => format!(
                    "Note: {} existed, wrote {}",
                    candidate.display(),
                    resolved.display()
                ),
            };
            lines.push(self.color(&text, "yellow"));
        }

        if !summary.added.is_empty() {
            lines.push(String::new());
            lines.push(self.color(
                &format!("New rules to review ({}):", summary.added.len()),
                "bold",
            ));
            self.rule_lines(&mut lines, &summary.added, "+", "green", config);
        }
        if !summary.dropped_keys.is_empty() {
            lines.push(String::new());
            lines.push(self.color(
                &format!("No longer in template ({}):", summary.dropped_keys.len()),
                "bold",
            ));
            for key in &summary.dropped_keys {
                lines.push(format!("  {} {}", self.color("-", "red"), key));
            }
        }

        Ok(lines.join("\n"))
    }

    fn generate_batch_report(
        &self,
        items: &[BatchItem],
        _config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();
        self.header(&mut lines, "Batch Merge");

        let mut failed = 0;
        for item in items {
            match &item.result {
                Ok(summary) => lines.push(format!(
                    "  {} {} → {}  ({} updated, +{} added, -{} dropped)",
                    self.color("✓", "green"),
                    item.old_path.display(),
                    summary.output_path.display(),
                    summary.updated,
                    summary.added.len(),
                    summary.dropped_keys.len()
                )),
                Err(e) => {
                    failed += 1;
                    lines.push(format!(
                        "  {} {}: {}",
                        self.color("✗", "red"),
                        item.old_path.display(),
                        e
                    ));
                }
            }
        }

        lines.push(String::new());
        let total = items.len();
        let merged = total - failed;
        lines.push(format!(
            "{}  {merged} of {total} merged{}",
            self.color("Result:", "cyan"),
            if failed > 0 {
                self.color(&format!(", {failed} failed"), "red")
            } else {
                String::new()
            }
        ));

        Ok(lines.join("\n"))
    }

    fn generate_parse_report(
        &self,
        summary: &ParseSummary,
        _config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let version = summary
            .version
            .as_deref()
            .map(|v| format!(" {v}"))
            .unwrap_or_default();
        Ok(format!(
            "{} {}{} → {} ({} {})",
            self.color("✓", "green"),
            summary.stig_id,
            version,
            summary.output.display(),
            summary.rule_count,
            plural(summary.rule_count, "rule", "rules")
        ))
    }

    fn generate_validation_report(
        &self,
        entries: &[ValidationEntry],
        _config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();
        self.header(&mut lines, "Checklist Validation");

        for entry in entries {
            match &entry.error {
                Some(error) => lines.push(format!(
                    "  {} {}: {}",
                    self.color("✗", "red"),
                    entry.path.display(),
                    error
                )),
                None => {
                    let marker = if entry.warnings.is_empty() {
                        self.color("✓", "green")
                    } else {
                        self.color("!", "yellow")
                    };
                    lines.push(format!(
                        "  {} {}  {} ({} {})",
                        marker,
                        entry.path.display(),
                        entry.stig_id.as_deref().unwrap_or("no STIG"),
                        entry.rule_count,
                        plural(entry.rule_count, "rule", "rules")
                    ));
                    for warning in &entry.warnings {
                        lines.push(format!(
                            "      stigs[{}].rules[{}] {}: {}",
                            warning.stig_index,
                            warning.rule_index,
                            display_key(&warning.key),
                            warning.message
                        ));
                    }
                }
            }
        }

        let invalid = entries.iter().filter(|e| !e.is_valid()).count();
        lines.push(String::new());
        lines.push(format!(
            "{}  {} of {} valid",
            self.color("Result:", "cyan"),
            entries.len() - invalid,
            entries.len()
        ));

        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{StatusDiff, StigMismatch};

    fn entry(key: &str, title: &str) -> RuleEntry {
        RuleEntry {
            key: key.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("short", 70), "short");
        let long = "x".repeat(80);
        let cut = truncate_title(&long, 70);
        assert_eq!(cut.chars().count(), 70);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_diff_summary_plain() {
        let report = DiffReport {
            stig_mismatch: Some(StigMismatch {
                a: "A".to_string(),
                b: "B".to_string(),
            }),
            only_in_a: vec![entry("SV-1", "first")],
            only_in_b: vec![entry("SV-3", "third")],
            status_diffs: vec![StatusDiff {
                key: "SV-2".to_string(),
                title: "second".to_string(),
                a: Some("open".to_string()),
                b: None,
            }],
            common: 1,
        };
        let text = SummaryReporter::new()
            .no_color()
            .generate_diff_report(&report, &ReportConfig::default())
            .unwrap();

        assert!(text.contains("STIG ids differ"));
        assert!(text.contains("- SV-1  first"));
        assert!(text.contains("+ SV-3  third"));
        assert!(text.contains("~ SV-2  open → (none)"));
        assert!(text.contains("3 differences"));
        assert!(!text.contains("\x1b["));
    }

    #[test]
    fn test_colored_output_has_escapes() {
        let report = DiffReport {
            only_in_b: vec![entry("SV-3", "third")],
            ..DiffReport::default()
        };
        let text = SummaryReporter::new()
            .generate_diff_report(&report, &ReportConfig::default())
            .unwrap();
        assert!(text.contains("\x1b[32m+\x1b[0m"));
    }
}

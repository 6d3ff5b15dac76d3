//! JSON report generator.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::diff::{DiffReport, DiffSummary};
use crate::pipeline::{BatchItem, MergeSummary, ParseSummary, ValidationEntry};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;

/// JSON report generator
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn render<T: Serialize>(&self, body: T, config: &ReportConfig) -> Result<String, ReportError> {
        let report = JsonReport {
            metadata: JsonReportMetadata::new(config),
            body,
        };
        let text = if self.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        Ok(text)
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate_diff_report(
        &self,
        report: &DiffReport,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        self.render(
            JsonDiff {
                summary: report.summary(),
                report,
            },
            config,
        )
    }

    fn generate_merge_report(
        &self,
        summary: &MergeSummary,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        self.render(JsonMerge { merge: summary }, config)
    }

    fn generate_batch_report(
        &self,
        items: &[BatchItem],
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let results: Vec<JsonBatchItem<'_>> = items
            .iter()
            .map(|item| match &item.result {
                Ok(summary) => JsonBatchItem {
                    old_path: &item.old_path,
                    merge: Some(summary),
                    error: None,
                },
                Err(e) => JsonBatchItem {
                    old_path: &item.old_path,
                    merge: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        let failed = results.iter().filter(|r| r.error.is_some()).count();
        self.render(
            JsonBatch {
                total: results.len(),
                failed,
                results,
            },
            config,
        )
    }

    fn generate_parse_report(
        &self,
        summary: &ParseSummary,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        self.render(JsonParse { parse: summary }, config)
    }

    fn generate_validation_report(
        &self,
        entries: &[ValidationEntry],
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        self.render(
            JsonValidation {
                invalid: entries.iter().filter(|e| !e.is_valid()).count(),
                files: entries,
            },
            config,
        )
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

// JSON structures

#[derive(Serialize)]
struct JsonReport<T> {
    metadata: JsonReportMetadata,
    #[serde(flatten)]
    body: T,
}

#[derive(Serialize)]
struct JsonReportMetadata {
    tool: ToolInfo,
    generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    a_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    b_path: Option<String>,
}

impl JsonReportMetadata {
    fn new(config: &ReportConfig) -> Self {
        Self {
            tool: ToolInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            generated_at: Utc::now().to_rfc3339(),
            a_path: config.metadata.a_path.clone(),
            b_path: config.metadata.b_path.clone(),
        }
    }
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct JsonDiff<'a> {
    summary: DiffSummary,
    #[serde(flatten)]
    report: &'a DiffReport,
}

#[derive(Serialize)]
struct JsonMerge<'a> {
    merge: &'a MergeSummary,
}

#[derive(Serialize)]
struct JsonParse<'a> {
    parse: &'a ParseSummary,
}

#[derive(Serialize)]
struct JsonBatch<'a> {
    total: usize,
    failed: usize,
    results: Vec<JsonBatchItem<'a>>,
}

#[derive(Serialize)]
struct JsonBatchItem<'a> {
    old_path: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    merge: Option<&'a MergeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct JsonValidation<'a> {
    invalid: usize,
    files: &'a [ValidationEntry],
}

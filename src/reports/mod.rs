//! Report generation for checklist operations.
//!
//! Two output formats are available for every operation:
//! - Summary: compact, optionally colored terminal output
//! - JSON: structured data for scripting, with tool metadata

mod json;
mod summary;
mod types;

pub use json::JsonReporter;
pub use summary::{truncate_title, SummaryReporter};
pub use types::{ReportConfig, ReportFormat, ReportMetadata, DEFAULT_TITLE_WIDTH};

use crate::diff::DiffReport;
use crate::pipeline::{BatchItem, MergeSummary, ParseSummary, ValidationEntry};
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Report comparing two checklists
    fn generate_diff_report(
        &self,
        report: &DiffReport,
        config: &ReportConfig,
    ) -> Result<String, ReportError>;

    /// Report for a single merge
    fn generate_merge_report(
        &self,
        summary: &MergeSummary,
        config: &ReportConfig,
    ) -> Result<String, ReportError>;

    /// Report for a batch merge, one entry per old checklist
    fn generate_batch_report(
        &self,
        items: &[BatchItem],
        config: &ReportConfig,
    ) -> Result<String, ReportError>;

    /// Report for a benchmark conversion
    fn generate_parse_report(
        &self,
        summary: &ParseSummary,
        config: &ReportConfig,
    ) -> Result<String, ReportError>;

    /// Report for checklist validation
    fn generate_validation_report(
        &self,
        entries: &[ValidationEntry],
        config: &ReportConfig,
    ) -> Result<String, ReportError>;

    /// Write a diff report to a writer
    fn write_diff_report(
        &self,
        report: &DiffReport,
        config: &ReportConfig,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let text = self.generate_diff_report(report, config)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    create_reporter_with_options(format, true)
}

/// Create a report generator with color control
#[must_use]
pub fn create_reporter_with_options(format: ReportFormat, use_color: bool) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Summary => {
            if use_color {
                Box::new(SummaryReporter::new())
            } else {
                Box::new(SummaryReporter::new().no_color())
            }
        }
        ReportFormat::Json => Box::new(JsonReporter::new()),
    }
}

//! Report type definitions.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default column width for rule titles in summary output
pub const DEFAULT_TITLE_WIDTH: usize = 70;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable summary for the terminal
    #[default]
    Summary,
    /// Structured JSON output
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Configuration for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rule titles longer than this are truncated in summary output
    pub title_width: usize,
    /// Additional metadata to include
    pub metadata: ReportMetadata,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title_width: DEFAULT_TITLE_WIDTH,
            metadata: ReportMetadata::default(),
        }
    }
}

impl ReportConfig {
    #[must_use]
    pub const fn with_title_width(mut self, width: usize) -> Self {
        self.title_width = width;
        self
    }
}

/// Metadata included in reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// First (or old) checklist path
    pub a_path: Option<String>,
    /// Second (or new) checklist path
    pub b_path: Option<String>,
}

impl ReportMetadata {
    #[must_use]
    pub fn for_pair(a: &std::path::Path, b: &std::path::Path) -> Self {
        Self {
            a_path: Some(a.display().to_string()),
            b_path: Some(b.display().to_string()),
        }
    }
}

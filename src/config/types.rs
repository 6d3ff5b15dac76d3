//! Configuration types for cklb-sync operations.
//!
//! Provides the file-backed [`AppConfig`] and the per-command runtime
//! configurations assembled from it and the CLI arguments.

use crate::naming::DEFAULT_MAX_SUFFIX;
use crate::reports::{ReportFormat, DEFAULT_TITLE_WIDTH};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI arguments are layered over file settings with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Merge defaults
    pub merge: MergeDefaults,
    /// Output file naming
    pub naming: NamingConfig,
    /// Report output (format, colors)
    pub output: OutputConfig,
    /// Diff defaults
    pub diff: DiffDefaults,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Identifier used when an old checklist has no host name.
    pub fn prefix(mut self, prefix: Option<String>) -> Self {
        self.config.merge.prefix = prefix;
        self
    }

    /// Worker threads for batch merges.
    pub const fn threads(mut self, threads: Option<usize>) -> Self {
        self.config.merge.threads = threads;
        self
    }

    /// Directory merged checklists are written to.
    pub fn output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.naming.output_dir = dir;
        self
    }

    /// Set the report format.
    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Disable colored output.
    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.config.output.no_color = no_color;
        self
    }

    /// Exit with code 1 from `diff` when differences are found.
    pub const fn fail_on_change(mut self, fail: bool) -> Self {
        self.config.diff.fail_on_change = fail;
        self
    }

    /// Build the `AppConfig`.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Sub-configuration Types
// ============================================================================

/// Defaults applied to `merge` and `batch-merge`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MergeDefaults {
    /// Identifier used when an old checklist has no host name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Worker threads for batch merges (defaults to the number of CPUs)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub threads: Option<usize>,
}

/// Output file naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NamingConfig {
    /// Directory merged checklists are written to (defaults to the working directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Highest numeric suffix tried when an output name is taken
    #[schemars(range(min = 1))]
    pub max_suffix: u32,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            max_suffix: DEFAULT_MAX_SUFFIX,
        }
    }
}

/// Output-related configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Report format
    pub format: ReportFormat,
    /// Disable colored output
    pub no_color: bool,
    /// Rule titles longer than this are truncated in summary reports
    #[schemars(range(min = 10))]
    pub title_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Summary,
            no_color: false,
            title_width: DEFAULT_TITLE_WIDTH,
        }
    }
}

/// Defaults applied to `diff`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DiffDefaults {
    /// Exit with code 1 when differences are found
    pub fail_on_change: bool,
}

// ============================================================================
// Command-specific Configuration Types
// ============================================================================

/// Configuration for `parse`
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// XCCDF benchmark to read
    pub input: PathBuf,
    /// Checklist to write
    pub output_path: PathBuf,
    pub output: OutputConfig,
    pub quiet: bool,
}

/// Configuration for `merge`
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Previously reviewed checklist
    pub old: PathBuf,
    /// Blank checklist of the new release
    pub template: PathBuf,
    /// Exact output path; bypasses output naming
    pub output_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub max_suffix: u32,
    pub prefix: Option<String>,
    /// Merge across differing STIG ids
    pub force: bool,
    pub output: OutputConfig,
    pub quiet: bool,
}

/// Configuration for `batch-merge`
#[derive(Debug, Clone)]
pub struct BatchMergeConfig {
    /// Blank checklist of the new release
    pub template: PathBuf,
    /// Previously reviewed checklists
    pub old: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub max_suffix: u32,
    pub prefix: Option<String>,
    pub force: bool,
    pub threads: Option<usize>,
    pub output: OutputConfig,
    pub quiet: bool,
}

/// Configuration for `diff`
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Paths to compare
    pub paths: DiffPaths,
    pub output: OutputConfig,
    /// Report file (stdout if not set)
    pub output_file: Option<PathBuf>,
    pub fail_on_change: bool,
    pub quiet: bool,
}

/// Paths for diff operation
#[derive(Debug, Clone)]
pub struct DiffPaths {
    /// Document A
    pub a: PathBuf,
    /// Document B
    pub b: PathBuf,
}

/// Configuration for `validate`
#[derive(Debug, Clone)]
pub struct ValidateConfig {
    pub paths: Vec<PathBuf>,
    pub output: OutputConfig,
    pub quiet: bool,
}

//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand
//! and returns the process exit code.

mod batch;
mod diff;
mod merge;
mod parse;
mod validate;

pub use batch::run_batch_merge;
pub use diff::run_diff;
pub use merge::run_merge;
pub use parse::run_parse;
pub use validate::run_validate;

// Re-export config types used by handlers
pub use crate::config::{BatchMergeConfig, DiffConfig, MergeConfig, ParseConfig, ValidateConfig};

use crate::config::OutputConfig;
use crate::pipeline::{should_use_color, OutputTarget};
use crate::reports::{create_reporter_with_options, ReportConfig, ReportGenerator};

/// Reporter and report settings for an output configuration
fn reporter_for(output: &OutputConfig, target: &OutputTarget) -> (Box<dyn ReportGenerator>, ReportConfig) {
    let use_color = should_use_color(output.no_color, target);
    let reporter = create_reporter_with_options(output.format, use_color);
    let config = ReportConfig::default().with_title_width(output.title_width);
    (reporter, config)
}

//! Merge command handler.
//!
//! Implements the `merge` subcommand for carrying findings from an old
//! checklist into a new release's template.

use super::reporter_for;
use crate::config::MergeConfig;
use crate::merge::MergeOptions;
use crate::naming::OutputNamer;
use crate::pipeline::{self, exit_codes, write_output, MergeRequest, OutputPlan, OutputTarget};
use crate::reports::ReportFormat;
use anyhow::{Context, Result};

/// Run the merge command, returning the desired exit code.
///
/// A STIG identity mismatch is returned as an error; the caller maps it to
/// [`exit_codes::STIG_MISMATCH`].
#[allow(clippy::needless_pass_by_value)]
pub fn run_merge(config: MergeConfig) -> Result<i32> {
    if config.output_file.is_none() {
        std::fs::create_dir_all(&config.output_dir).with_context(|| {
            format!("Failed to create output directory {}", config.output_dir.display())
        })?;
    }

    let namer = OutputNamer::new(&config.output_dir).with_max_suffix(config.max_suffix);
    let plan = match &config.output_file {
        Some(path) => OutputPlan::Explicit(path),
        None => OutputPlan::Reserve(&namer),
    };
    let request = MergeRequest {
        old_path: &config.old,
        template_path: &config.template,
        prefix: config.prefix.as_deref(),
        options: MergeOptions::default().force(config.force),
    };

    let summary = pipeline::run_merge(&request, plan)?;

    if summary.needs_review() && !config.quiet {
        tracing::warn!(
            "{} new and {} dropped rules need review in {}",
            summary.added.len(),
            summary.dropped_keys.len(),
            summary.output_path.display()
        );
    }

    if config.quiet && config.output.format == ReportFormat::Summary {
        return Ok(exit_codes::SUCCESS);
    }

    let target = OutputTarget::Stdout;
    let (reporter, report_config) = reporter_for(&config.output, &target);
    let report = reporter.generate_merge_report(&summary, &report_config)?;
    write_output(&report, &target, config.quiet)?;

    Ok(exit_codes::SUCCESS)
}

//! Parse command handler.
//!
//! Implements the `parse` subcommand for converting an XCCDF benchmark into
//! a blank checklist.

use super::reporter_for;
use crate::config::ParseConfig;
use crate::pipeline::{exit_codes, parse_to_file, write_output, OutputTarget};
use crate::reports::ReportFormat;
use anyhow::{Context, Result};

/// Run the parse command, returning the desired exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_parse(config: ParseConfig) -> Result<i32> {
    let summary = parse_to_file(&config.input, &config.output_path)
        .with_context(|| format!("Failed to convert {}", config.input.display()))?;

    if config.quiet && config.output.format == ReportFormat::Summary {
        return Ok(exit_codes::SUCCESS);
    }

    let target = OutputTarget::Stdout;
    let (reporter, report_config) = reporter_for(&config.output, &target);
    let report = reporter.generate_parse_report(&summary, &report_config)?;
    write_output(&report, &target, config.quiet)?;

    Ok(exit_codes::SUCCESS)
}

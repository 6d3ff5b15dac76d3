//! Validate command handler.
//!
//! Implements the `validate` subcommand: loads each checklist, reports
//! structural errors and rule-level warnings.

use super::reporter_for;
use crate::config::ValidateConfig;
use crate::pipeline::{exit_codes, validate_file, write_output, OutputTarget, ValidationEntry};
use anyhow::Result;

/// Run the validate command, returning the desired exit code.
///
/// Rule warnings never fail validation; a file that cannot be loaded does.
#[allow(clippy::needless_pass_by_value)]
pub fn run_validate(config: ValidateConfig) -> Result<i32> {
    let entries: Vec<ValidationEntry> = config.paths.iter().map(|p| validate_file(p)).collect();

    let target = OutputTarget::Stdout;
    let (reporter, report_config) = reporter_for(&config.output, &target);
    let report = reporter.generate_validation_report(&entries, &report_config)?;
    write_output(&report, &target, config.quiet)?;

    if entries.iter().all(ValidationEntry::is_valid) {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::ERROR)
    }
}

//! Pipeline orchestration for checklist operations.
//!
//! This module holds the load → merge/diff/validate → write workflows shared
//! by the CLI command handlers, so each handler only parses arguments and
//! renders a report.

mod batch;
mod merge_stage;
mod output;
mod parse_stage;
mod validate_stage;

pub use batch::{batch_exit_code, run_batch_merge, BatchItem};
pub use merge_stage::{merge_loaded, run_merge, MergeRequest, MergeSummary, OutputPlan};
pub use output::{should_use_color, write_output, OutputTarget};
pub use parse_stage::{parse_to_file, ParseSummary};
pub use validate_stage::{validate_file, ValidationEntry};

use crate::error::CklbError;

/// Exit codes for scripting and CI integration
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Differences were found (diff with `--fail-on-change`)
    pub const CHANGES_DETECTED: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
    /// Old checklist and new template are different benchmarks
    pub const STIG_MISMATCH: i32 = 4;
}

/// Exit code for a library error
#[must_use]
pub const fn exit_code_for_error(err: &CklbError) -> i32 {
    if err.is_identity_mismatch() {
        exit_codes::STIG_MISMATCH
    } else {
        exit_codes::ERROR
    }
}

/// Exit code for an error that reached the binary.
///
/// Walks the context chain so a mismatch wrapped by `anyhow` context still
/// maps to [`exit_codes::STIG_MISMATCH`].
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CklbError>())
        .map_or(exit_codes::ERROR, exit_code_for_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::CHANGES_DETECTED, 1);
        assert_eq!(exit_codes::ERROR, 3);
        assert_eq!(exit_codes::STIG_MISMATCH, 4);
    }

    #[test]
    fn test_mismatch_maps_through_context() {
        let err: anyhow::Result<()> = Err(CklbError::StigIdentityMismatch {
            old: "A".to_string(),
            new: "B".to_string(),
            added_rule_count: 3,
        })
        .context("merging old.cklb");
        assert_eq!(exit_code_for(&err.unwrap_err()), exit_codes::STIG_MISMATCH);
    }

    #[test]
    fn test_other_errors_map_to_error() {
        let err = anyhow::Error::new(CklbError::not_found("/missing.cklb"));
        assert_eq!(exit_code_for(&err), exit_codes::ERROR);
        assert_eq!(exit_code_for(&anyhow::anyhow!("plain")), exit_codes::ERROR);
    }
}

//! Diff command handler.
//!
//! Implements the `diff` subcommand for comparing two checklists.

use super::reporter_for;
use crate::config::DiffConfig;
use crate::diff::{DiffEngine, DiffReport};
use crate::pipeline::{exit_codes, write_output, OutputTarget};
use crate::reports::ReportMetadata;
use crate::store;
use anyhow::{Context, Result};

/// Run the diff command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
#[allow(clippy::needless_pass_by_value)]
pub fn run_diff(config: DiffConfig) -> Result<i32> {
    let a = store::load(&config.paths.a)
        .with_context(|| format!("Failed to load {}", config.paths.a.display()))?;
    let b = store::load(&config.paths.b)
        .with_context(|| format!("Failed to load {}", config.paths.b.display()))?;

    let report = DiffEngine::new().diff(&a, &b);

    if !config.quiet {
        let summary = report.summary();
        tracing::info!(
            "{} only in A, {} only in B, {} status changes, {} common",
            summary.only_in_a,
            summary.only_in_b,
            summary.status_changes,
            summary.common
        );
    }

    let exit_code = determine_exit_code(&config, &report);

    let target = OutputTarget::from_option(config.output_file.clone());
    let (reporter, mut report_config) = reporter_for(&config.output, &target);
    report_config.metadata = ReportMetadata::for_pair(&config.paths.a, &config.paths.b);
    let text = reporter.generate_diff_report(&report, &report_config)?;
    write_output(&text, &target, config.quiet)?;

    Ok(exit_code)
}

/// Determine the appropriate exit code based on the report and config flags.
fn determine_exit_code(config: &DiffConfig, report: &DiffReport) -> i32 {
    if config.fail_on_change && report.has_changes() {
        return exit_codes::CHANGES_DETECTED;
    }
    exit_codes::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiffPaths, OutputConfig};
    use crate::diff::RuleEntry;
    use std::path::PathBuf;

    fn config(fail_on_change: bool) -> DiffConfig {
        DiffConfig {
            paths: DiffPaths {
                a: PathBuf::from("a.cklb"),
                b: PathBuf::from("b.cklb"),
            },
            output: OutputConfig::default(),
            output_file: None,
            fail_on_change,
            quiet: true,
        }
    }

    #[test]
    fn test_exit_code_only_with_flag() {
        let report = DiffReport {
            only_in_b: vec![RuleEntry {
                key: "SV-1".to_string(),
                title: String::new(),
            }],
            ..DiffReport::default()
        };
        assert_eq!(determine_exit_code(&config(false), &report), exit_codes::SUCCESS);
        assert_eq!(
            determine_exit_code(&config(true), &report),
            exit_codes::CHANGES_DETECTED
        );
        assert_eq!(
            determine_exit_code(&config(true), &DiffReport::default()),
            exit_codes::SUCCESS
        );
    }

    #[derive(Clone, Default)]
    struct SharedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for SharedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn saved(dir: &std::path::Path, name: &str, stig_id: &str) -> PathBuf {
        use crate::model::{Checklist, StigDefinition};
        let checklist = Checklist {
            title: stig_id.to_string(),
            id: "id".to_string(),
            stigs: vec![StigDefinition {
                stig_id: stig_id.to_string(),
                stig_name: stig_id.to_string(),
                ..StigDefinition::default()
            }],
            ..Checklist::default()
        };
        let path = dir.join(name);
        store::save(&checklist, &path).unwrap();
        path
    }

    #[test]
    fn test_stig_mismatch_warned_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(false);
        config.paths = DiffPaths {
            a: saved(dir.path(), "a.cklb", "RHEL_8_STIG"),
            b: saved(dir.path(), "b.cklb", "Windows_10_STIG"),
        };
        config.output_file = Some(dir.path().join("report.txt"));

        let log = SharedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let code = tracing::subscriber::with_default(subscriber, || run_diff(config)).unwrap();

        assert_eq!(code, exit_codes::SUCCESS);
        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("Comparing different STIGs").count(), 1);
    }
}

//! Batch merge command handler.
//!
//! Implements the `batch-merge` subcommand: one template, many old
//! checklists, merged in parallel into one output directory.

use super::reporter_for;
use crate::config::BatchMergeConfig;
use crate::merge::MergeOptions;
use crate::naming::OutputNamer;
use crate::pipeline::{self, batch_exit_code, write_output, BatchItem, OutputTarget};
use crate::reports::ReportFormat;
use anyhow::{Context, Result};

/// Run the batch-merge command, returning the desired exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_batch_merge(config: BatchMergeConfig) -> Result<i32> {
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory {}", config.output_dir.display())
    })?;

    let namer = OutputNamer::new(&config.output_dir).with_max_suffix(config.max_suffix);
    let options = MergeOptions::default().force(config.force);
    let run = || -> Result<Vec<BatchItem>> {
        Ok(pipeline::run_batch_merge(
            &config.template,
            &config.old,
            &namer,
            config.prefix.as_deref(),
            options,
        )?)
    };

    let items = match config.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to start worker pool")?
            .install(run)?,
        None => run()?,
    };

    let exit_code = batch_exit_code(&items);

    if !(config.quiet && config.output.format == ReportFormat::Summary) {
        let target = OutputTarget::Stdout;
        let (reporter, report_config) = reporter_for(&config.output, &target);
        let report = reporter.generate_batch_report(&items, &report_config)?;
        write_output(&report, &target, config.quiet)?;
    }

    Ok(exit_code)
}

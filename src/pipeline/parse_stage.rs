//! Benchmark → checklist conversion stage.

use crate::error::Result;
use crate::parsers::parse_benchmark;
use crate::store;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a parse produced
#[derive(Debug, Clone, Serialize)]
pub struct ParseSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub stig_id: String,
    pub version: Option<String>,
    pub rule_count: usize,
}

/// Parse an XCCDF benchmark and save it as a checklist.
pub fn parse_to_file(input: &Path, output: &Path) -> Result<ParseSummary> {
    tracing::info!("Parsing benchmark {}", input.display());
    let checklist = parse_benchmark(input)?;
    store::save(&checklist, output)?;

    let stig = checklist.primary_stig();
    let summary = ParseSummary {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        stig_id: checklist.stig_id().unwrap_or_default().to_string(),
        version: stig.and_then(|s| s.version_label()),
        rule_count: checklist.rule_count(),
    };
    tracing::info!(
        "Wrote {} rules for {} to {}",
        summary.rule_count,
        summary.stig_id,
        output.display()
    );
    Ok(summary)
}

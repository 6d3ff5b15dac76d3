//! Single merge stage: load, merge, name, save.
//!
//! The merge runs entirely in memory first; nothing is written until it has
//! succeeded, so a mismatch or a malformed input leaves the output
//! directory untouched.

use crate::diff::{RuleEntry, StigMismatch};
use crate::error::{ErrorContext, Result};
use crate::identity::resolve_key;
use crate::merge::{MergeEngine, MergeOptions, UNKNOWN_STIG_ID};
use crate::model::Checklist;
use crate::naming::{HostIdentity, NamingNotice, OutputNamer};
use crate::store;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where a merged checklist goes
#[derive(Debug, Clone, Copy)]
pub enum OutputPlan<'a> {
    /// Write to exactly this path, replacing any existing file
    Explicit(&'a Path),
    /// Reserve a collision-free name in the namer's directory
    Reserve(&'a OutputNamer),
}

/// Inputs for one merge
#[derive(Debug, Clone, Copy)]
pub struct MergeRequest<'a> {
    pub old_path: &'a Path,
    pub template_path: &'a Path,
    /// Identifier used when the old checklist has no host name
    pub prefix: Option<&'a str>,
    pub options: MergeOptions,
}

/// What a merge did, for reporting
#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    pub old_path: PathBuf,
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub identity: HostIdentity,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<NamingNotice>,
    pub stig_id: String,
    /// Rules whose findings were carried forward
    pub updated: usize,
    /// Rules new in the template, in template order
    pub added: Vec<RuleEntry>,
    /// Old rule keys the template no longer contains
    pub dropped_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_mismatch: Option<StigMismatch>,
}

impl MergeSummary {
    #[must_use]
    pub fn needs_review(&self) -> bool {
        !self.added.is_empty() || !self.dropped_keys.is_empty() || self.forced_mismatch.is_some()
    }
}

/// Load both checklists and merge them.
pub fn run_merge(request: &MergeRequest<'_>, plan: OutputPlan<'_>) -> Result<MergeSummary> {
    tracing::info!(
        "Merging {} into {}",
        request.old_path.display(),
        request.template_path.display()
    );
    let old = store::load(request.old_path)?;
    let template = store::load(request.template_path)?;
    merge_loaded(request, &old, &template, plan)
}

/// Merge already-loaded checklists and write the result.
///
/// `request` paths are still used for naming and reporting.
pub fn merge_loaded(
    request: &MergeRequest<'_>,
    old: &Checklist,
    template: &Checklist,
    plan: OutputPlan<'_>,
) -> Result<MergeSummary> {
    let outcome = MergeEngine::new(request.options)
        .merge(old, template)
        .with_context(|| format!("merging {}", request.old_path.display()))?;

    let identity = HostIdentity::resolve(
        old.target_data.host_name(),
        request.prefix,
        request.old_path,
    );

    let (output_path, identity, notices) = match plan {
        OutputPlan::Explicit(path) => {
            if path.exists() {
                tracing::warn!("Overwriting existing file {}", path.display());
            }
            store::save(&outcome.merged, path)?;
            (path.to_path_buf(), identity, Vec::new())
        }
        OutputPlan::Reserve(namer) => {
            let template_name = request
                .template_path
                .file_name()
                .map_or_else(|| "checklist.cklb".to_string(), |n| n.to_string_lossy().into_owned());
            let name = namer.reserve(identity, &template_name)?;
            if let Err(e) = store::save_new(&outcome.merged, &name.path) {
                namer.release(&name.path);
                return Err(e);
            }
            (name.path, name.identity, name.notices)
        }
    };

    tracing::info!("Wrote {}", output_path.display());

    let added = outcome
        .added_rules
        .iter()
        .map(|rule| RuleEntry {
            key: resolve_key(rule),
            title: rule.display_title().to_string(),
        })
        .collect();

    Ok(MergeSummary {
        old_path: request.old_path.to_path_buf(),
        template_path: request.template_path.to_path_buf(),
        output_path,
        identity,
        notices,
        stig_id: template
            .stig_id()
            .unwrap_or(UNKNOWN_STIG_ID)
            .to_string(),
        updated: outcome.updated,
        added,
        dropped_keys: outcome.dropped_keys,
        forced_mismatch: outcome
            .forced_mismatch
            .map(|(a, b)| StigMismatch { a, b }),
    })
}

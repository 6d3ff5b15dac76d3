//! Batch merge: one template, many old checklists.
//!
//! The template is loaded once and each old checklist is merged on the
//! rayon pool. All merges share one [`OutputNamer`], so outputs for hosts
//! with the same name still get distinct files.

use super::exit_codes;
use super::merge_stage::{merge_loaded, MergeRequest, MergeSummary, OutputPlan};
use crate::error::{CklbError, Result};
use crate::merge::MergeOptions;
use crate::naming::OutputNamer;
use crate::store;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Result of merging one old checklist
#[derive(Debug)]
pub struct BatchItem {
    pub old_path: PathBuf,
    pub result: Result<MergeSummary>,
}

/// Merge every old checklist into `template_path`.
///
/// Fails only when the template itself cannot be loaded; per-file failures
/// are returned in their [`BatchItem`] in input order.
pub fn run_batch_merge(
    template_path: &Path,
    old_paths: &[PathBuf],
    namer: &OutputNamer,
    prefix: Option<&str>,
    options: MergeOptions,
) -> Result<Vec<BatchItem>> {
    let template = store::load(template_path)?;
    tracing::info!(
        "Merging {} checklists into {} ({} rules)",
        old_paths.len(),
        template_path.display(),
        template.rule_count()
    );

    let items = old_paths
        .par_iter()
        .map(|old_path| {
            let request = MergeRequest {
                old_path,
                template_path,
                prefix,
                options,
            };
            let result = store::load(old_path)
                .and_then(|old| merge_loaded(&request, &old, &template, OutputPlan::Reserve(namer)));
            if let Err(e) = &result {
                tracing::warn!("{}: {}", old_path.display(), e);
            }
            BatchItem {
                old_path: old_path.clone(),
                result,
            }
        })
        .collect();

    Ok(items)
}

/// Exit code for a finished batch.
///
/// Success when every merge succeeded; the mismatch code when every failure
/// was a STIG mismatch; the generic error code otherwise.
#[must_use]
pub fn batch_exit_code(items: &[BatchItem]) -> i32 {
    let failures: Vec<&CklbError> = items.iter().filter_map(|i| i.result.as_ref().err()).collect();
    if failures.is_empty() {
        exit_codes::SUCCESS
    } else if failures.iter().all(|e| e.is_identity_mismatch()) {
        exit_codes::STIG_MISMATCH
    } else {
        exit_codes::ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Checklist, Rule, StigDefinition, TargetData};

    fn checklist(stig_id: &str, host: &str) -> Checklist {
        Checklist {
            title: stig_id.to_string(),
            id: "id".to_string(),
            target_data: TargetData {
                host_name: host.to_string(),
                ..TargetData::default()
            },
            stigs: vec![StigDefinition {
                stig_id: stig_id.to_string(),
                stig_name: stig_id.to_string(),
                rules: vec![Rule {
                    rule_id: "SV-1r1".to_string(),
                    ..Rule::default()
                }],
                ..StigDefinition::default()
            }],
            ..Checklist::default()
        }
    }

    #[test]
    fn test_batch_same_host_gets_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("T.cklb");
        store::save(&checklist("S", ""), &template).unwrap();

        let olds: Vec<PathBuf> = (0..4)
            .map(|i| {
                let path = dir.path().join(format!("old{i}.cklb"));
                store::save(&checklist("S", "web01"), &path).unwrap();
                path
            })
            .collect();

        let out = tempfile::tempdir().unwrap();
        let namer = OutputNamer::new(out.path());
        let items = run_batch_merge(&template, &olds, &namer, None, MergeOptions::default()).unwrap();

        assert_eq!(batch_exit_code(&items), exit_codes::SUCCESS);
        let mut outputs: Vec<_> = items
            .iter()
            .map(|i| i.result.as_ref().unwrap().output_path.clone())
            .collect();
        outputs.sort();
        outputs.dedup();
        assert_eq!(outputs.len(), 4);
        assert!(outputs.contains(&out.path().join("web01_T.cklb")));
    }

    #[test]
    fn test_batch_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("T.cklb");
        store::save(&checklist("S", ""), &template).unwrap();
        let wrong = dir.path().join("wrong.cklb");
        store::save(&checklist("OTHER", "h"), &wrong).unwrap();
        let missing = dir.path().join("missing.cklb");

        let out = tempfile::tempdir().unwrap();
        let namer = OutputNamer::new(out.path());

        let items =
            run_batch_merge(&template, &[wrong.clone()], &namer, None, MergeOptions::default()).unwrap();
        assert_eq!(batch_exit_code(&items), exit_codes::STIG_MISMATCH);

        let items =
            run_batch_merge(&template, &[wrong, missing], &namer, None, MergeOptions::default()).unwrap();
        assert_eq!(batch_exit_code(&items), exit_codes::ERROR);
        assert_eq!(items[1].old_path, dir.path().join("missing.cklb"));
    }

    #[test]
    fn test_missing_template_fails_batch() {
        let out = tempfile::tempdir().unwrap();
        let namer = OutputNamer::new(out.path());
        let result = run_batch_merge(
            Path::new("/nonexistent/T.cklb"),
            &[],
            &namer,
            None,
            MergeOptions::default(),
        );
        assert!(matches!(result, Err(CklbError::NotFound { .. })));
    }
}

//! Integration tests for cklb-sync.
//!
//! These exercise the library end to end against the fixtures in
//! `tests/fixtures`: benchmark import, checklist load/save, merge and diff.

use cklb_sync::error::CklbError;
use cklb_sync::model::RuleStatus;
use cklb_sync::{merge, parse_benchmark, resolve_key, store, DiffEngine, MergeOptions};
use std::path::{Path, PathBuf};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn load(name: &str) -> cklb_sync::Checklist {
    store::load(&fixture_path(name)).expect("fixture should load")
}

mod benchmark_import {
    use super::*;

    #[test]
    fn imports_rhel_benchmark() {
        let checklist =
            parse_benchmark(&fixture_path("xccdf/U_RHEL_8_STIG_V1R12_Manual-xccdf.xml")).unwrap();

        assert_eq!(checklist.stig_id(), Some("RHEL_8_STIG"));
        assert_eq!(checklist.rule_count(), 3);

        let stig = checklist.primary_stig().unwrap();
        assert_eq!(stig.version_label().as_deref(), Some("V1R12"));
        assert_eq!(stig.display_name, "Red Hat Enterprise Linux 8 STIG");
        assert_eq!(stig.size, 3);

        let keys: Vec<String> = checklist.rules().map(resolve_key).collect();
        assert_eq!(keys, vec!["SV-100", "SV-200", "SV-300"]);
    }

    #[test]
    fn import_extracts_escaped_description() {
        let checklist =
            parse_benchmark(&fixture_path("xccdf/U_RHEL_8_STIG_V1R12_Manual-xccdf.xml")).unwrap();
        let rule = checklist.rules().next().unwrap();

        assert!(rule.discussion.starts_with("Display of a standardized"));
        assert_eq!(rule.documentable, "false");
        assert_eq!(rule.responsibility, "System Administrator");
        assert_eq!(rule.ccis, vec!["CCI-000048", "CCI-001384"]);
        assert!(rule.check_content.contains("sudo cat /etc/issue"));
        assert_eq!(
            rule.evaluate_stig.as_ref().unwrap().answer_file,
            "U_RHEL_8_STIG_V1R12_Manual-xccdf.xml"
        );
    }

    #[test]
    fn import_then_save_then_load_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("RHEL_8_V1R12.cklb");

        let imported =
            parse_benchmark(&fixture_path("xccdf/U_RHEL_8_STIG_V1R12_Manual-xccdf.xml")).unwrap();
        store::save(&imported, &out).unwrap();
        let reloaded = store::load(&out).unwrap();

        assert_eq!(reloaded, imported);
        assert!(store::validate_rules(&reloaded).is_empty());
    }

    #[test]
    fn parsing_twice_differs_only_in_generated_fields() {
        let path = fixture_path("xccdf/U_RHEL_8_STIG_V1R12_Manual-xccdf.xml");
        let strip = |mut checklist: cklb_sync::Checklist| {
            checklist.id.clear();
            for stig in &mut checklist.stigs {
                stig.uuid.clear();
                stig.evaluate_stig = None;
                for rule in &mut stig.rules {
                    rule.uuid.clear();
                    rule.stig_uuid.clear();
                }
            }
            checklist
        };

        let first = strip(parse_benchmark(&path).unwrap());
        let second = strip(parse_benchmark(&path).unwrap());

        assert_eq!(first, second);
    }

    #[test]
    fn missing_benchmark_is_not_found() {
        let err = parse_benchmark(&fixture_path("xccdf/missing.xml")).unwrap_err();
        assert!(matches!(err, CklbError::NotFound { .. }));
    }

    #[test]
    fn checklist_json_is_not_a_benchmark() {
        let err = parse_benchmark(&fixture_path("cklb/RHEL_8_V1R12.cklb")).unwrap_err();
        assert!(matches!(err, CklbError::InvalidXml { .. }));
    }
}

mod checklist_store {
    use super::*;

    #[test]
    fn save_preserves_document() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("copy.cklb");

        let original = load("cklb/web01_RHEL_8_V1R11.cklb");
        store::save(&original, &out).unwrap();
        assert_eq!(store::load(&out).unwrap(), original);
    }

    #[test]
    fn missing_stigs_is_schema_invalid() {
        let err = store::load(&fixture_path("invalid/missing_stigs.cklb")).unwrap_err();
        assert!(matches!(err, CklbError::SchemaInvalid { .. }));
        assert!(err.to_string().contains("missing_stigs.cklb"));
    }

    #[test]
    fn truncated_is_invalid_json() {
        let err = store::load(&fixture_path("invalid/truncated.cklb")).unwrap_err();
        assert!(matches!(err, CklbError::InvalidJson { .. }));
    }

    #[test]
    fn missing_discussion_is_repaired() {
        let checklist = load("cklb/no_discussion.cklb");
        let rule = checklist.rules().next().unwrap();
        assert_eq!(rule.discussion, "");
        assert_eq!(rule.status(), RuleStatus::Open);
    }
}

mod merge_scenarios {
    use super::*;

    #[test]
    fn findings_carry_into_new_release() {
        let old = load("cklb/web01_RHEL_8_V1R11.cklb");
        let template = load("cklb/RHEL_8_V1R12.cklb");

        let outcome = merge(&old, &template, MergeOptions::default()).unwrap();
        let merged = &outcome.merged;

        assert_eq!(outcome.updated, 2);
        assert_eq!(outcome.added_keys(), vec!["SV-200"]);
        assert_eq!(outcome.dropped_keys, vec!["SV-050"]);
        assert!(outcome.forced_mismatch.is_none());
        assert!(outcome.needs_review());

        let rules: Vec<_> = merged.rules().collect();
        assert_eq!(rules.len(), 3);

        let banner = rules[0];
        assert_eq!(banner.rule_id, "SV-100r3");
        assert_eq!(banner.status(), RuleStatus::Open);
        assert_eq!(banner.comments, "Banner text missing.");
        assert_eq!(banner.finding_details, "/etc/issue is empty");
        assert!(banner.overrides.contains_key("severity"));
        assert!(banner.rule_title.contains("Standard Mandatory DoD Notice"));

        assert_eq!(rules[1].status(), RuleStatus::NotReviewed);
        assert_eq!(rules[2].status(), RuleStatus::NotAFinding);

        assert_eq!(merged.target_data.host_name(), Some("web01"));
        assert_eq!(merged.stig_id(), Some("RHEL_8_STIG"));
        assert!(merged.evaluate_stig.is_none());
    }

    #[test]
    fn merge_leaves_inputs_untouched() {
        let old = load("cklb/web01_RHEL_8_V1R11.cklb");
        let template = load("cklb/RHEL_8_V1R12.cklb");
        let (old_before, template_before) = (old.clone(), template.clone());

        merge(&old, &template, MergeOptions::default()).unwrap();

        assert_eq!(old, old_before);
        assert_eq!(template, template_before);
    }

    #[test]
    fn different_stig_is_refused() {
        let old = load("cklb/ws01_WIN_10_V2R8.cklb");
        let template = load("cklb/RHEL_8_V1R12.cklb");

        let err = merge(&old, &template, MergeOptions::default()).unwrap_err();
        match err {
            CklbError::StigIdentityMismatch {
                old,
                new,
                added_rule_count,
            } => {
                assert_eq!(old, "Windows_10_STIG");
                assert_eq!(new, "RHEL_8_STIG");
                assert_eq!(added_rule_count, 2);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn force_merges_across_stigs() {
        let old = load("cklb/ws01_WIN_10_V2R8.cklb");
        let template = load("cklb/RHEL_8_V1R12.cklb");

        let outcome = merge(&old, &template, MergeOptions::default().force(true)).unwrap();

        assert_eq!(
            outcome.forced_mismatch,
            Some(("Windows_10_STIG".to_string(), "RHEL_8_STIG".to_string()))
        );
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.merged.rule_count(), 3);
        assert_eq!(outcome.merged.stig_id(), Some("RHEL_8_STIG"));
    }

    #[test]
    fn imported_template_accepts_findings() {
        let old = load("cklb/web01_RHEL_8_V1R11.cklb");
        let template =
            parse_benchmark(&fixture_path("xccdf/U_RHEL_8_STIG_V1R12_Manual-xccdf.xml")).unwrap();

        let outcome = merge(&old, &template, MergeOptions::default()).unwrap();

        assert_eq!(outcome.updated, 2);
        assert_eq!(outcome.added_keys(), vec!["SV-200"]);
    }
}

mod diff_scenarios {
    use super::*;

    #[test]
    fn reports_both_sides_and_status_changes() {
        let a = load("diff/a.cklb");
        let b = load("diff/b.cklb");

        let report = DiffEngine::new().diff(&a, &b);

        assert!(report.stig_mismatch.is_none());
        assert_eq!(report.only_in_a_keys(), vec!["SV-1"]);
        assert_eq!(report.only_in_b.len(), 1);
        assert_eq!(report.only_in_b[0].key, "SV-3");
        assert_eq!(report.only_in_b[0].title, "Third rule");
        assert_eq!(report.common, 1);

        assert_eq!(report.status_diffs.len(), 1);
        let change = &report.status_diffs[0];
        assert_eq!(change.key, "SV-2");
        assert_eq!(change.a.as_deref(), Some("not_a_finding"));
        assert_eq!(change.b.as_deref(), Some("open"));

        let summary = report.summary();
        assert_eq!(summary.total_changes, 3);
        assert!(report.has_changes());
    }

    #[test]
    fn comment_only_changes_are_ignored() {
        let a = load("diff/a.cklb");
        let b = load("diff/b_same_findings.cklb");

        let report = DiffEngine::new().diff(&a, &b);

        assert!(!report.has_changes());
        assert_eq!(report.common, 2);
    }

    #[test]
    fn diff_is_symmetric_in_one_sided_rules() {
        let a = load("diff/a.cklb");
        let b = load("diff/b.cklb");

        let forward = DiffEngine::new().diff(&a, &b);
        let backward = DiffEngine::new().diff(&b, &a);

        assert_eq!(forward.only_in_a, backward.only_in_b);
        assert_eq!(forward.only_in_b, backward.only_in_a);
    }

    #[test]
    fn mismatch_is_reported_and_diff_still_runs() {
        let a = load("cklb/web01_RHEL_8_V1R11.cklb");
        let b = load("cklb/ws01_WIN_10_V2R8.cklb");

        let report = DiffEngine::new().diff(&a, &b);

        let mismatch = report.stig_mismatch.as_ref().unwrap();
        assert_eq!(mismatch.a, "RHEL_8_STIG");
        assert_eq!(mismatch.b, "Windows_10_STIG");
        assert_eq!(report.common, 1);
        assert_eq!(report.status_diffs.len(), 1);
    }

    #[test]
    fn merged_output_matches_old_findings() {
        let old = load("cklb/web01_RHEL_8_V1R11.cklb");
        let template = load("cklb/RHEL_8_V1R12.cklb");
        let merged = merge(&old, &template, MergeOptions::default()).unwrap().merged;

        let report = DiffEngine::new().diff(&old, &merged);

        assert!(report.status_diffs.is_empty());
        assert_eq!(report.only_in_a_keys(), vec!["SV-050"]);
        assert_eq!(report.only_in_b.len(), 1);
        assert_eq!(report.only_in_b[0].key, "SV-200");
    }
}

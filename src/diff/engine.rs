//! Diff engine implementation.

use super::result::{DiffReport, RuleEntry, StatusDiff, StigMismatch};
use crate::identity::{finding_value, RuleIndex};
use crate::model::{Checklist, Rule};

/// Compares two checklists
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine;

impl DiffEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Diff `a` against `b`.
    ///
    /// Read-only: a STIG id mismatch is recorded in the report and the rule
    /// comparison still runs.
    pub fn diff(&self, a: &Checklist, b: &Checklist) -> DiffReport {
        let stig_mismatch = match (a.stig_id(), b.stig_id()) {
            (Some(id_a), Some(id_b)) if id_a != id_b => {
                tracing::warn!("Comparing different STIGs: '{}' vs '{}'", id_a, id_b);
                Some(StigMismatch {
                    a: id_a.to_string(),
                    b: id_b.to_string(),
                })
            }
            _ => None,
        };

        let index_a = RuleIndex::from_checklist(a);
        let index_b = RuleIndex::from_checklist(b);

        let mut only_in_a = Vec::new();
        let mut status_diffs = Vec::new();
        let mut common = 0;

        for (key, rule_a) in index_a.iter() {
            match index_b.get(key) {
                Some(rule_b) => {
                    common += 1;
                    let finding_a = finding_value(rule_a);
                    let finding_b = finding_value(rule_b);
                    if finding_a != finding_b {
                        status_diffs.push(StatusDiff {
                            key: key.to_string(),
                            title: rule_b.display_title().to_string(),
                            a: finding_a.map(str::to_string),
                            b: finding_b.map(str::to_string),
                        });
                    }
                }
                None => only_in_a.push(entry(key, rule_a)),
            }
        }
        only_in_a.extend(index_a.unkeyed().iter().map(|rule| entry("", rule)));

        let mut only_in_b: Vec<RuleEntry> = index_b
            .iter()
            .filter(|(key, _)| !index_a.contains_key(key))
            .map(|(key, rule)| entry(key, rule))
            .collect();
        only_in_b.extend(index_b.unkeyed().iter().map(|rule| entry("", rule)));

        tracing::debug!(
            "Diff: {} only in A, {} only in B, {} status changes, {} common",
            only_in_a.len(),
            only_in_b.len(),
            status_diffs.len(),
            common
        );

        DiffReport {
            stig_mismatch,
            only_in_a,
            only_in_b,
            status_diffs,
            common,
        }
    }
}

fn entry(key: &str, rule: &Rule) -> RuleEntry {
    RuleEntry {
        key: key.to_string(),
        title: rule.display_title().to_string(),
    }
}

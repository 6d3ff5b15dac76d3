//! Merge engine.
//!
//! Carries reviewer findings from an old checklist into the rule set of a
//! newer template. The template is cloned and only reviewer-owned fields
//! are copied onto it, so descriptive text always reflects the new
//! benchmark and rules absent from the template are never reintroduced.

use crate::error::{CklbError, Result};
use crate::identity::{resolve_key, RuleIndex};
use crate::model::{Checklist, Rule};
use std::collections::HashSet;

/// Stig id used when a checklist has no STIG definition
pub const UNKNOWN_STIG_ID: &str = "UNKNOWN";

/// Options controlling a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Merge even when the STIG ids differ
    pub force: bool,
}

impl MergeOptions {
    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Result of a successful merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged checklist, in template rule order
    pub merged: Checklist,
    /// Template rules with no counterpart in the old checklist, in template order
    pub added_rules: Vec<Rule>,
    /// Number of rules whose findings were carried forward
    pub updated: usize,
    /// Keys present in the old checklist but not in the template
    pub dropped_keys: Vec<String>,
    /// `(old, new)` STIG ids when a mismatch was overridden with `force`
    pub forced_mismatch: Option<(String, String)>,
}

impl MergeOutcome {
    /// Comparison keys of the added rules
    #[must_use]
    pub fn added_keys(&self) -> Vec<String> {
        self.added_rules.iter().map(resolve_key).collect()
    }

    /// Whether a human should look at the result before relying on it
    #[must_use]
    pub fn needs_review(&self) -> bool {
        !self.added_rules.is_empty() || !self.dropped_keys.is_empty() || self.forced_mismatch.is_some()
    }
}

/// Merges an old checklist into a new template
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    options: MergeOptions,
}

impl MergeEngine {
    #[must_use]
    pub const fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    /// Merge `old` into `template`.
    ///
    /// Fails with [`CklbError::StigIdentityMismatch`] when the STIG ids differ
    /// and `force` is not set. Neither input is modified.
    pub fn merge(&self, old: &Checklist, template: &Checklist) -> Result<MergeOutcome> {
        let old_stig_id = primary_stig_id(old);
        let new_stig_id = primary_stig_id(template);

        let old_index = RuleIndex::from_checklist(old);

        let forced_mismatch = if old_stig_id == new_stig_id {
            None
        } else if self.options.force {
            tracing::warn!(
                "Forcing merge across STIG ids: '{}' -> '{}'",
                old_stig_id,
                new_stig_id
            );
            Some((old_stig_id.to_string(), new_stig_id.to_string()))
        } else {
            let added_rule_count = template
                .rules()
                .filter(|rule| !old_index.contains_key(&resolve_key(rule)))
                .count();
            return Err(CklbError::StigIdentityMismatch {
                old: old_stig_id.to_string(),
                new: new_stig_id.to_string(),
                added_rule_count,
            });
        };

        let mut merged = template.clone();
        let mut added_rules = Vec::new();
        let mut updated = 0;
        let mut template_keys = HashSet::new();

        for rule in merged.rules_mut() {
            let key = resolve_key(rule);
            match old_index.get(&key) {
                Some(previous) => {
                    carry_findings(previous, rule);
                    updated += 1;
                }
                None => {
                    tracing::debug!("New rule {}", if key.is_empty() { "<no id>" } else { key.as_str() });
                    added_rules.push(rule.clone());
                }
            }
            template_keys.insert(key);
        }

        merged.target_data = old.target_data.clone();
        merged.cklb_version.clone_from(&old.cklb_version);
        merged.evaluate_stig = None;

        let dropped_keys: Vec<String> = old_index
            .keys()
            .filter(|key| !template_keys.contains(*key))
            .map(str::to_string)
            .collect();

        tracing::info!(
            "Merged {} rules ({} added, {} no longer in template)",
            updated,
            added_rules.len(),
            dropped_keys.len()
        );

        Ok(MergeOutcome {
            merged,
            added_rules,
            updated,
            dropped_keys,
            forced_mismatch,
        })
    }
}

/// Merge with the given options
pub fn merge(old: &Checklist, template: &Checklist, options: MergeOptions) -> Result<MergeOutcome> {
    MergeEngine::new(options).merge(old, template)
}

fn primary_stig_id(checklist: &Checklist) -> &str {
    checklist
        .primary_stig()
        .map_or(UNKNOWN_STIG_ID, |stig| stig.stig_id.as_str())
}

/// Copy reviewer-owned fields from `previous` onto `target`.
fn carry_findings(previous: &Rule, target: &mut Rule) {
    if previous.status.is_some() {
        target.status.clone_from(&previous.status);
    }
    target.comments.clone_from(&previous.comments);
    target.finding_details.clone_from(&previous.finding_details);
    target.overrides.clone_from(&previous.overrides);
    if let (Some(from), Some(to)) = (&previous.evaluate_stig, &mut target.evaluate_stig) {
        to.old_status.clone_from(&from.old_status);
        to.new_status.clone_from(&from.new_status);
    }
}

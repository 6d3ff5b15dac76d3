//! Rule comparison keys.
//!
//! Different exports name the rule identifier differently and append
//! volatile revision suffixes (`SV-230221r858734_rule`). A comparison key is
//! the first non-empty identity field, cut down to its `SV-<digits>` prefix
//! when it has one, so the same logical rule matches across revisions.

use crate::model::{Checklist, Rule};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

/// Candidate identity fields, highest priority first
pub const IDENTITY_FIELDS: [&str; 6] = ["rule_id", "id", "RuleId", "Rule_ID", "group_id_src", "group_id"];

/// Candidate finding fields, highest priority first
pub const FINDING_FIELDS: [&str; 3] = ["status", "finding", "Finding"];

static SV_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^SV-\d+").expect("static regex"));

/// Normalise a raw identifier to its comparison key
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    SV_PREFIX
        .find(raw)
        .map_or_else(|| raw.to_string(), |m| m.as_str().to_string())
}

/// Comparison key for a rule; empty when it has no identity field
#[must_use]
pub fn resolve_key(rule: &Rule) -> String {
    IDENTITY_FIELDS
        .iter()
        .find_map(|field| rule.field(field))
        .map(normalize_key)
        .unwrap_or_default()
}

/// Finding value for a rule: `status`, else `finding`/`Finding`
#[must_use]
pub fn finding_value(rule: &Rule) -> Option<&str> {
    FINDING_FIELDS.iter().find_map(|field| rule.field(field))
}

/// Rules indexed by comparison key.
///
/// Duplicate keys keep the last-seen rule. Rules with an empty key never
/// match anything, so they are kept aside in [`RuleIndex::unkeyed`].
#[derive(Debug, Default)]
pub struct RuleIndex<'a> {
    by_key: IndexMap<String, &'a Rule>,
    unkeyed: Vec<&'a Rule>,
}

impl<'a> RuleIndex<'a> {
    /// Index every rule in every STIG of a checklist
    #[must_use]
    pub fn from_checklist(checklist: &'a Checklist) -> Self {
        Self::from_rules(checklist.rules())
    }

    pub fn from_rules(rules: impl IntoIterator<Item = &'a Rule>) -> Self {
        let mut index = Self::default();
        for rule in rules {
            index.insert(rule);
        }
        index
    }

    fn insert(&mut self, rule: &'a Rule) {
        let key = resolve_key(rule);
        if key.is_empty() {
            self.unkeyed.push(rule);
            return;
        }
        if self.by_key.insert(key.clone(), rule).is_some() {
            tracing::debug!("Duplicate rule key {}, keeping the later rule", key);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a Rule> {
        if key.is_empty() {
            return None;
        }
        self.by_key.get(key).copied()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keyed rules, in first-seen key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &'a Rule)> + '_ {
        self.by_key.iter().map(|(k, r)| (k.as_str(), *r))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_key.keys().map(String::as_str)
    }

    /// Rules without any identity field
    #[must_use]
    pub fn unkeyed(&self) -> &[&'a Rule] {
        &self.unkeyed
    }

    /// Number of distinct keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty() && self.unkeyed.is_empty()
    }
}

//! Diff report structures.

use serde::{Deserialize, Serialize};

/// Differing STIG ids between the two documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StigMismatch {
    pub a: String,
    pub b: String,
}

/// A rule present on one side only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Comparison key; empty for rules without any identity field
    pub key: String,
    pub title: String,
}

/// A rule present on both sides with a different finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDiff {
    pub key: String,
    pub title: String,
    /// Finding in document A, `None` when it has none
    pub a: Option<String>,
    /// Finding in document B, `None` when it has none
    pub b: Option<String>,
}

/// Counts derived from a [`DiffReport`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub only_in_a: usize,
    pub only_in_b: usize,
    pub status_changes: usize,
    pub common: usize,
    pub total_changes: usize,
}

/// Complete result of comparing two checklists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct DiffReport {
    /// Set when both documents carry a STIG id and they differ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stig_mismatch: Option<StigMismatch>,
    /// Rules in A but not B, in A's order
    pub only_in_a: Vec<RuleEntry>,
    /// Rules in B but not A, in B's order
    pub only_in_b: Vec<RuleEntry>,
    /// Rules in both with differing findings, in A's order
    pub status_diffs: Vec<StatusDiff>,
    /// Number of keys present in both documents
    pub common: usize,
}

impl DiffReport {
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            only_in_a: self.only_in_a.len(),
            only_in_b: self.only_in_b.len(),
            status_changes: self.status_diffs.len(),
            common: self.common,
            total_changes: self.only_in_a.len() + self.only_in_b.len() + self.status_diffs.len(),
        }
    }

    /// Whether anything differs between the two rule sets
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.only_in_a.is_empty() || !self.only_in_b.is_empty() || !self.status_diffs.is_empty()
    }

    /// Keys only in A
    #[must_use]
    pub fn only_in_a_keys(&self) -> Vec<&str> {
        self.only_in_a.iter().map(|e| e.key.as_str()).collect()
    }

    /// Keys only in B
    #[must_use]
    pub fn only_in_b_keys(&self) -> Vec<&str> {
        self.only_in_b.iter().map(|e| e.key.as_str()).collect()
    }
}

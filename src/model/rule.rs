//! Rule records and finding status.

use super::{lenient_string, null_as_default};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Review outcome recorded for a rule.
///
/// Unknown spellings found in imported documents are kept verbatim in
/// [`RuleStatus::Other`] so they are never rewritten on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleStatus {
    #[default]
    NotReviewed,
    NotApplicable,
    Open,
    NotAFinding,
    Other(String),
}

impl RuleStatus {
    /// Wire spelling of the status
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotReviewed => "not_reviewed",
            Self::NotApplicable => "not_applicable",
            Self::Open => "open",
            Self::NotAFinding => "not_a_finding",
            Self::Other(s) => s,
        }
    }

    /// Whether this is one of the four recognised values
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for RuleStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "not_reviewed" => Self::NotReviewed,
            "not_applicable" => Self::NotApplicable,
            "open" => Self::Open,
            "not_a_finding" => Self::NotAFinding,
            _ => Self::Other(s),
        }
    }
}

impl From<RuleStatus> for String {
    fn from(status: RuleStatus) -> Self {
        match status {
            RuleStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-rule import bookkeeping (`evaluate-stig` block).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleEvaluation {
    #[serde(deserialize_with = "lenient_string")]
    pub answer_file: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_write: String,
    #[serde(deserialize_with = "null_as_default")]
    pub afmod: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub old_status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub new_status: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Reference to external check content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckContentRef {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One level of the group hierarchy a rule sits in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupTreeEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One checkable control item.
///
/// Descriptive fields come from the benchmark; `status`, `comments`,
/// `finding_details` and `overrides` belong to the reviewer and are the
/// fields a merge carries forward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    #[serde(rename = "evaluate-stig", skip_serializing_if = "Option::is_none")]
    pub evaluate_stig: Option<RuleEvaluation>,

    // Identity
    #[serde(deserialize_with = "lenient_string")]
    pub group_id_src: String,
    #[serde(deserialize_with = "null_as_default")]
    pub group_tree: Vec<GroupTreeEntry>,
    #[serde(deserialize_with = "lenient_string")]
    pub group_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub group_title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub severity: String,
    #[serde(deserialize_with = "lenient_string")]
    pub rule_id_src: String,
    #[serde(deserialize_with = "lenient_string")]
    pub rule_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub rule_version: String,

    // Descriptive
    #[serde(deserialize_with = "lenient_string")]
    pub rule_title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fix_text: String,
    #[serde(deserialize_with = "lenient_string")]
    pub weight: String,
    #[serde(deserialize_with = "lenient_string")]
    pub check_content: String,
    pub check_content_ref: Option<CheckContentRef>,
    #[serde(deserialize_with = "lenient_string")]
    pub classification: String,
    #[serde(deserialize_with = "lenient_string")]
    pub discussion: String,
    #[serde(deserialize_with = "lenient_string")]
    pub false_positives: String,
    #[serde(deserialize_with = "lenient_string")]
    pub false_negatives: String,
    #[serde(deserialize_with = "lenient_string")]
    pub documentable: String,
    #[serde(deserialize_with = "lenient_string")]
    pub security_override_guidance: String,
    #[serde(deserialize_with = "lenient_string")]
    pub potential_impacts: String,
    #[serde(deserialize_with = "lenient_string")]
    pub third_party_tools: String,
    #[serde(deserialize_with = "lenient_string")]
    pub mitigations: String,
    #[serde(deserialize_with = "lenient_string")]
    pub mitigation_control: String,
    #[serde(deserialize_with = "lenient_string")]
    pub responsibility: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ia_controls: String,
    #[serde(deserialize_with = "null_as_default")]
    pub legacy_ids: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub ccis: Vec<String>,
    pub reference_identifier: Option<String>,

    // Bookkeeping
    #[serde(deserialize_with = "lenient_string")]
    pub uuid: String,
    #[serde(deserialize_with = "lenient_string")]
    pub stig_uuid: String,

    // Reviewer-owned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RuleStatus>,
    #[serde(deserialize_with = "null_as_default")]
    pub overrides: IndexMap<String, Value>,
    #[serde(deserialize_with = "lenient_string")]
    pub comments: String,
    #[serde(deserialize_with = "lenient_string")]
    pub finding_details: String,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Rule {
    /// Effective status, `not_reviewed` when the document has none
    #[must_use]
    pub fn status(&self) -> RuleStatus {
        self.status.clone().unwrap_or_default()
    }

    /// Look up a string-valued field by its wire name.
    ///
    /// Known fields are read from the typed struct; anything else is read
    /// from the preserved extra keys. Empty strings count as absent.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "rule_id" => self.rule_id.as_str(),
            "rule_id_src" => self.rule_id_src.as_str(),
            "group_id_src" => self.group_id_src.as_str(),
            "group_id" => self.group_id.as_str(),
            "rule_title" => self.rule_title.as_str(),
            "group_title" => self.group_title.as_str(),
            "status" => return self.status.as_ref().map(RuleStatus::as_str),
            other => self.extra.get(other).and_then(Value::as_str).unwrap_or(""),
        };
        (!value.is_empty()).then_some(value)
    }

    /// Best available human title
    #[must_use]
    pub fn display_title(&self) -> &str {
        ["rule_title", "title", "group_title"]
            .iter()
            .find_map(|name| self.field(name))
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&RuleStatus::NotAFinding).unwrap();
        assert_eq!(json, "\"not_a_finding\"");
        let parsed: RuleStatus = serde_json::from_str("\"not_applicable\"").unwrap();
        assert_eq!(parsed, RuleStatus::NotApplicable);
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let parsed: RuleStatus = serde_json::from_str("\"NotAFinding\"").unwrap();
        assert_eq!(parsed, RuleStatus::Other("NotAFinding".to_string()));
        assert!(!parsed.is_known());
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"NotAFinding\"");
    }

    #[test]
    fn test_missing_status_defaults_to_not_reviewed() {
        let rule: Rule = serde_json::from_str(r#"{"rule_id": "SV-1r1"}"#).unwrap();
        assert!(rule.status.is_none());
        assert_eq!(rule.status(), RuleStatus::NotReviewed);
    }

    #[test]
    fn test_field_lookup_reads_extra_keys() {
        let rule: Rule =
            serde_json::from_str(r#"{"RuleId": "SV-9r2_rule", "title": "Legacy"}"#).unwrap();
        assert_eq!(rule.field("RuleId"), Some("SV-9r2_rule"));
        assert_eq!(rule.field("rule_id"), None);
        assert_eq!(rule.display_title(), "Legacy");
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let input = r#"{"rule_id":"SV-1","custom_tag":{"a":1}}"#;
        let rule: Rule = serde_json::from_str(input).unwrap();
        let out = serde_json::to_value(&rule).unwrap();
        assert_eq!(out["custom_tag"]["a"], 1);
    }

    #[test]
    fn test_evaluate_stig_key_name() {
        let rule = Rule {
            evaluate_stig: Some(RuleEvaluation {
                old_status: "open".to_string(),
                ..RuleEvaluation::default()
            }),
            ..Rule::default()
        };
        let out = serde_json::to_value(&rule).unwrap();
        assert_eq!(out["evaluate-stig"]["old_status"], "open");
    }
}

//! Checklist root document, host identity and STIG definitions.

use super::{lenient_string, null_as_default, Rule};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// `Release: <n>` inside a benchmark's release-info text
static RELEASE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Release:\s*(\d+)").expect("static regex"));

/// Identity of the system a checklist describes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetData {
    #[serde(deserialize_with = "lenient_string")]
    pub target_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub host_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ip_address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub mac_address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fqdn: String,
    #[serde(deserialize_with = "lenient_string")]
    pub comments: String,
    #[serde(deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_web_database: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub technology_area: String,
    #[serde(deserialize_with = "lenient_string")]
    pub web_db_site: String,
    #[serde(deserialize_with = "lenient_string")]
    pub web_db_instance: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl TargetData {
    /// Blank host identity as written by a fresh import
    #[must_use]
    pub fn blank_host() -> Self {
        Self {
            target_type: "host".to_string(),
            ..Self::default()
        }
    }

    /// Host name, if one is recorded
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        let trimmed = self.host_name.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Tool that generated a STIG definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleInfo {
    pub name: String,
    pub version: String,
}

/// STIG-level import bookkeeping (`evaluate-stig` block)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StigEvaluation {
    #[serde(deserialize_with = "lenient_string")]
    pub time: String,
    pub module: ModuleInfo,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One benchmark instantiated inside a checklist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StigDefinition {
    #[serde(rename = "evaluate-stig", skip_serializing_if = "Option::is_none")]
    pub evaluate_stig: Option<StigEvaluation>,
    #[serde(deserialize_with = "lenient_string")]
    pub stig_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub display_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub stig_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub release_info: String,
    #[serde(deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(deserialize_with = "lenient_string")]
    pub uuid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub size: usize,
    pub reference_identifier: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub rules: Vec<Rule>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl StigDefinition {
    /// Release number parsed from `release_info`, e.g. `12` for
    /// `"Release: 12 Benchmark Date: 24 Jan 2024"`
    #[must_use]
    pub fn release_number(&self) -> Option<u32> {
        RELEASE_NUMBER
            .captures(&self.release_info)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// `V<version>R<release>` label, when both parts are known
    #[must_use]
    pub fn version_label(&self) -> Option<String> {
        let version = self.version.trim();
        if version.is_empty() {
            return None;
        }
        self.release_number()
            .map(|release| format!("V{version}R{release}"))
    }
}

/// Root CKLB document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checklist {
    #[serde(rename = "evaluate-stig", skip_serializing_if = "Option::is_none")]
    pub evaluate_stig: Option<Value>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stigs: Vec<StigDefinition>,
    #[serde(deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub mode: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub has_path: bool,
    pub target_data: TargetData,
    #[serde(deserialize_with = "lenient_string")]
    pub cklb_version: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Checklist {
    /// First STIG definition, the one every engine operates on
    #[must_use]
    pub fn primary_stig(&self) -> Option<&StigDefinition> {
        self.stigs.first()
    }

    /// `stig_id` of the first STIG, if it has a non-empty one
    #[must_use]
    pub fn stig_id(&self) -> Option<&str> {
        self.primary_stig()
            .map(|stig| stig.stig_id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Every rule across every STIG, in document order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.stigs.iter().flat_map(|stig| stig.rules.iter())
    }

    /// Mutable access to every rule across every STIG
    pub fn rules_mut(&mut self) -> impl Iterator<Item = &mut Rule> {
        self.stigs.iter_mut().flat_map(|stig| stig.rules.iter_mut())
    }

    /// Total number of rules
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.stigs.iter().map(|stig| stig.rules.len()).sum()
    }
}

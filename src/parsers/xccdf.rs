//! XCCDF 1.1 benchmark parser.
//!
//! Converts a benchmark document into a fresh checklist template: one
//! [`StigDefinition`] whose rules come from the direct `Group` children of
//! the `Benchmark` root, all at `not_reviewed`.

use super::xml_tree::{parse_document, Element};
use crate::error::{CklbError, ErrorContext, Result};
use crate::model::{
    CheckContentRef, Checklist, GroupTreeEntry, ModuleInfo, Rule, RuleEvaluation, RuleStatus,
    StigDefinition, StigEvaluation, TargetData,
};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use uuid::Uuid;

/// XCCDF 1.1 namespace
pub const XCCDF_NS: &str = "http://checklists.nist.gov/xccdf/1.1";

/// `ident/@system` value marking a CCI reference
pub const CCI_SYSTEM: &str = "http://cyber.mil/cci";

/// Version string written into generated checklists
pub const CKLB_VERSION: &str = "1.0";

/// Description sub-elements, in extraction order
const DESCRIPTION_TAGS: [&str; 11] = [
    "VulnDiscussion",
    "FalsePositives",
    "FalseNegatives",
    "Documentable",
    "SeverityOverrideGuidance",
    "PotentialImpacts",
    "ThirdPartyTools",
    "Mitigations",
    "MitigationControl",
    "Responsibility",
    "IAControls",
];

/// Embedded-tag extractors for descriptions whose sections arrive as
/// escaped markup inside the description text
static EMBEDDED_SECTIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DESCRIPTION_TAGS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?s)<{tag}>(.*?)</{tag}>")).expect("static regex"))
        .collect()
});

/// Where a benchmark came from; recorded in every rule's bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSource {
    /// Base name of the XCCDF file
    pub file_name: String,
    /// Last-modified time of the XCCDF file
    pub modified: DateTime<Utc>,
}

impl BenchmarkSource {
    #[must_use]
    pub fn new(file_name: impl Into<String>, modified: DateTime<Utc>) -> Self {
        Self {
            file_name: file_name.into(),
            modified,
        }
    }

    /// Read the name and modification time of a file on disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| CklbError::io(path, e))?;
        let modified = metadata.modified().map_err(|e| CklbError::io(path, e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, DateTime::<Utc>::from(modified)))
    }
}

/// Parser for XCCDF benchmark documents
#[derive(Debug, Clone)]
pub struct XccdfParser {
    generator: ModuleInfo,
}

impl Default for XccdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl XccdfParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            generator: ModuleInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Parse benchmark XML into a checklist template
    pub fn parse_str(&self, content: &str, source: &BenchmarkSource) -> Result<Checklist> {
        let root = parse_document(content)?;
        if !root.is(XCCDF_NS, "Benchmark") {
            return Err(CklbError::invalid_xml(
                "document root",
                format!(
                    "expected {{{XCCDF_NS}}}Benchmark, found {}{}",
                    root.namespace
                        .as_deref()
                        .map(|ns| format!("{{{ns}}}"))
                        .unwrap_or_default(),
                    root.name
                ),
            ));
        }
        Ok(self.build_checklist(&root, source))
    }

    fn build_checklist(&self, benchmark: &Element, source: &BenchmarkSource) -> Checklist {
        let stig_name = child_text(benchmark, "title");
        let stig_uuid = Uuid::new_v4().to_string();
        let last_write = source.modified.to_rfc3339_opts(SecondsFormat::Micros, true);

        let rules: Vec<Rule> = benchmark
            .children_named(XCCDF_NS, "Group")
            .filter_map(|group| build_rule(group, source, &last_write, &stig_uuid))
            .collect();

        tracing::debug!(
            "Extracted {} rules from {}",
            rules.len(),
            source.file_name
        );

        let release_info = benchmark
            .children_named(XCCDF_NS, "plain-text")
            .find(|e| e.attr("id") == Some("release-info"))
            .map(|e| e.text.trim().to_string())
            .unwrap_or_default();

        let stig = StigDefinition {
            evaluate_stig: Some(StigEvaluation {
                time: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
                module: self.generator.clone(),
                extra: Default::default(),
            }),
            display_name: stig_name.replace("Security Technical Implementation Guide", "STIG"),
            stig_id: benchmark.attr("id").unwrap_or_default().to_string(),
            release_info,
            version: child_text(benchmark, "version"),
            uuid: stig_uuid,
            size: rules.len(),
            reference_identifier: rules.first().and_then(|r| r.reference_identifier.clone()),
            rules,
            stig_name: stig_name.clone(),
            extra: Default::default(),
        };

        Checklist {
            evaluate_stig: Some(serde_json::json!({ "version": CKLB_VERSION })),
            title: stig_name,
            id: Uuid::new_v4().to_string(),
            stigs: vec![stig],
            active: true,
            mode: 2,
            has_path: false,
            target_data: TargetData::blank_host(),
            cklb_version: CKLB_VERSION.to_string(),
            extra: Default::default(),
        }
    }
}

/// Parse an XCCDF file from disk
pub fn parse_benchmark(path: &Path) -> Result<Checklist> {
    let content = std::fs::read_to_string(path).map_err(|e| CklbError::io(path, e))?;
    let source = BenchmarkSource::from_path(path)?;
    XccdfParser::new()
        .parse_str(&content, &source)
        .with_context(|| format!("parsing {}", path.display()))
}

/// Parse XCCDF content already in memory
pub fn parse_benchmark_str(content: &str, source: &BenchmarkSource) -> Result<Checklist> {
    XccdfParser::new().parse_str(content, source)
}

// ============================================================================
// Rule extraction
// ============================================================================

/// Trimmed text of the first `{xccdf}name` child, or empty
fn child_text(element: &Element, name: &str) -> String {
    element
        .child(XCCDF_NS, name)
        .map(|e| e.text.trim().to_string())
        .unwrap_or_default()
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The eleven description sections of one rule, in [`DESCRIPTION_TAGS`] order
struct DescriptionFields([String; 11]);

impl DescriptionFields {
    /// Structured sub-elements first, embedded escaped markup second
    fn extract(description: Option<&Element>) -> Self {
        let raw = description.map(|d| d.text.as_str()).unwrap_or_default();
        let fields = std::array::from_fn(|i| {
            let tag = DESCRIPTION_TAGS[i];
            description
                .and_then(|d| d.child(XCCDF_NS, tag))
                .and_then(|e| non_empty(&e.text))
                .or_else(|| {
                    EMBEDDED_SECTIONS
                        .get(i)
                        .and_then(|re| re.captures(raw))
                        .and_then(|caps| caps.get(1))
                        .and_then(|m| non_empty(m.as_str()))
                })
                .unwrap_or_default()
        });
        Self(fields)
    }

    fn take(&mut self, tag: &str) -> String {
        DESCRIPTION_TAGS
            .iter()
            .position(|t| *t == tag)
            .map(|i| std::mem::take(&mut self.0[i]))
            .unwrap_or_default()
    }
}

fn build_rule(
    group: &Element,
    source: &BenchmarkSource,
    last_write: &str,
    stig_uuid: &str,
) -> Option<Rule> {
    let Some(rule) = group.child(XCCDF_NS, "Rule") else {
        tracing::debug!(
            "Skipping group {} without a Rule",
            group.attr("id").unwrap_or("<unnamed>")
        );
        return None;
    };

    let group_id = group.attr("id").unwrap_or_default().to_string();
    let group_title = child_text(group, "title");
    let rule_id_src = rule.attr("id").unwrap_or_default().to_string();

    let mut sections = DescriptionFields::extract(rule.child(XCCDF_NS, "description"));

    let discussion = rule
        .child(XCCDF_NS, "VulnDiscussion")
        .and_then(|e| non_empty(&e.text))
        .unwrap_or_else(|| sections.take("VulnDiscussion"));

    let fix_text = rule
        .path(XCCDF_NS, &["fix", "fixtext"])
        .or_else(|| rule.child(XCCDF_NS, "fixtext"))
        .map(|e| e.text.trim().to_string())
        .unwrap_or_default();

    let check = rule.child(XCCDF_NS, "check");
    let check_content = check
        .and_then(|c| c.child(XCCDF_NS, "check-content"))
        .map(|e| e.text.trim().to_string())
        .unwrap_or_default();
    let check_content_ref = check
        .and_then(|c| c.child(XCCDF_NS, "check-content-ref"))
        .map(|e| CheckContentRef {
            href: e.attr("href").map(str::to_string),
            name: e.attr("name").map(str::to_string),
        });

    let ccis: Vec<String> = rule
        .children_named(XCCDF_NS, "ident")
        .filter(|e| e.attr("system") == Some(CCI_SYSTEM))
        .map(|e| e.text.trim().to_string())
        .collect();

    Some(Rule {
        evaluate_stig: Some(RuleEvaluation {
            answer_file: source.file_name.clone(),
            last_write: last_write.to_string(),
            ..RuleEvaluation::default()
        }),
        group_tree: vec![GroupTreeEntry {
            id: group_id.clone(),
            title: group_title.clone(),
            description: child_text(group, "description"),
            extra: Default::default(),
        }],
        group_id_src: group_id.clone(),
        group_id,
        group_title,
        severity: rule.attr("severity").unwrap_or_default().to_string(),
        rule_id: rule_id_src
            .strip_suffix("_rule")
            .unwrap_or(&rule_id_src)
            .to_string(),
        rule_id_src,
        rule_version: child_text(rule, "version"),
        rule_title: child_text(rule, "title"),
        fix_text,
        weight: rule.attr("weight").unwrap_or_default().to_string(),
        check_content,
        check_content_ref,
        classification: "UNCLASSIFIED".to_string(),
        discussion,
        false_positives: sections.take("FalsePositives"),
        false_negatives: sections.take("FalseNegatives"),
        documentable: sections.take("Documentable"),
        security_override_guidance: sections.take("SeverityOverrideGuidance"),
        potential_impacts: sections.take("PotentialImpacts"),
        third_party_tools: sections.take("ThirdPartyTools"),
        mitigations: sections.take("Mitigations"),
        mitigation_control: sections.take("MitigationControl"),
        responsibility: sections.take("Responsibility"),
        ia_controls: sections.take("IAControls"),
        legacy_ids: Vec::new(),
        reference_identifier: ccis.first().cloned(),
        ccis,
        uuid: Uuid::new_v4().to_string(),
        stig_uuid: stig_uuid.to_string(),
        status: Some(RuleStatus::NotReviewed),
        ..Rule::default()
    })
}

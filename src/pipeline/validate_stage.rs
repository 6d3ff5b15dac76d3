//! Checklist validation stage.

use crate::store::{self, RuleWarning};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Validation result for one file
#[derive(Debug, Clone, Serialize)]
pub struct ValidationEntry {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stig_id: Option<String>,
    pub rule_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RuleWarning>,
    /// Load failure; when set the other fields are empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationEntry {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Load a checklist and collect its rule-level warnings.
///
/// Never fails: a load error is recorded in the entry.
#[must_use]
pub fn validate_file(path: &Path) -> ValidationEntry {
    match store::load(path) {
        Ok(checklist) => {
            let warnings = store::validate_rules(&checklist);
            if !warnings.is_empty() {
                tracing::debug!("{}: {} rule warnings", path.display(), warnings.len());
            }
            ValidationEntry {
                path: path.to_path_buf(),
                stig_id: checklist.stig_id().map(str::to_string),
                rule_count: checklist.rule_count(),
                warnings,
                error: None,
            }
        }
        Err(e) => ValidationEntry {
            path: path.to_path_buf(),
            stig_id: None,
            rule_count: 0,
            warnings: Vec::new(),
            error: Some(error_chain(&e)),
        },
    }
}

/// Error message with every source appended, `outer: inner: root`
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_missing_file() {
        let entry = validate_file(Path::new("/nonexistent/x.cklb"));
        assert!(!entry.is_valid());
        assert!(entry.error.unwrap().contains("not found"));
    }

    #[test]
    fn test_schema_error_names_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.cklb");
        std::fs::write(&path, r#"{"title":"t","id":"i"}"#).unwrap();
        let entry = validate_file(&path);
        assert!(entry
            .error
            .unwrap()
            .contains("missing required key 'stigs' in checklist root"));
    }

    #[test]
    fn test_validate_good_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.cklb");
        std::fs::write(
            &path,
            r#"{"title":"t","id":"i","stigs":[{"stig_id":"S","stig_name":"S","rules":[
                {"rule_id":"SV-1r1","rule_title":"x","group_id_src":"V-1","status":"open"}]}]}"#,
        )
        .unwrap();
        let entry = validate_file(&path);
        assert!(entry.is_valid());
        assert_eq!(entry.stig_id.as_deref(), Some("S"));
        assert_eq!(entry.rule_count, 1);
        assert!(entry.warnings.is_empty());
    }
}

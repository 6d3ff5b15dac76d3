//! Checklist load/save with minimal shape validation.
//!
//! Loading goes JSON text → `serde_json::Value` → shape check → repair →
//! typed [`Checklist`], so a structurally broken document is reported by the
//! key it is missing rather than by a deserializer position. Saving is atomic:
//! the document is written to a temporary sibling and renamed over the target.

use crate::error::{CklbError, ErrorContext, Result, SchemaErrorKind};
use crate::identity::resolve_key;
use crate::model::{value_kind, Checklist};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Keys every checklist root must carry
const REQUIRED_ROOT_KEYS: [&str; 3] = ["stigs", "title", "id"];

/// Keys the first STIG definition must carry
const REQUIRED_STIG_KEYS: [&str; 3] = ["stig_id", "stig_name", "rules"];

/// Load a checklist from disk.
pub fn load(path: &Path) -> Result<Checklist> {
    let content = fs::read_to_string(path).map_err(|e| CklbError::io(path, e))?;
    load_str(&content).with_context(|| format!("loading {}", path.display()))
}

/// Load a checklist from JSON text.
pub fn load_str(content: &str) -> Result<Checklist> {
    let mut value: Value = serde_json::from_str(content)
        .map_err(|e| CklbError::invalid_json("checklist", e.to_string()))?;

    validate_shape(&value)?;

    let repaired = repair_missing_discussion(&mut value);
    if repaired > 0 {
        tracing::debug!("Inserted empty discussion into {} rules", repaired);
    }

    serde_json::from_value(value)
        .map_err(|e| CklbError::schema("deserialization", SchemaErrorKind::Deserialize(e.to_string())))
}

/// Check the keys a checklist cannot work without.
///
/// Only the first STIG definition is inspected; a checklist with an empty
/// `stigs` list is valid and simply has no rules.
pub fn validate_shape(value: &Value) -> Result<()> {
    let root = value
        .as_object()
        .ok_or_else(|| CklbError::schema("shape validation", SchemaErrorKind::NotAnObject))?;

    require_keys(root, &REQUIRED_ROOT_KEYS, "checklist root")?;

    let stigs = root
        .get("stigs")
        .and_then(Value::as_array)
        .ok_or_else(|| wrong_type("stigs", "checklist root", "an array"))?;

    let Some(first) = stigs.first() else {
        return Ok(());
    };
    let stig = first
        .as_object()
        .ok_or_else(|| wrong_type("stigs[0]", "checklist root", "an object"))?;

    require_keys(stig, &REQUIRED_STIG_KEYS, "stigs[0]")?;

    match stig.get("rules") {
        Some(Value::Array(_)) => Ok(()),
        Some(other) => Err(wrong_type(
            "rules",
            "stigs[0]",
            &format!("an array, not {}", value_kind(other)),
        )),
        None => Ok(()),
    }
}

fn require_keys(object: &Map<String, Value>, keys: &[&str], location: &str) -> Result<()> {
    match keys.iter().find(|key| !object.contains_key(**key)) {
        Some(missing) => Err(CklbError::missing_key(*missing, location)),
        None => Ok(()),
    }
}

fn wrong_type(key: &str, location: &str, expected: &str) -> CklbError {
    CklbError::schema(
        "shape validation",
        SchemaErrorKind::WrongType {
            key: key.to_string(),
            location: location.to_string(),
            expected: expected.to_string(),
        },
    )
}

/// Insert `"discussion": ""` into every rule object that lacks the key.
fn repair_missing_discussion(value: &mut Value) -> usize {
    let mut repaired = 0;
    let stigs = value
        .get_mut("stigs")
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten();
    for stig in stigs {
        let rules = stig
            .get_mut("rules")
            .and_then(Value::as_array_mut)
            .into_iter()
            .flatten();
        for rule in rules.filter_map(Value::as_object_mut) {
            if !rule.contains_key("discussion") {
                rule.insert("discussion".to_string(), Value::String(String::new()));
                repaired += 1;
            }
        }
    }
    repaired
}

/// Save a checklist atomically.
///
/// The JSON is written and synced to a uniquely named temporary file next to
/// `path`, then renamed over it. On failure the temporary file is removed
/// and any existing file at `path` is left untouched.
pub fn save(checklist: &Checklist, path: &Path) -> Result<()> {
    write_atomic(path, to_json(checklist)?.as_bytes())
}

/// Save a checklist to a path that must not exist yet.
///
/// The synced temporary sibling is hard-linked into place, which fails with
/// `AlreadyExists` if anything claimed `path` in the meantime. `path` is
/// never observable half-written and an existing file is never replaced.
pub fn save_new(checklist: &Checklist, path: &Path) -> Result<()> {
    let json = to_json(checklist)?;
    let temp_path = write_temp(path, json.as_bytes())?;
    let linked = fs::hard_link(&temp_path, path);
    let _ = fs::remove_file(&temp_path);
    linked.map_err(|e| CklbError::io(path, e))?;

    tracing::debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}

fn to_json(checklist: &Checklist) -> Result<String> {
    serde_json::to_string_pretty(checklist)
        .map_err(|e| CklbError::invalid_json("serializing checklist", e.to_string()))
}

/// Write bytes to `path` through a temporary sibling and a rename.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = write_temp(path, contents)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(CklbError::io(path, e));
    }

    tracing::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Write and sync `contents` to a fresh temporary sibling of `path`.
fn write_temp(path: &Path, contents: &[u8]) -> Result<PathBuf> {
    let temp_path = temp_sibling(path);
    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });
    match written {
        Ok(()) => Ok(temp_path),
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(CklbError::io(path, e))
        }
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "checklist".to_string());
    path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()))
}

// ============================================================================
// Rule-level validation
// ============================================================================

/// A non-fatal problem with one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleWarning {
    /// Index of the STIG within `stigs`
    pub stig_index: usize,
    /// Index of the rule within its STIG
    pub rule_index: usize,
    /// Comparison key of the rule (may be empty)
    pub key: String,
    pub message: String,
}

/// Report rules missing identity or title fields, or with an unrecognised
/// status. None of these stop a merge.
#[must_use]
pub fn validate_rules(checklist: &Checklist) -> Vec<RuleWarning> {
    let mut warnings = Vec::new();
    for (stig_index, stig) in checklist.stigs.iter().enumerate() {
        for (rule_index, rule) in stig.rules.iter().enumerate() {
            let key = resolve_key(rule);
            let mut warn = |message: String| {
                warnings.push(RuleWarning {
                    stig_index,
                    rule_index,
                    key: key.clone(),
                    message,
                });
            };
            for field in ["rule_id", "rule_title", "group_id_src"] {
                if rule.field(field).is_none() {
                    warn(format!("missing {field}"));
                }
            }
            if let Some(status) = &rule.status {
                if !status.is_known() {
                    warn(format!("unrecognised status '{status}'"));
                }
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RuleStatus;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "title": "Test",
            "id": "00000000-0000-0000-0000-000000000000",
            "stigs": [{
                "stig_id": "Test_STIG",
                "stig_name": "Test",
                "rules": [{"rule_id": "SV-1r1", "rule_title": "one", "group_id_src": "V-1"}]
            }]
        })
    }

    #[test]
    fn test_load_minimal_repairs_discussion() {
        let checklist = load_str(&minimal().to_string()).unwrap();
        assert_eq!(checklist.rule_count(), 1);
        assert_eq!(checklist.stigs[0].rules[0].discussion, "");
    }

    #[test]
    fn test_missing_root_key() {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove("id");
        match load_str(&value.to_string()).unwrap_err() {
            CklbError::SchemaInvalid {
                source: SchemaErrorKind::MissingKey { key, .. },
                ..
            } => assert_eq!(key, "id"),
            other => panic!("Expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_stig_key() {
        let mut value = minimal();
        value["stigs"][0].as_object_mut().unwrap().remove("stig_name");
        let err = load_str(&value.to_string()).unwrap_err();
        assert!(matches!(
            err,
            CklbError::SchemaInvalid {
                source: SchemaErrorKind::MissingKey { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_rules_must_be_array() {
        let mut value = minimal();
        value["stigs"][0]["rules"] = json!({"not": "a list"});
        let err = load_str(&value.to_string()).unwrap_err();
        assert!(matches!(
            err,
            CklbError::SchemaInvalid {
                source: SchemaErrorKind::WrongType { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_empty_stigs_is_valid() {
        let checklist = load_str(r#"{"title":"t","id":"i","stigs":[]}"#).unwrap();
        assert_eq!(checklist.rule_count(), 0);
    }

    #[test]
    fn test_malformed_json() {
        let err = load_str("{\"title\": ").unwrap_err();
        assert!(matches!(err, CklbError::InvalidJson { .. }));
    }

    #[test]
    fn test_non_object_root() {
        let err = load_str("[1, 2]").unwrap_err();
        assert!(matches!(
            err,
            CklbError::SchemaInvalid {
                source: SchemaErrorKind::NotAnObject,
                ..
            }
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/checklist.cklb")).unwrap_err();
        assert!(matches!(err, CklbError::NotFound { .. }));
    }

    #[test]
    fn test_save_then_load_preserves_findings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cklb");

        let mut checklist = load_str(&minimal().to_string()).unwrap();
        checklist.stigs[0].rules[0].status = Some(RuleStatus::Open);
        checklist.stigs[0].rules[0].comments = "reviewed".to_string();
        save(&checklist, &path).unwrap();

        let reloaded = load(&path).unwrap();
        assert_eq!(reloaded, checklist);

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_save_new_never_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host_T.cklb");
        let checklist = load_str(&minimal().to_string()).unwrap();

        save_new(&checklist, &path).unwrap();
        assert_eq!(load(&path).unwrap(), checklist);

        fs::write(&path, "keep").unwrap();
        let err = save_new(&checklist, &path).unwrap_err();
        assert!(matches!(err, CklbError::Io { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep");

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_into_missing_directory_fails_cleanly() {
        let checklist = Checklist::default();
        let err = save(&checklist, Path::new("/nonexistent-dir/out.cklb")).unwrap_err();
        assert!(matches!(err, CklbError::NotFound { .. } | CklbError::Io { .. }));
    }

    #[test]
    fn test_validate_rules_warnings() {
        let checklist = load_str(
            &json!({
                "title": "t", "id": "i",
                "stigs": [{"stig_id": "S", "stig_name": "S", "rules": [
                    {"rule_id": "SV-1r1", "rule_title": "ok", "group_id_src": "V-1"},
                    {"rule_title": "no id", "status": "NotAFinding"}
                ]}]
            })
            .to_string(),
        )
        .unwrap();
        let warnings = validate_rules(&checklist);
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().all(|w| w.rule_index == 1));
        assert!(warnings.iter().any(|w| w.message.contains("NotAFinding")));
    }
}

//! Checklist data model.
//!
//! A [`Checklist`] is the CKLB JSON document: host identity, one or more
//! [`StigDefinition`]s, and the [`Rule`]s they contain. Every struct keeps the
//! keys it does not recognise in an ordered `extra` map so documents written by
//! other tools survive a load/save cycle.

mod checklist;
mod rule;

pub use checklist::{Checklist, ModuleInfo, StigDefinition, StigEvaluation, TargetData};
pub use rule::{CheckContentRef, GroupTreeEntry, Rule, RuleEvaluation, RuleStatus};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a scalar into a `String`, mapping `null` to the empty string.
///
/// Exported checklists are inconsistent about nulls and about numbers stored
/// as strings (`weight` in particular), so every free-text field goes
/// through this instead of the strict `String` impl.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string, found {}",
            value_kind(&other)
        ))),
    }
}

/// Deserialize any `T`, mapping `null` to `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Short JSON type name used in error messages.
pub(crate) const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

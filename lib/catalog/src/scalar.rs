//! Lenient scalar coercion for hand-edited YAML catalogs.

use serde_yaml::Value;

/// Returns the trimmed textual form of a scalar, or `None` when the value is
/// null, blank or not a scalar.
pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    let raw = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Interprets a flag the way operators write it: `true`, `"true"`, `"TRUE"`.
pub(crate) fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Looks up a key in a YAML mapping entry.
pub(crate) fn field<'a>(entry: &'a Value, key: &str) -> Option<&'a Value> {
    entry.as_mapping()?.get(key)
}

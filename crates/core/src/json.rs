//! JSON payload helpers.
//!
//! Tool results arrive as loosely-shaped JSON whose fields vary by tool
//! and tool version. Accessors here degrade to `None` or a default
//! instead of failing, so partial payloads still produce usable output.

use serde_json::{Map, Value};

/// An insertion-ordered JSON object — the common currency of tool
/// results and context slices.
pub type JsonMap = Map<String, Value>;

/// Read a string field, `None` when absent or not a string.
pub fn str_field<'a>(map: &'a JsonMap, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// Read a numeric field as `f64` (integers included), 0 when absent or
/// not a number.
pub fn num_field(map: &JsonMap, key: &str) -> f64 {
    map.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// The value of the first key present in `map`, scanning `keys` in order.
///
/// Presence wins over content: an earlier key holding `null` still
/// shadows a later key holding a value. Tools signal "no such output"
/// by omitting the key, not by writing `null` to it.
pub fn first_of<'a>(map: &'a JsonMap, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key))
}

/// Truthiness over JSON values: `null`, `false`, `0`, `""`, `[]` and
/// `{}` are falsy, everything else is truthy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

//! Lenient field access for loosely-typed bibliographic JSON.
//!
//! Remote catalogs omit fields, change scalar types between records and nest
//! text inside `{ "type": ..., "value": ... }` objects. Every accessor here
//! degrades to an absent value instead of failing.

use serde_json::Value;

static NULL: Value = Value::Null;

// the named member if it is an object, otherwise Null
pub(crate) fn object_prop<'a>(value: &'a Value, name: &str) -> &'a Value {
    match value.get(name) {
        Some(obj @ Value::Object(_)) => obj,
        _ => &NULL,
    }
}

pub(crate) fn string_prop(value: &Value, name: &str) -> Option<String> {
    value.get(name).and_then(scalar_text)
}

pub(crate) fn array_strings(value: &Value, name: &str) -> Vec<String> {
    match value.get(name) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        _ => vec![],
    }
}

pub(crate) fn first_string(value: &Value, name: &str) -> Option<String> {
    array_strings(value, name).into_iter().next()
}

pub(crate) fn int_prop(value: &Value, name: &str) -> Option<u32> {
    match value.get(name) {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

// blank strings count as absent
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => match map.get("value") {
            Some(Value::String(s)) => s.trim().to_string(),
            _ => return None,
        },
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

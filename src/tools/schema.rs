//! Minimal JSON-schema argument validation
//!
//! Covers what the tool descriptors actually declare: an object with
//! typed properties, a required list, and string enumerations. Checked
//! before any handler runs so invalid backend arguments surface as a
//! tool-message error instead of a handler panic.

use serde_json::{Map, Value};

/// Validate `input` against an object schema. Returns a human-readable
/// reason on the first violation.
pub fn validate(schema: &Value, input: &Value) -> Result<(), String> {
    let empty = Map::new();
    let fields = match input {
        Value::Object(map) => map,
        // Unparseable or absent arguments reach us as Null; treat as an
        // empty object so zero-argument tools still dispatch.
        Value::Null => &empty,
        other => return Err(format!("arguments must be an object, got {}", type_name(other))),
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !fields.contains_key(name) {
                return Err(format!("missing required field '{name}'"));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (name, declared) in properties {
        let Some(value) = fields.get(name) else {
            continue;
        };
        if value.is_null() {
            // Null stands in for "not provided" on optional fields
            continue;
        }
        if let Some(expected) = declared.get("type").and_then(Value::as_str) {
            if !type_matches(expected, value) {
                return Err(format!(
                    "field '{name}' must be {expected}, got {}",
                    type_name(value)
                ));
            }
        }
        if let Some(allowed) = declared.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                return Err(format!(
                    "field '{name}' must be one of {allowed:?}, got {value}"
                ));
            }
        }
    }

    Ok(())
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

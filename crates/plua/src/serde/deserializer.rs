//! Deserializer for converting serde_json::Value to metatables
//!
//! - JSON object -> table with string keys
//! - JSON array -> table with keys 1..=len
//! - JSON boolean / number / string -> matching value
//! - JSON null -> entry skipped (nil means "absent")

use serde_json::Value as JsonValue;

use crate::error::{MetatableError, MetatableResult};
use crate::metatable::Metatable;
use crate::value::{Key, Value};

/// Convert a serde_json::Value holding an object or array to a table
pub fn from_value(json_value: &JsonValue, max_depth: usize) -> MetatableResult<Metatable> {
    json_to_table(json_value, 0, max_depth)
}

/// Convert a JSON string to a table
pub fn from_str(json_str: &str, max_depth: usize) -> MetatableResult<Metatable> {
    let json_value: JsonValue = serde_json::from_str(json_str)
        .map_err(|e| MetatableError::Json(format!("failed to parse: {}", e)))?;

    from_value(&json_value, max_depth)
}

fn json_to_table(json_value: &JsonValue, depth: usize, max_depth: usize) -> MetatableResult<Metatable> {
    if depth >= max_depth {
        return Err(MetatableError::DepthExceeded(max_depth));
    }

    match json_value {
        JsonValue::Array(arr) => {
            let table = Metatable::with_capacity(arr.len());
            for (i, item) in arr.iter().enumerate() {
                let value = json_to_value(item, depth, max_depth)?;
                table.set(Key::Number((i + 1) as f64), value)?;
            }
            Ok(table)
        }
        JsonValue::Object(obj) => {
            let table = Metatable::with_capacity(obj.len());
            for (key, item) in obj {
                let value = json_to_value(item, depth, max_depth)?;
                table.set(Key::string(key.as_str()), value)?;
            }
            Ok(table)
        }
        other => Err(MetatableError::Json(format!(
            "expected a JSON object or array, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_to_value(json_value: &JsonValue, depth: usize, max_depth: usize) -> MetatableResult<Value> {
    match json_value {
        JsonValue::Null => Ok(Value::Nil),
        JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
        JsonValue::Number(n) => n
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| MetatableError::Json(format!("invalid JSON number {}", n))),
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            json_to_table(json_value, depth + 1, max_depth).map(Value::Table)
        }
    }
}

fn json_type_name(json_value: &JsonValue) -> &'static str {
    match json_value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

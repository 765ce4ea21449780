//! Serializer for converting metatables to serde_json::Value
//!
//! - nil -> JSON null
//! - boolean -> JSON boolean
//! - number -> JSON integer when it has no fractional digits, float otherwise
//! - string -> JSON string
//! - table with any string key -> JSON object (numeric keys stringified)
//! - table with numeric keys only -> JSON array in cell order

use serde_json::{Map, Number, Value as JsonValue};

use crate::error::{MetatableError, MetatableResult};
use crate::metatable::Metatable;
use crate::value::{Key, Value, count_decimals, format_number};

/// Convert a table to a serde_json::Value
pub fn to_value(table: &Metatable, max_depth: usize) -> MetatableResult<JsonValue> {
    table_to_json(table, 0, max_depth)
}

/// Convert a table to a JSON string
pub fn to_string(table: &Metatable, pretty: bool, max_depth: usize) -> MetatableResult<String> {
    let json_value = to_value(table, max_depth)?;

    let result = if pretty {
        serde_json::to_string_pretty(&json_value)
    } else {
        serde_json::to_string(&json_value)
    };
    result.map_err(|e| MetatableError::Json(format!("failed to serialize: {}", e)))
}

fn table_to_json(table: &Metatable, depth: usize, max_depth: usize) -> MetatableResult<JsonValue> {
    if depth >= max_depth {
        return Err(MetatableError::DepthExceeded(max_depth));
    }

    // Snapshot first: nested tables are converted without holding this
    // table's lock.
    let entries = table.entries();
    let is_object = entries.iter().any(|(key, _)| key.is_string());

    if is_object {
        let mut object = Map::with_capacity(entries.len());
        for (key, value) in &entries {
            object.insert(key_to_string(key), value_to_json(value, depth, max_depth)?);
        }
        Ok(JsonValue::Object(object))
    } else {
        let array = entries
            .iter()
            .map(|(_, value)| value_to_json(value, depth, max_depth))
            .collect::<MetatableResult<Vec<_>>>()?;
        Ok(JsonValue::Array(array))
    }
}

fn value_to_json(value: &Value, depth: usize, max_depth: usize) -> MetatableResult<JsonValue> {
    match value {
        Value::Nil => Ok(JsonValue::Null),
        Value::Boolean(b) => Ok(JsonValue::Bool(*b)),
        Value::Number(n) => number_to_json(*n),
        Value::String(s) => Ok(JsonValue::String(s.clone())),
        Value::Table(t) => table_to_json(t, depth + 1, max_depth),
    }
}

fn number_to_json(n: f64) -> MetatableResult<JsonValue> {
    if !n.is_finite() {
        return Err(MetatableError::Json(format!("number {} has no JSON form", n)));
    }

    let formatted = format_number(n);
    if count_decimals(&formatted) == 0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        return Ok(JsonValue::Number(Number::from(n as i64)));
    }

    // the shortest decimal form parses back to the same double
    let rounded: f64 = formatted
        .parse()
        .map_err(|_| MetatableError::Json(format!("invalid number {}", formatted)))?;
    Number::from_f64(rounded)
        .map(JsonValue::Number)
        .ok_or_else(|| MetatableError::Json(format!("invalid number {}", formatted)))
}

fn key_to_string(key: &Key) -> String {
    match key {
        Key::String(s) => s.to_string(),
        Key::Number(n) if *n >= i64::MIN as f64 && *n < i64::MAX as f64 => {
            let mut buffer = itoa::Buffer::new();
            buffer.format(*n as i64).to_owned()
        }
        Key::Number(n) => format_number(*n),
    }
}

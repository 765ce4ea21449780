//! JSON export and import of metatables
//!
//! A table becomes a JSON object as soon as any of its keys is a string,
//! otherwise a JSON array of its values in cell order. Import maps objects
//! to string keys and arrays to keys `1..=len`.

mod deserializer;
mod serializer;

pub use deserializer::{from_str, from_value};
pub use serializer::{to_string, to_value};

use serde_json::Value as JsonValue;

use crate::error::MetatableResult;
use crate::metatable::Metatable;
use crate::option::MetatableOption;

impl Metatable {
    /// Convert to a `serde_json::Value` tree.
    pub fn to_json(&self) -> MetatableResult<JsonValue> {
        to_value(self, MetatableOption::default().max_depth)
    }

    pub fn to_json_with(&self, option: &MetatableOption) -> MetatableResult<JsonValue> {
        to_value(self, option.max_depth)
    }

    pub fn to_json_string(&self, pretty: bool) -> MetatableResult<String> {
        to_string(self, pretty, MetatableOption::default().max_depth)
    }

    /// Build a table from a JSON object or array.
    pub fn from_json(json: &JsonValue) -> MetatableResult<Metatable> {
        from_value(json, MetatableOption::default().max_depth)
    }

    pub fn from_json_with(json: &JsonValue, option: &MetatableOption) -> MetatableResult<Metatable> {
        from_value(json, option.max_depth)
    }

    pub fn from_json_str(json: &str) -> MetatableResult<Metatable> {
        from_str(json, MetatableOption::default().max_depth)
    }
}

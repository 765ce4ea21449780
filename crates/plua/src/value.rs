//! Keys and values stored in metatable cells.
//!
//! A [`Value`] is a closed sum type: nil, boolean, number, string or a nested
//! table. Nested tables are owned by the cell that holds them, so replacing or
//! removing a cell releases the table (and everything under it) by ordinary
//! drop.

use std::fmt;

use smol_str::SmolStr;

use crate::error::{MetatableError, MetatableResult};
use crate::limits::MAX_KEY;
use crate::metatable::Metatable;

/// Key of a metatable cell.
///
/// Numeric keys are stored truncated toward zero, which is how lookups have
/// always matched them: `t[2.7]` and `t[2]` address the same cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Number(f64),
    String(SmolStr),
}

impl Key {
    /// Build a numeric key, rejecting NaN, infinities and anything beyond
    /// [`MAX_KEY`].
    pub fn number(n: f64) -> MetatableResult<Key> {
        if !n.is_finite() {
            return Err(MetatableError::InvalidKey("non-finite number"));
        }
        if n.abs() > MAX_KEY {
            return Err(MetatableError::InvalidKey("number out of range"));
        }
        // normalise -0.0 so it matches 0
        Ok(Key::Number(n.trunc() + 0.0))
    }

    pub fn string(s: impl Into<SmolStr>) -> Key {
        Key::String(s.into())
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Key::Number(_))
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Key::String(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Key::Number(n) => Some(*n),
            Key::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s.as_str()),
            Key::Number(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Key::Number(_) => "number",
            Key::String(_) => "string",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Number(n) => f.write_str(&format_number(*n)),
            Key::String(s) => f.write_str(s),
        }
    }
}

/// Value held by a metatable cell.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Live handle to a nested table. Cloning the value shares the table.
    Table(Metatable),
}

impl Value {
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Metatable> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Table(_) => "table",
        }
    }

    /// Copy the value, duplicating nested tables instead of sharing them.
    pub(crate) fn deep_copy(&self) -> Value {
        match self {
            Value::Table(t) => Value::Table(t.deep_clone()),
            other => other.clone(),
        }
    }
}

/// Structural equality; tables compare by content, not identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a.deep_eq(b),
            _ => false,
        }
    }
}

/// Render a number in its shortest round-trip decimal form.
///
/// Integral values carry no fractional part (`3`, not `3.0`).
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{}", n)
}

/// Count the fractional digits of a formatted decimal string.
///
/// Anything after an exponent marker is ignored.
pub fn count_decimals(formatted: &str) -> usize {
    match formatted.split_once('.') {
        Some((_, frac)) => frac.chars().take_while(|c| c.is_ascii_digit()).count(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_truncate() {
        assert_eq!(Key::number(2.7).unwrap(), Key::Number(2.0));
        assert_eq!(Key::number(-0.0).unwrap(), Key::Number(0.0));
        assert!(Key::number(f64::NAN).is_err());
        assert!(Key::number(f64::INFINITY).is_err());
        assert_eq!(Key::number(MAX_KEY).unwrap(), Key::Number(MAX_KEY));
        assert!(Key::number(MAX_KEY + 1.0).is_err());
        assert!(Key::number(-MAX_KEY - 1.0).is_err());
    }

    #[test]
    fn decimals_of_formatted_numbers() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(3.25), "3.25");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(count_decimals(&format_number(3.0)), 0);
        assert_eq!(count_decimals(&format_number(3.125)), 3);
        assert_eq!(count_decimals("1.50e3"), 2);
    }

    #[test]
    fn key_display() {
        assert_eq!(Key::Number(12.0).to_string(), "12");
        assert_eq!(Key::string("id").to_string(), "id");
    }
}

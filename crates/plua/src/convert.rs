//! `IntoKey` / `IntoValue` / `FromValue` — conversion between Rust types and
//! metatable keys and values.
//!
//! The embedding layer hands values to the engine through these traits, so a
//! caller can write `t.set("name", "kaku")` or `t.push(42)` instead of
//! building [`Value`]s by hand.
//!
//! # Built-in impls
//! - keys: `&str`, `String`, `SmolStr`, integer types, `f32`, `f64`, `Key`, `Value`
//! - values: `()`, `bool`, integer types, `f32`, `f64`, `String`, `&str`,
//!   `Option<T>`, `Vec<T>`, `Value`, `Metatable`
//!
//! # Composite input
//! [`TableSource`] describes a foreign table (for example one living inside a
//! scripting state) by its entries. [`Metatable::from_source`] turns it into
//! a brand-new table.

use smol_str::SmolStr;

use crate::error::{MetatableError, MetatableResult};
use crate::metatable::Metatable;
use crate::value::{Key, Value, format_number};

/// Convert a Rust type into a cell key.
pub trait IntoKey {
    fn into_key(self) -> MetatableResult<Key>;
}

/// Convert a Rust type into a cell value.
pub trait IntoValue {
    fn into_value(self) -> MetatableResult<Value>;
}

/// Convert a cell value back into a Rust type.
///
/// Return `Err(MetatableError::Conversion)` for type mismatches.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> MetatableResult<Self>;
}

/// A composite value that can be copied into a new metatable.
pub trait TableSource {
    /// Entries in the order they should be inserted.
    fn entries(&self) -> Vec<(Key, Value)>;
}

fn mismatch(expected: &str, value: &Value) -> MetatableError {
    MetatableError::Conversion(format!("expected {}, got {}", expected, value.type_name()))
}

// ==================== Keys ====================

impl IntoKey for Key {
    #[inline]
    fn into_key(self) -> MetatableResult<Key> {
        match self {
            Key::Number(n) => Key::number(n),
            key => Ok(key),
        }
    }
}

impl IntoKey for &Key {
    #[inline]
    fn into_key(self) -> MetatableResult<Key> {
        self.clone().into_key()
    }
}

impl IntoKey for &str {
    #[inline]
    fn into_key(self) -> MetatableResult<Key> {
        Ok(Key::string(self))
    }
}

impl IntoKey for String {
    #[inline]
    fn into_key(self) -> MetatableResult<Key> {
        Ok(Key::string(self))
    }
}

impl IntoKey for SmolStr {
    #[inline]
    fn into_key(self) -> MetatableResult<Key> {
        Ok(Key::String(self))
    }
}

impl IntoKey for Value {
    fn into_key(self) -> MetatableResult<Key> {
        match self {
            Value::Number(n) => Key::number(n),
            Value::String(s) => Ok(Key::string(s)),
            other => Err(MetatableError::InvalidKey(other.type_name())),
        }
    }
}

macro_rules! impl_int_key {
    ($($ty:ty),*) => {
        $(
            impl IntoKey for $ty {
                #[inline]
                fn into_key(self) -> MetatableResult<Key> {
                    Key::number(self as f64)
                }
            }
        )*
    };
}

impl_int_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl IntoKey for f64 {
    #[inline]
    fn into_key(self) -> MetatableResult<Key> {
        Key::number(self)
    }
}

impl IntoKey for f32 {
    #[inline]
    fn into_key(self) -> MetatableResult<Key> {
        Key::number(self as f64)
    }
}

// ==================== Identity: Value ====================

impl IntoValue for Value {
    #[inline]
    fn into_value(self) -> MetatableResult<Value> {
        Ok(self)
    }
}

impl FromValue for Value {
    #[inline]
    fn from_value(value: Value) -> MetatableResult<Self> {
        Ok(value)
    }
}

// ==================== Unit ====================

impl IntoValue for () {
    #[inline]
    fn into_value(self) -> MetatableResult<Value> {
        Ok(Value::Nil)
    }
}

// ==================== Boolean ====================

impl IntoValue for bool {
    #[inline]
    fn into_value(self) -> MetatableResult<Value> {
        Ok(Value::Boolean(self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> MetatableResult<Self> {
        value.as_bool().ok_or_else(|| mismatch("boolean", &value))
    }
}

// ==================== Numbers ====================

macro_rules! impl_number {
    ($($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                #[inline]
                fn into_value(self) -> MetatableResult<Value> {
                    Ok(Value::Number(self as f64))
                }
            }
        )*
    };
}

impl_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> MetatableResult<Self> {
                    let n = value.as_number().ok_or_else(|| mismatch("number", &value))?;
                    // MIN is exact in f64; MAX + 1 rounds to the next power of two
                    if n.fract() != 0.0 || n < <$ty>::MIN as f64 || n >= <$ty>::MAX as f64 + 1.0 {
                        return Err(MetatableError::Conversion(format!(
                            "number {} does not fit in {}",
                            format_number(n),
                            stringify!($ty)
                        )));
                    }
                    Ok(n as $ty)
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> MetatableResult<Self> {
        value.as_number().ok_or_else(|| mismatch("number", &value))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> MetatableResult<Self> {
        value
            .as_number()
            .map(|n| n as f32)
            .ok_or_else(|| mismatch("number", &value))
    }
}

// ==================== String ====================

impl IntoValue for String {
    #[inline]
    fn into_value(self) -> MetatableResult<Value> {
        Ok(Value::String(self))
    }
}

impl IntoValue for &str {
    #[inline]
    fn into_value(self) -> MetatableResult<Value> {
        Ok(Value::String(self.to_owned()))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> MetatableResult<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

// ==================== Tables ====================

impl IntoValue for Metatable {
    #[inline]
    fn into_value(self) -> MetatableResult<Value> {
        Ok(Value::Table(self))
    }
}

impl IntoValue for &Metatable {
    #[inline]
    fn into_value(self) -> MetatableResult<Value> {
        Ok(Value::Table(self.share()))
    }
}

impl FromValue for Metatable {
    fn from_value(value: Value) -> MetatableResult<Self> {
        match value {
            Value::Table(t) => Ok(t),
            other => Err(mismatch("table", &other)),
        }
    }
}

/// A `Vec` becomes a numeric array keyed `1..=len`.
impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> MetatableResult<Value> {
        let table = Metatable::new();
        for item in self {
            table.push(item)?;
        }
        Ok(Value::Table(table))
    }
}

// ==================== Option<T> ====================

impl<T: IntoValue> IntoValue for Option<T> {
    #[inline]
    fn into_value(self) -> MetatableResult<Value> {
        match self {
            Some(v) => v.into_value(),
            None => Ok(Value::Nil),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    #[inline]
    fn from_value(value: Value) -> MetatableResult<Self> {
        if value.is_nil() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

// ==================== TableSource ====================

impl TableSource for [(Key, Value)] {
    fn entries(&self) -> Vec<(Key, Value)> {
        self.to_vec()
    }
}

impl TableSource for Vec<(Key, Value)> {
    fn entries(&self) -> Vec<(Key, Value)> {
        self.clone()
    }
}

impl TableSource for Metatable {
    fn entries(&self) -> Vec<(Key, Value)> {
        Metatable::entries(self)
    }
}

use thiserror::Error;

/// Errors raised by metatable operations.
///
/// Every variant is a caller mistake; a missing key is never an error and
/// shows up as [`Value::Nil`](crate::Value::Nil) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetatableError {
    /// Key is neither a string nor a finite number
    #[error("string or number expected, got {0}")]
    InvalidKey(&'static str),

    /// Value cannot be stored by this operation
    #[error("string, number, table or boolean expected, got {0}")]
    InvalidValue(&'static str),

    /// Array operation attempted on a table holding string keys
    #[error("metatable {op} only works on numeric arrays")]
    NotNumericArray { op: &'static str },

    /// Nesting exceeded `MetatableOption::max_depth`
    #[error("table nesting exceeds {0} levels")]
    DepthExceeded(usize),

    /// A stored value could not be converted to the requested Rust type
    #[error("conversion error: {0}")]
    Conversion(String),

    /// JSON encoding or decoding failed
    #[error("json error: {0}")]
    Json(String),
}

pub type MetatableResult<T> = Result<T, MetatableError>;

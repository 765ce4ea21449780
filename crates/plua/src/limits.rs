//! Engine-wide defaults.
//!
//! Collected in one place so the embedding can see every number that
//! shapes metatable behaviour.

/// Number of scripting states sharing tables, and therefore the number of
/// consumer slots handed out by the default [`StatePool`](crate::StatePool).
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Largest magnitude of a numeric key. Every integer up to here has an exact
/// `f64` form, so `n + 1.0` is always a different key.
pub const MAX_KEY: f64 = 9_007_199_254_740_991.0;

/// Maximum nesting of tables accepted by JSON export and import.
pub const DEFAULT_MAX_DEPTH: usize = 64;

use crate::limits::{DEFAULT_MAX_DEPTH, DEFAULT_POOL_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MetatableOption {
    /// Deepest table nesting JSON conversion will walk
    pub max_depth: usize,
    /// Consumer slots available to concurrent scripting states
    pub pool_size: usize,
}

impl Default for MetatableOption {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

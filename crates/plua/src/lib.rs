// pilight metatables
// Thread-safe dynamic tables shared between scripting states

#[cfg(test)]
mod test;

pub mod convert;
pub mod error;
pub mod limits;
pub mod metatable;
pub mod option;
pub mod state_pool;
pub mod value;

#[cfg(feature = "serde")]
pub mod serde;

pub use convert::{FromValue, IntoKey, IntoValue, TableSource};
pub use error::{MetatableError, MetatableResult};
pub use metatable::{Iter, IPairs, Metatable};
pub use option::MetatableOption;
pub use state_pool::{ConsumerSlot, SlotGuard, StatePool};
pub use value::{Key, Value};

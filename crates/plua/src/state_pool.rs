//! Pool of consumer slots.
//!
//! Every scripting state that touches shared tables runs inside a slot taken
//! from a [`StatePool`]. The slot number keys its iteration cursors, and the
//! slot owns a deferred-release list: table handles registered with
//! [`SlotGuard::defer_release`] stay alive until the state is cleared, which
//! happens when the guard drops.
//!
//! ```ignore
//! let pool = StatePool::new(4);
//! let mut state = pool.acquire();
//! let devices = registry.share();
//! devices.begin_iteration(state.slot());
//! state.defer_release(devices);
//! // ...
//! drop(state); // releases `devices`, frees the slot, wakes a waiter
//! ```

use std::fmt;
use std::sync::Arc;

use log::{debug, trace, warn};
use parking_lot::{Condvar, Mutex};

use crate::metatable::Metatable;
use crate::option::MetatableOption;

/// Identifier of a concurrent consumer of shared tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsumerSlot(usize);

impl ConsumerSlot {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ConsumerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

struct PoolInner {
    /// `true` while the slot is handed out
    in_use: Mutex<Vec<bool>>,
    available: Condvar,
}

/// Fixed-size pool of [`ConsumerSlot`]s.
#[derive(Clone)]
pub struct StatePool {
    inner: Arc<PoolInner>,
}

impl StatePool {
    pub fn new(size: usize) -> Self {
        let size = if size == 0 {
            warn!("state pool size 0 requested, using 1");
            1
        } else {
            size
        };
        Self {
            inner: Arc::new(PoolInner {
                in_use: Mutex::new(vec![false; size]),
                available: Condvar::new(),
            }),
        }
    }

    pub fn from_option(option: &MetatableOption) -> Self {
        Self::new(option.pool_size)
    }

    pub fn size(&self) -> usize {
        self.inner.in_use.lock().len()
    }

    /// Slots not currently handed out.
    pub fn available(&self) -> usize {
        self.inner.in_use.lock().iter().filter(|used| !**used).count()
    }

    /// Take a free slot, blocking until one is returned.
    pub fn acquire(&self) -> SlotGuard {
        let mut in_use = self.inner.in_use.lock();
        let mut waited = false;
        loop {
            if let Some(idx) = in_use.iter().position(|used| !*used) {
                in_use[idx] = true;
                return SlotGuard::new(Arc::clone(&self.inner), ConsumerSlot(idx));
            }
            if !waited {
                waited = true;
                debug!("waiting for a free consumer slot");
            }
            self.inner.available.wait(&mut in_use);
        }
    }

    /// Take a free slot if there is one.
    pub fn try_acquire(&self) -> Option<SlotGuard> {
        let mut in_use = self.inner.in_use.lock();
        let idx = in_use.iter().position(|used| !*used)?;
        in_use[idx] = true;
        Some(SlotGuard::new(Arc::clone(&self.inner), ConsumerSlot(idx)))
    }
}

impl Default for StatePool {
    fn default() -> Self {
        Self::from_option(&MetatableOption::default())
    }
}

/// A slot on loan from a [`StatePool`].
///
/// Dropping the guard clears the state: deferred handles are released,
/// their cursors for this slot are forgotten, and the slot goes back to the
/// pool.
pub struct SlotGuard {
    pool: Arc<PoolInner>,
    slot: ConsumerSlot,
    deferred: Vec<Metatable>,
}

impl SlotGuard {
    fn new(pool: Arc<PoolInner>, slot: ConsumerSlot) -> Self {
        Self {
            pool,
            slot,
            deferred: Vec::new(),
        }
    }

    #[inline]
    pub fn slot(&self) -> ConsumerSlot {
        self.slot
    }

    /// Keep `table` alive until this state is cleared.
    pub fn defer_release(&mut self, table: Metatable) {
        self.deferred.push(table);
    }

    /// Take a handle back out of the deferred list without releasing it.
    pub fn cancel_release(&mut self, table: &Metatable) -> Option<Metatable> {
        let idx = self.deferred.iter().position(|t| t.ptr_eq(table))?;
        Some(self.deferred.swap_remove(idx))
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let mut freed = 0;
        for table in self.deferred.drain(..) {
            table.end_iteration(self.slot);
            if table.release() {
                freed += 1;
            }
        }
        if freed > 0 {
            trace!("{}: freed {} deferred tables", self.slot, freed);
        }

        let mut in_use = self.pool.in_use.lock();
        in_use[self.slot.0] = false;
        drop(in_use);
        self.pool.available.notify_one();
    }
}

impl fmt::Debug for SlotGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotGuard")
            .field("slot", &self.slot)
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

// Metatable - a shared, lockable table of key/value cells
mod array;
mod iter;

pub use iter::{IPairs, Iter};

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use log::trace;
use parking_lot::{Mutex, RwLock};

use crate::convert::{IntoKey, IntoValue, TableSource};
use crate::error::MetatableResult;
use crate::state_pool::ConsumerSlot;
use crate::value::{Key, Value};

/// One entry of a table.
///
/// The key is structural and only changes under the table's write lock
/// (renumbering). The value has its own lock so readers and in-place writers
/// of different cells only share the table's read lock.
pub(crate) struct Cell {
    pub(crate) key: Key,
    pub(crate) value: Mutex<Value>,
}

impl Cell {
    pub(crate) fn new(key: Key, value: Value) -> Self {
        Self {
            key,
            value: Mutex::new(value),
        }
    }

    #[inline]
    pub(crate) fn read(&self) -> Value {
        self.value.lock().clone()
    }
}

#[derive(Default)]
pub(crate) struct TableInner {
    /// Cells in insertion order. Lock order: `cells` -> `cursors` -> cell.
    pub(crate) cells: RwLock<Vec<Cell>>,
    /// Iteration cursor per consumer slot
    pub(crate) cursors: Mutex<AHashMap<ConsumerSlot, usize>>,
}

impl Drop for TableInner {
    fn drop(&mut self) {
        trace!("metatable freed ({} cells)", self.cells.get_mut().len());
    }
}

/// Handle to a thread-safe dynamic table.
///
/// Handles are reference counted: [`share`](Self::share) (or `clone`) hands
/// out another handle to the same storage, [`release`](Self::release) (or
/// drop) gives one back, and the storage is freed with the last handle.
/// [`deep_clone`](Self::deep_clone) produces an independent copy.
///
/// Keys are strings or numbers. Used with numeric keys only, the table doubles
/// as a 1-based array with `push`, `pop`, `prepend` and `dequeue_front`.
#[derive(Clone, Default)]
pub struct Metatable {
    pub(crate) inner: Arc<TableInner>,
}

impl Metatable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(TableInner {
                cells: RwLock::new(Vec::with_capacity(capacity)),
                cursors: Mutex::new(AHashMap::new()),
            }),
        }
    }

    /// Build a new table from a composite input, applying `set` to each entry.
    pub fn from_source<S: TableSource + ?Sized>(source: &S) -> MetatableResult<Self> {
        let entries = source.entries();
        let table = Self::with_capacity(entries.len());
        for (key, value) in entries {
            table.set(key, value)?;
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.inner.cells.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ==================== Lifecycle ====================

    /// Hand out another handle to the same table.
    #[inline]
    pub fn share(&self) -> Metatable {
        self.clone()
    }

    /// Give up this handle.
    ///
    /// Returns `true` when this was the last handle and the table (with
    /// every nested table it owns) has been freed.
    pub fn release(self) -> bool {
        match Arc::into_inner(self.inner) {
            Some(inner) => {
                drop(inner);
                true
            }
            None => false,
        }
    }

    /// Number of live handles to this table.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether both handles point at the same storage.
    pub fn ptr_eq(&self, other: &Metatable) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Copy every cell into a new, unshared table, recursing into nested
    /// tables.
    pub fn deep_clone(&self) -> Metatable {
        let cells = self.inner.cells.read();
        let copy: Vec<Cell> = cells
            .iter()
            .map(|cell| Cell::new(cell.key.clone(), cell.value.lock().deep_copy()))
            .collect();
        drop(cells);

        Metatable {
            inner: Arc::new(TableInner {
                cells: RwLock::new(copy),
                cursors: Mutex::new(AHashMap::new()),
            }),
        }
    }

    /// Take ownership of a table about to be stored in a cell of `parent`.
    ///
    /// A handle nobody else holds is adopted as is; anything shared is
    /// copied so the cell owns its nested table exclusively. A table that
    /// contains `parent` is copied too, otherwise storing it would close a
    /// cycle.
    fn into_owned(self, parent: &Metatable) -> Metatable {
        if self.ref_count() == 1 && !self.reaches(parent) {
            self
        } else {
            self.deep_clone()
        }
    }

    /// Whether `target` is this table or nested anywhere below it.
    fn reaches(&self, target: &Metatable) -> bool {
        if self.ptr_eq(target) {
            return true;
        }
        self.inner.cells.read().iter().any(|cell| {
            matches!(&*cell.value.lock(), Value::Table(t) if t.reaches(target))
        })
    }

    // ==================== Get / Set ====================

    /// Look up `key`; absent keys yield `Value::Nil`.
    ///
    /// Nested tables come back as live handles sharing the stored table.
    pub fn get<K: IntoKey>(&self, key: K) -> MetatableResult<Value> {
        let key = key.into_key()?;
        let cells = self.inner.cells.read();
        Ok(find(&cells, &key)
            .map(|idx| cells[idx].read())
            .unwrap_or_default())
    }

    /// Assign `value` to `key`; `Value::Nil` removes the key.
    ///
    /// New keys are appended after the existing cells. Removing a numeric key
    /// from a table without string keys closes the gap by renumbering every
    /// larger key down by one.
    pub fn set<K: IntoKey, V: IntoValue>(&self, key: K, value: V) -> MetatableResult<()> {
        let key = key.into_key()?;
        let value = adopt(value.into_value()?, self);

        if value.is_nil() {
            self.remove(&key);
            return Ok(());
        }

        // Fast path: existing key, only the cell lock is taken exclusively.
        let value = {
            let cells = self.inner.cells.read();
            match find(&cells, &key) {
                Some(idx) => {
                    let old = std::mem::replace(&mut *cells[idx].value.lock(), value);
                    drop(cells);
                    drop(old);
                    return Ok(());
                }
                None => value,
            }
        };

        let mut cells = self.inner.cells.write();
        // the key may have appeared while no lock was held
        let old = match find(&cells, &key) {
            Some(idx) => Some(std::mem::replace(&mut *cells[idx].value.lock(), value)),
            None => {
                cells.push(Cell::new(key, value));
                None
            }
        };
        drop(cells);
        drop(old);
        Ok(())
    }

    fn remove(&self, key: &Key) {
        let mut cells = self.inner.cells.write();
        let Some(idx) = find(&cells, key) else {
            return;
        };
        let removed = cells.remove(idx);
        if let Some(n) = removed.key.as_number() {
            if is_numeric(&cells) {
                close_gap(&mut cells, n);
            }
        }
        drop(cells);
        drop(removed);
    }

    // ==================== Snapshots ====================

    /// Copy out every `(key, value)` pair in cell order.
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.inner
            .cells
            .read()
            .iter()
            .map(|cell| (cell.key.clone(), cell.read()))
            .collect()
    }

    pub fn keys(&self) -> Vec<Key> {
        self.inner
            .cells
            .read()
            .iter()
            .map(|cell| cell.key.clone())
            .collect()
    }

    /// Content equality, ignoring cell order.
    ///
    /// Works on snapshots so two table locks are never held at once.
    pub fn deep_eq(&self, other: &Metatable) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let ours = self.entries();
        let theirs = other.entries();
        ours.len() == theirs.len()
            && ours.iter().all(|(key, value)| {
                theirs
                    .iter()
                    .find(|(k, _)| k == key)
                    .is_some_and(|(_, v)| v == value)
            })
    }
}

impl fmt::Debug for Metatable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

/// Nested tables stored in a cell of `parent` are owned by that cell.
fn adopt(value: Value, parent: &Metatable) -> Value {
    match value {
        Value::Table(t) => Value::Table(t.into_owned(parent)),
        other => other,
    }
}

pub(crate) fn find(cells: &[Cell], key: &Key) -> Option<usize> {
    cells.iter().position(|cell| cell.key == *key)
}

pub(crate) fn is_numeric(cells: &[Cell]) -> bool {
    cells.iter().all(|cell| cell.key.is_number())
}

/// Renumber every numeric key above `removed` down by one.
pub(crate) fn close_gap(cells: &mut [Cell], removed: f64) {
    for cell in cells.iter_mut() {
        if let Key::Number(n) = &mut cell.key {
            if *n > removed {
                *n -= 1.0;
            }
        }
    }
}

// Iteration over metatable cells
//
// `pairs`/`ipairs` hand out iterators that own their cursor, so any number of
// them may walk the same table at once. Embeddings that drive iteration from
// a scripting state instead keep one cursor per consumer slot inside the
// table.

use super::Metatable;
use crate::state_pool::ConsumerSlot;
use crate::value::{Key, Value};

/// Walks every cell in insertion order.
///
/// Each step takes the table's read lock, so the iterator observes
/// concurrent insertions and removals instead of a snapshot.
pub struct Iter {
    table: Metatable,
    cursor: usize,
}

impl Iterator for Iter {
    type Item = (Key, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let cells = self.table.inner.cells.read();
        let cell = cells.get(self.cursor)?;
        self.cursor += 1;
        Some((cell.key.clone(), cell.read()))
    }
}

/// Walks keys `1, 2, 3, ...` until the first missing index.
pub struct IPairs {
    table: Metatable,
    index: usize,
}

impl Iterator for IPairs {
    type Item = (usize, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index + 1;
        let cells = self.table.inner.cells.read();
        let key = Key::Number(index as f64);
        let cell = cells.iter().find(|cell| cell.key == key)?;
        self.index = index;
        Some((index, cell.read()))
    }
}

impl Metatable {
    pub fn pairs(&self) -> Iter {
        Iter {
            table: self.share(),
            cursor: 0,
        }
    }

    pub fn ipairs(&self) -> IPairs {
        IPairs {
            table: self.share(),
            index: 0,
        }
    }

    /// Reset the cursor owned by `slot` to the first cell.
    pub fn begin_iteration(&self, slot: ConsumerSlot) {
        let _cells = self.inner.cells.read();
        self.inner.cursors.lock().insert(slot, 0);
    }

    /// Return the cell under `slot`'s cursor and advance it.
    ///
    /// A slot that never called `begin_iteration` starts at the first cell.
    /// Nested iteration of the same table from one slot shares the cursor.
    pub fn next_entry(&self, slot: ConsumerSlot) -> Option<(Key, Value)> {
        let cells = self.inner.cells.read();
        let pos = {
            let mut cursors = self.inner.cursors.lock();
            let cursor = cursors.entry(slot).or_insert(0);
            let pos = *cursor;
            *cursor += 1;
            pos
        };
        let cell = cells.get(pos)?;
        Some((cell.key.clone(), cell.read()))
    }

    /// Forget `slot`'s cursor.
    pub fn end_iteration(&self, slot: ConsumerSlot) {
        self.inner.cursors.lock().remove(&slot);
    }
}

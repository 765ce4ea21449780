// Numeric-array operations: push / pop / prepend / dequeue_front
//
// All four refuse to run on a table holding a string key. Keys stay
// contiguous from 1: removals renumber larger keys down, prepend renumbers
// everything up.

use log::warn;

use super::{Cell, Metatable, adopt, close_gap};
use crate::convert::IntoValue;
use crate::error::{MetatableError, MetatableResult};
use crate::limits::MAX_KEY;
use crate::value::{Key, Value};

fn ensure_numeric(cells: &[Cell], op: &'static str) -> MetatableResult<()> {
    if cells.iter().any(|cell| cell.key.is_string()) {
        return Err(MetatableError::NotNumericArray { op });
    }
    Ok(())
}

/// Array operations never store nil; that would be a silent no-op.
fn storable<V: IntoValue>(value: V, parent: &Metatable) -> MetatableResult<Value> {
    match value.into_value()? {
        Value::Nil => Err(MetatableError::InvalidValue("nil")),
        value => Ok(adopt(value, parent)),
    }
}

/// Index and key of the cell with the largest numeric key; the later cell
/// wins a tie.
fn max_key(cells: &[Cell]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, cell) in cells.iter().enumerate() {
        if let Some(n) = cell.key.as_number() {
            if best.is_none_or(|(_, max)| n >= max) {
                best = Some((idx, n));
            }
        }
    }
    best
}

impl Metatable {
    /// Append `value` under the key one past the largest numeric key.
    pub fn push<V: IntoValue>(&self, value: V) -> MetatableResult<()> {
        let value = storable(value, self)?;
        let mut cells = self.inner.cells.write();
        ensure_numeric(&cells, "push")?;

        let next = max_key(&cells).map_or(0.0, |(_, max)| max.max(0.0)) + 1.0;
        if next > MAX_KEY {
            return Err(MetatableError::InvalidKey("number out of range"));
        }
        cells.push(Cell::new(Key::Number(next), value));
        Ok(())
    }

    /// Remove and return the value under the largest numeric key.
    ///
    /// Returns `Value::Nil` on an empty table.
    pub fn pop(&self) -> MetatableResult<Value> {
        let mut cells = self.inner.cells.write();
        ensure_numeric(&cells, "pop")?;

        let Some((idx, max)) = max_key(&cells) else {
            return Ok(Value::Nil);
        };
        let removed = cells.remove(idx);
        close_gap(&mut cells, max);
        Ok(removed.value.into_inner())
    }

    /// Insert `value` under key 1, moving every existing key up by one.
    ///
    /// The new cell goes in front of the others so iteration order follows
    /// key order.
    pub fn prepend<V: IntoValue>(&self, value: V) -> MetatableResult<()> {
        let value = storable(value, self)?;
        let mut cells = self.inner.cells.write();
        ensure_numeric(&cells, "prepend")?;
        if max_key(&cells).is_some_and(|(_, max)| max >= MAX_KEY) {
            return Err(MetatableError::InvalidKey("number out of range"));
        }

        for cell in cells.iter_mut() {
            if let Key::Number(n) = &mut cell.key {
                *n += 1.0;
            }
        }
        cells.insert(0, Cell::new(Key::Number(1.0), value));
        Ok(())
    }

    /// Remove and return the value under key 1, moving every larger key
    /// down by one.
    ///
    /// Returns `Value::Nil` when there is no key 1.
    pub fn dequeue_front(&self) -> MetatableResult<Value> {
        let mut cells = self.inner.cells.write();
        ensure_numeric(&cells, "dequeue_front")?;

        let Some(idx) = cells.iter().position(|cell| cell.key == Key::Number(1.0)) else {
            if !cells.is_empty() {
                warn!("dequeue_front on a numeric table without key 1");
            }
            return Ok(Value::Nil);
        };
        let removed = cells.remove(idx);
        close_gap(&mut cells, 1.0);
        Ok(removed.value.into_inner())
    }
}

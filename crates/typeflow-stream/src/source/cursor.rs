//! Built-in cursors.

use typeflow_core::{List, Map, Value};

use super::{Cursor, EntryCursor};

/// Walks a list in index order.
pub struct ListCursor {
    items: std::vec::IntoIter<Value>,
    current: Option<Value>,
}

impl ListCursor {
    pub fn new(list: List) -> Self {
        Self {
            items: list.into_iter(),
            current: None,
        }
    }
}

impl Cursor for ListCursor {
    fn advance(&mut self) -> bool {
        self.current = self.items.next();
        self.current.is_some()
    }

    fn current(&self) -> Option<Value> {
        self.current.clone()
    }

    fn take_current(&mut self) -> Option<Value> {
        self.current.take()
    }

    fn size_hint(&self) -> usize {
        self.items.len()
    }
}

/// Walks a map in insertion order.
pub struct MapCursor {
    entries: indexmap::map::IntoIter<Value, Value>,
    current: Option<(Value, Value)>,
}

impl MapCursor {
    pub fn new(map: Map) -> Self {
        Self {
            entries: map.into_entries(),
            current: None,
        }
    }
}

impl EntryCursor for MapCursor {
    fn advance(&mut self) -> bool {
        self.current = self.entries.next();
        self.current.is_some()
    }

    fn key(&mut self) -> Option<Value> {
        self.current.as_ref().map(|(k, _)| k.clone())
    }

    fn value(&mut self) -> Option<Value> {
        self.current.as_ref().map(|(_, v)| v.clone())
    }

    fn take_entry(&mut self) -> Option<(Value, Value)> {
        self.current.take()
    }

    fn size_hint(&self) -> usize {
        self.entries.len()
    }
}

/// Adapts any iterator of values.
pub struct IterCursor<I> {
    iter: I,
    current: Option<Value>,
    done: bool,
}

impl<I: Iterator<Item = Value>> IterCursor<I> {
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: iter.into_iter(),
            current: None,
            done: false,
        }
    }
}

impl<I: Iterator<Item = Value>> Cursor for IterCursor<I> {
    fn advance(&mut self) -> bool {
        // Iterators are not required to be fused.
        if self.done {
            return false;
        }
        self.current = self.iter.next();
        self.done = self.current.is_none();
        !self.done
    }

    fn current(&self) -> Option<Value> {
        self.current.clone()
    }

    fn take_current(&mut self) -> Option<Value> {
        self.current.take()
    }

    fn size_hint(&self) -> usize {
        self.iter.size_hint().0
    }
}

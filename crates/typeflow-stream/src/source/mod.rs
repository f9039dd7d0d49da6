//! Iteration sources for pipelines.
//!
//! A source turns a container, or anything the caller can step through,
//! into a uniform cursor with a known element type. Sequence sources yield
//! single values; entry sources yield key/value pairs.

mod cursor;
mod projected;

#[cfg(test)]
mod tests;

use typeflow_core::{check, Result, StreamError, Value, ValueType};

pub use cursor::{IterCursor, ListCursor, MapCursor};
pub(crate) use projected::{ProjectedEntries, Projection};

/// A caller-supplied sequence cursor.
///
/// `current` is only meaningful right after an `advance` that returned true.
/// Once `advance` returns false it must keep returning false.
pub trait Cursor {
    fn advance(&mut self) -> bool;

    fn current(&self) -> Option<Value>;

    /// Moves the current value out. Pipelines call this once per position.
    fn take_current(&mut self) -> Option<Value> {
        self.current()
    }

    /// Lower bound on the number of values left.
    fn size_hint(&self) -> usize {
        0
    }
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn current(&self) -> Option<Value> {
        (**self).current()
    }

    fn take_current(&mut self) -> Option<Value> {
        (**self).take_current()
    }

    fn size_hint(&self) -> usize {
        (**self).size_hint()
    }
}

/// A caller-supplied key/value cursor.
pub trait EntryCursor {
    fn advance(&mut self) -> bool;

    fn key(&mut self) -> Option<Value>;

    fn value(&mut self) -> Option<Value>;

    /// Moves the current entry out. Pipelines call this once per position.
    fn take_entry(&mut self) -> Option<(Value, Value)> {
        Some((self.key()?, self.value()?))
    }

    fn size_hint(&self) -> usize {
        0
    }
}

impl<C: EntryCursor + ?Sized> EntryCursor for Box<C> {
    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn key(&mut self) -> Option<Value> {
        (**self).key()
    }

    fn value(&mut self) -> Option<Value> {
        (**self).value()
    }

    fn take_entry(&mut self) -> Option<(Value, Value)> {
        (**self).take_entry()
    }

    fn size_hint(&self) -> usize {
        (**self).size_hint()
    }
}

fn require_hint(hint: Option<ValueType>) -> Result<ValueType> {
    hint.filter(check::is_valid_hint).ok_or(StreamError::NilHint)
}

fn missing_current() -> StreamError {
    StreamError::Cursor("advance returned true but no current value is available".to_string())
}

/// A cursor over single values with a fixed element type.
pub struct SequenceSource {
    cursor: Box<dyn Cursor>,
    elem: ValueType,
}

impl SequenceSource {
    /// Wraps a list value.
    ///
    /// # Errors
    ///
    /// [`StreamError::Shape`] if the value is not sequence-like.
    pub fn from_sequence(sequence: Value) -> Result<Self> {
        match sequence {
            Value::List(list) => Ok(Self {
                elem: list.elem_type().clone(),
                cursor: Box::new(ListCursor::new(list)),
            }),
            other => {
                debug_assert!(!check::is_sequence_like(&other));
                Err(StreamError::Shape {
                    expected: "a sequence",
                    found: other.value_type(),
                })
            }
        }
    }

    /// Wraps a caller-supplied cursor whose values all have type `hint`.
    ///
    /// # Errors
    ///
    /// [`StreamError::NilHint`] if the hint is absent or contains `nil`.
    pub fn from_cursor<C>(cursor: C, hint: Option<ValueType>) -> Result<Self>
    where
        C: Cursor + 'static,
    {
        Ok(Self {
            elem: require_hint(hint)?,
            cursor: Box::new(cursor),
        })
    }

    /// Wraps an iterator of values of type `hint`.
    pub fn from_iter<I>(iter: I, hint: Option<ValueType>) -> Result<Self>
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'static,
    {
        Self::from_cursor(IterCursor::new(iter), hint)
    }

    pub fn elem_type(&self) -> &ValueType {
        &self.elem
    }

    pub fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    pub fn current(&self) -> Option<Value> {
        self.cursor.current()
    }

    pub(crate) fn take_current(&mut self) -> Result<Value> {
        self.cursor.take_current().ok_or_else(missing_current)
    }

    pub fn size_hint(&self) -> usize {
        self.cursor.size_hint()
    }
}

enum EntryOrigin {
    Cursor(Box<dyn EntryCursor>),
    Projected(Box<ProjectedEntries>),
}

/// A cursor over key/value pairs with fixed key and value types.
///
/// Besides maps and caller cursors, an entry source can sit on top of a
/// sequence pipeline whose elements are projected into pairs; that is how a
/// sequence stream turns into an entry stream.
pub struct EntrySource {
    origin: EntryOrigin,
    key: ValueType,
    value: ValueType,
}

impl EntrySource {
    /// Wraps a map value.
    ///
    /// # Errors
    ///
    /// [`StreamError::Shape`] if the value is not mapping-like.
    pub fn from_mapping(mapping: Value) -> Result<Self> {
        match mapping {
            Value::Map(map) => Ok(Self {
                key: map.key_type().clone(),
                value: map.value_type().clone(),
                origin: EntryOrigin::Cursor(Box::new(MapCursor::new(map))),
            }),
            other => {
                debug_assert!(!check::is_mapping_like(&other));
                Err(StreamError::Shape {
                    expected: "a mapping",
                    found: other.value_type(),
                })
            }
        }
    }

    /// Wraps a caller-supplied entry cursor.
    ///
    /// # Errors
    ///
    /// [`StreamError::NilHint`] if either hint is absent or contains `nil`.
    pub fn from_entry_cursor<C>(
        cursor: C,
        key_hint: Option<ValueType>,
        value_hint: Option<ValueType>,
    ) -> Result<Self>
    where
        C: EntryCursor + 'static,
    {
        Ok(Self {
            key: require_hint(key_hint)?,
            value: require_hint(value_hint)?,
            origin: EntryOrigin::Cursor(Box::new(cursor)),
        })
    }

    pub(crate) fn projected(entries: ProjectedEntries, key: ValueType, value: ValueType) -> Self {
        Self {
            origin: EntryOrigin::Projected(Box::new(entries)),
            key,
            value,
        }
    }

    pub fn key_type(&self) -> &ValueType {
        &self.key
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value
    }

    /// Steps to the next entry.
    ///
    /// Fails only when the source is a projection whose upstream stages fail.
    pub fn advance(&mut self) -> Result<bool> {
        match &mut self.origin {
            EntryOrigin::Cursor(cursor) => Ok(cursor.advance()),
            EntryOrigin::Projected(entries) => entries.advance(),
        }
    }

    pub fn key(&mut self) -> Result<Value> {
        match &mut self.origin {
            EntryOrigin::Cursor(cursor) => cursor.key().ok_or_else(missing_current),
            EntryOrigin::Projected(entries) => entries.key(),
        }
    }

    pub fn value(&mut self) -> Result<Value> {
        match &mut self.origin {
            EntryOrigin::Cursor(cursor) => cursor.value().ok_or_else(missing_current),
            EntryOrigin::Projected(entries) => entries.value(),
        }
    }

    pub(crate) fn take_entry(&mut self) -> Result<(Value, Value)> {
        match &mut self.origin {
            EntryOrigin::Cursor(cursor) => cursor.take_entry().ok_or_else(missing_current),
            EntryOrigin::Projected(entries) => entries.take_entry(),
        }
    }

    pub fn size_hint(&self) -> usize {
        match &self.origin {
            EntryOrigin::Cursor(cursor) => cursor.size_hint(),
            EntryOrigin::Projected(entries) => entries.size_hint(),
        }
    }
}

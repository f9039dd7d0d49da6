// Tests for iteration sources.

use std::sync::atomic::Ordering;

use typeflow_core::{Map, StreamError, Value, ValueType};
use typeflow_test::cursors::CountingSteps;
use typeflow_test::mappings::indexed_strings;
use typeflow_test::sequences::{digit_strings, int_range};

use super::*;

impl Cursor for CountingSteps {
    fn advance(&mut self) -> bool {
        self.step()
    }

    fn current(&self) -> Option<Value> {
        CountingSteps::current(self)
    }
}

/// Claims to have a value but never produces one.
struct Hollow;

impl Cursor for Hollow {
    fn advance(&mut self) -> bool {
        true
    }

    fn current(&self) -> Option<Value> {
        None
    }
}

fn drain(source: &mut SequenceSource) -> Vec<Value> {
    let mut out = Vec::new();
    while source.advance() {
        out.push(source.take_current().unwrap());
    }
    out
}

// ============================================================================
// Sequence sources
// ============================================================================

#[test]
fn test_from_sequence_walks_in_order() {
    let mut source = SequenceSource::from_sequence(int_range(1, 3)).unwrap();
    assert_eq!(source.elem_type(), &ValueType::I64);
    assert_eq!(source.size_hint(), 3);
    assert_eq!(drain(&mut source), vec![Value::I64(1), Value::I64(2), Value::I64(3)]);

    // Exhaustion is permanent.
    assert!(!source.advance());
    assert!(!source.advance());
}

#[test]
fn test_current_is_readable_after_advance() {
    let mut source = SequenceSource::from_sequence(digit_strings()).unwrap();
    assert!(source.advance());
    assert_eq!(source.current(), Some(Value::string("1")));
    assert_eq!(source.current(), Some(Value::string("1")));
}

#[test]
fn test_from_sequence_rejects_non_sequences() {
    let err = SequenceSource::from_sequence(indexed_strings(2, &[])).err().unwrap();
    assert_eq!(
        err,
        StreamError::Shape {
            expected: "a sequence",
            found: ValueType::map(ValueType::I64, ValueType::String),
        }
    );
    assert!(SequenceSource::from_sequence(Value::I64(3)).is_err());
}

#[test]
fn test_from_cursor_requires_hint() {
    let (steps, _) = CountingSteps::new(vec![]);
    assert_eq!(
        SequenceSource::from_cursor(steps, None).err(),
        Some(StreamError::NilHint)
    );

    let (steps, _) = CountingSteps::new(vec![]);
    assert_eq!(
        SequenceSource::from_cursor(steps, Some(ValueType::list(ValueType::Nil))).err(),
        Some(StreamError::NilHint)
    );
}

#[test]
fn test_from_cursor_steps_caller_cursor() {
    let (steps, advances) = CountingSteps::new(vec![Value::I64(7), Value::I64(8)]);
    let mut source = SequenceSource::from_cursor(steps, Some(ValueType::I64)).unwrap();

    assert_eq!(drain(&mut source), vec![Value::I64(7), Value::I64(8)]);
    assert_eq!(advances.load(Ordering::SeqCst), 3);
}

#[test]
fn test_from_iter() {
    let values = (0..4i64).map(Value::I64);
    let mut source = SequenceSource::from_iter(values, Some(ValueType::I64)).unwrap();
    assert_eq!(drain(&mut source).len(), 4);
    assert!(!source.advance());
}

#[test]
fn test_hollow_cursor_is_a_contract_violation() {
    let mut source = SequenceSource::from_cursor(Hollow, Some(ValueType::I64)).unwrap();
    assert!(source.advance());
    assert!(matches!(source.take_current(), Err(StreamError::Cursor(_))));
}

// ============================================================================
// Entry sources
// ============================================================================

#[test]
fn test_from_mapping_keeps_insertion_order() {
    let map = Map::from_entries(vec![(3i64, "c"), (1, "a"), (2, "b")]);
    let mut source = EntrySource::from_mapping(Value::Map(map)).unwrap();
    assert_eq!(source.key_type(), &ValueType::I64);
    assert_eq!(source.value_type(), &ValueType::String);

    let mut keys = Vec::new();
    while source.advance().unwrap() {
        keys.push(source.key().unwrap());
        assert!(source.value().is_ok());
    }
    assert_eq!(keys, vec![Value::I64(3), Value::I64(1), Value::I64(2)]);
}

#[test]
fn test_from_mapping_rejects_non_mappings() {
    let err = EntrySource::from_mapping(digit_strings()).err().unwrap();
    assert!(matches!(err, StreamError::Shape { expected: "a mapping", .. }));
}

#[test]
fn test_from_entry_cursor_requires_both_hints() {
    let map = Map::from_entries(vec![(1i64, 1i64)]);
    let err = EntrySource::from_entry_cursor(MapCursor::new(map.clone()), Some(ValueType::I64), None)
        .err();
    assert_eq!(err, Some(StreamError::NilHint));

    let source = EntrySource::from_entry_cursor(
        MapCursor::new(map),
        Some(ValueType::I64),
        Some(ValueType::I64),
    );
    assert!(source.is_ok());
}

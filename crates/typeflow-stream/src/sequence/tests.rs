// Tests for sequence pipelines.

use std::collections::HashMap;

use typeflow_config::{ReusePolicy, StreamConfig};
use typeflow_core::{List, Map, StageKind, StreamError, Value, ValueType};
use typeflow_test::cursors::CallCounter;
use typeflow_test::mappings::indexed_strings;
use typeflow_test::sequences::{digit_strings, empty_ints, int_range};

use super::*;

fn squares_of_digits() -> SequenceStream {
    SequenceStream::from_sequence(digit_strings())
        .filter(|s: String| s.len() < 2)
        .map(|s: String| {
            let n: i64 = s.parse().unwrap_or_default();
            n * n
        })
}

// ============================================================================
// Construction and appends
// ============================================================================

#[test]
fn test_construction_error_is_sticky() {
    let mut stream = SequenceStream::from_sequence(indexed_strings(1, &[]))
        .filter(|n: i64| n > 0)
        .map(|n: i64| n + 1);

    assert!(matches!(stream.error(), Some(StreamError::Shape { .. })));
    assert_eq!(stream.stage_count(), 0);
    assert_eq!(stream.out_type(), None);
    assert!(matches!(stream.collect(), Err(StreamError::Shape { .. })));
}

#[test]
fn test_missing_hint() {
    let stream = SequenceStream::from_iter(Vec::<Value>::new(), None);
    assert_eq!(stream.error(), Some(&StreamError::NilHint));
}

#[test]
fn test_append_tracks_out_type() {
    let stream = SequenceStream::from_items(vec![1i64, 2]).map(|n: i64| n.to_string());
    assert_eq!(stream.out_type(), Some(&ValueType::String));
    assert_eq!(stream.stage_count(), 1);
    assert!(stream.error().is_none());
}

#[test]
fn test_mismatch_keeps_stage_count_and_first_error() {
    let stream = SequenceStream::from_sequence(digit_strings())
        .filter(|s: String| !s.is_empty())
        .map(|n: i64| n * 2)
        .filter(|b: bool| b);

    assert_eq!(stream.stage_count(), 1);
    assert_eq!(stream.out_type(), Some(&ValueType::String));
    match stream.error() {
        Some(StreamError::StageShape { stage, .. }) => assert_eq!(*stage, StageKind::Map),
        other => panic!("unexpected error state: {:?}", other),
    }
}

// ============================================================================
// Terminals
// ============================================================================

#[test]
fn test_collect_squares() {
    let mut stream = squares_of_digits();
    let out = stream.collect().unwrap();
    assert_eq!(out, Value::List(List::from_items(vec![1i64, 4, 9, 16, 36])));
    assert!(stream.is_consumed());
}

#[test]
fn test_collect_empty_source() {
    let out = SequenceStream::from_sequence(empty_ints())
        .map(|n: i64| n + 1)
        .collect()
        .unwrap();
    assert_eq!(out, Value::List(List::new(ValueType::I64)));
}

#[test]
fn test_second_collect_drains_empty() {
    let mut stream = squares_of_digits();
    stream.collect().unwrap();

    let again = stream.collect().unwrap();
    assert_eq!(again, Value::List(List::new(ValueType::I64)));
}

#[test]
fn test_second_collect_rejected_by_policy() {
    let mut stream =
        squares_of_digits().with_config(StreamConfig::new().with_reuse(ReusePolicy::Reject));
    stream.collect().unwrap();

    let mut destination = Value::List(List::from_items(vec![7i64]));
    assert_eq!(stream.collect_into(&mut destination), Err(StreamError::Consumed));
    assert_eq!(destination, Value::List(List::from_items(vec![7i64])));
}

#[test]
fn test_collect_into_replaces_contents() {
    let mut destination = Value::List(List::from_items(vec![100i64, 200]));
    squares_of_digits().collect_into(&mut destination).unwrap();
    assert_eq!(destination, Value::List(List::from_items(vec![1i64, 4, 9, 16, 36])));
}

#[test]
fn test_collect_into_mismatch_leaves_destination() {
    let mut destination = Value::List(List::from_items(vec!["keep"]));
    let snapshot = destination.clone();
    let mut stream = squares_of_digits();

    let err = stream.collect_into(&mut destination).unwrap_err();
    assert_eq!(
        err,
        StreamError::TypeMismatch {
            expected: ValueType::list(ValueType::I64),
            found: ValueType::list(ValueType::String),
        }
    );
    assert_eq!(destination, snapshot);
    // The check does not consume the source.
    assert!(!stream.is_consumed());
    assert_eq!(stream.collect().unwrap().as_list().map(List::len), Some(5));
}

#[test]
fn test_collect_into_non_list() {
    let mut destination = Value::I64(0);
    let err = squares_of_digits().collect_into(&mut destination).unwrap_err();
    assert!(matches!(err, StreamError::TypeMismatch { .. }));
    assert_eq!(destination, Value::I64(0));
}

#[test]
fn test_collect_as_typed() {
    let squares: Vec<i64> = squares_of_digits().collect_as().unwrap();
    assert_eq!(squares, vec![1, 4, 9, 16, 36]);

    let err = squares_of_digits().collect_as::<Vec<String>>().unwrap_err();
    assert!(matches!(err, StreamError::TypeMismatch { .. }));
}

#[test]
fn test_collect_into_typed_assigns_on_success_only() {
    let mut out = vec![0i32];
    let err = squares_of_digits().collect_into_typed(&mut out).unwrap_err();
    assert!(matches!(err, StreamError::TypeMismatch { .. }));
    assert_eq!(out, vec![0]);

    let mut out: Vec<i64> = Vec::new();
    squares_of_digits().collect_into_typed(&mut out).unwrap();
    assert_eq!(out.len(), 5);
}

#[test]
fn test_evaluation_error_leaves_destination() {
    let mut destination = Value::List(List::from_items(vec![5i64]));
    let snapshot = destination.clone();
    let failing = crate::FnResolver::new(ValueType::I64, |v: Value| match v.as_i64() {
        Some(3) => Err(StreamError::Cursor("stop".to_string())),
        _ => Ok(Some(v)),
    });

    let err = SequenceStream::from_sequence(int_range(1, 5))
        .resolve(failing)
        .collect_into(&mut destination)
        .unwrap_err();
    assert!(matches!(err, StreamError::Cursor(_)));
    assert_eq!(destination, snapshot);
}

#[test]
fn test_evaluation_error_is_sticky() {
    let liar = crate::FnResolver::new(ValueType::I64, |v: Value| match v.as_i64() {
        Some(2) => Ok(Some(Value::string("x"))),
        _ => Ok(Some(v)),
    });
    let mut stream = SequenceStream::from_items(vec![1i64, 2, 3, 4]).resolve(liar);

    let conversion = StreamError::Conversion {
        expected: ValueType::I64,
        found: ValueType::String,
    };
    assert_eq!(stream.collect(), Err(conversion.clone()));
    assert_eq!(stream.error(), Some(&conversion));
    assert_eq!(stream.stage_count(), 1);

    // The unread remainder is never handed out.
    assert_eq!(stream.collect(), Err(conversion.clone()));
    let mut destination = Value::List(List::from_items(vec![9i64]));
    assert_eq!(stream.collect_into(&mut destination), Err(conversion));
    assert_eq!(destination, Value::List(List::from_items(vec![9i64])));
}

#[test]
fn test_into_iter_is_lazy() {
    let counter = CallCounter::new();
    let seen = counter.clone();
    let stream = SequenceStream::from_sequence(int_range(1, 10)).map(move |n: i64| {
        seen.hit();
        n * 10
    });

    let firsts: Vec<Value> = stream.into_iter().take(2).map(|v| v.unwrap()).collect();
    assert_eq!(firsts, vec![Value::I64(10), Value::I64(20)]);
    assert_eq!(counter.count(), 2);
}

#[test]
fn test_into_iter_reports_sticky_error() {
    let stream = SequenceStream::from_sequence(Value::Nil);
    let results: Vec<_> = stream.into_iter().collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

// ============================================================================
// Bridges
// ============================================================================

#[test]
fn test_to_entry_stream() {
    let map: HashMap<String, i64> = SequenceStream::from_sequence(digit_strings())
        .to_entry_stream(|s: String| {
            let n: i64 = s.parse().unwrap_or_default();
            (s, n)
        })
        .collect_as()
        .unwrap();
    assert_eq!(map.len(), 6);
    assert_eq!(map.get("55"), Some(&55));
}

#[test]
fn test_projector_runs_once_per_survivor() {
    let counter = CallCounter::new();
    let seen = counter.clone();
    let mut entries = SequenceStream::from_sequence(int_range(0, 9))
        .filter(|n: i64| n % 3 == 0)
        .to_entry_stream(move |n: i64| {
            seen.hit();
            (n, n * n)
        })
        .filter_key(|k: i64| k > 0)
        .filter_value(|v: i64| v < 50);

    let out = entries.collect().unwrap();
    assert_eq!(out.as_map().map(Map::len), Some(2));
    assert_eq!(counter.count(), 4);
}

#[test]
fn test_bridge_rejects_wrong_projector() {
    let entries = SequenceStream::from_sequence(digit_strings()).to_entry_stream(|s: String| s);
    assert!(matches!(
        entries.error(),
        Some(StreamError::StageShape { stage: StageKind::PairProjection, .. })
    ));

    let entries = SequenceStream::from_sequence(digit_strings()).as_map_key(|n: i64| n);
    assert!(matches!(
        entries.error(),
        Some(StreamError::StageShape { stage: StageKind::KeyProjection, .. })
    ));
}

#[test]
fn test_bridge_rejects_nil_value_type() {
    let to_nil = typeflow_core::Func::new(
        typeflow_core::Signature::new([ValueType::I64], [ValueType::Nil]),
        |_args: typeflow_core::Args| Ok(typeflow_core::Args::new()),
    );
    let entries = SequenceStream::from_sequence(int_range(1, 3)).as_map_key(to_nil);
    assert!(matches!(
        entries.error(),
        Some(StreamError::StageShape { stage: StageKind::KeyProjection, .. })
    ));
}

#[test]
fn test_bridge_keeps_sticky_error() {
    let entries = SequenceStream::from_sequence(digit_strings())
        .map(|n: i64| n)
        .as_map_key(|s: String| s);
    assert!(matches!(
        entries.error(),
        Some(StreamError::StageShape { stage: StageKind::Map, .. })
    ));
}

#[test]
fn test_bridge_inherits_consumed_source() {
    let mut stream = SequenceStream::from_sequence(int_range(1, 3));
    stream.collect().unwrap();

    let mut entries = stream.as_map_key(|n: i64| n.to_string());
    assert!(entries.is_consumed());
    let out = entries.collect().unwrap();
    assert_eq!(out.as_map().map(Map::len), Some(0));
}

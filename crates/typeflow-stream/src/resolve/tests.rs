// Tests for stage chains.

use typeflow_core::{Args, Func, IntoFunc, Signature, StageKind, StreamError, Value, ValueType};

use super::*;

fn emitted(outcome: Outcome<Value>) -> Value {
    match outcome {
        Outcome::Emit(value) => value,
        Outcome::Dropped(index) => panic!("dropped at stage {}", index),
    }
}

// ============================================================================
// Sequence chains
// ============================================================================

#[test]
fn test_empty_chain_is_identity() {
    let chain = StageChain::new(ValueType::I64);
    assert_eq!(chain.out_type(), &ValueType::I64);
    assert_eq!(chain.len(), 0);
    assert_eq!(emitted(chain.apply(Value::I64(5)).unwrap()), Value::I64(5));
}

#[test]
fn test_filter_then_map() {
    let mut chain = StageChain::new(ValueType::String);
    chain.push_filter((|s: String| s.len() < 2).into_func()).unwrap();
    chain.push_map((|s: String| s.len() as i64).into_func()).unwrap();

    assert_eq!(chain.out_type(), &ValueType::I64);
    assert_eq!(chain.kind_at(0), Some(StageKind::Filter));
    assert_eq!(chain.kind_at(1), Some(StageKind::Map));
    assert_eq!(emitted(chain.apply(Value::string("7")).unwrap()), Value::I64(1));
    assert_eq!(chain.apply(Value::string("77")).unwrap(), Outcome::Dropped(0));
}

#[test]
fn test_mismatched_filter_is_rejected() {
    let mut chain = StageChain::new(ValueType::String);
    let err = chain.push_filter((|n: i64| n > 0).into_func()).unwrap_err();

    assert_eq!(
        err,
        StreamError::StageShape {
            stage: StageKind::Filter,
            expected: "fn(string) -> bool".to_string(),
            found: Signature::new([ValueType::I64], [ValueType::Bool]),
        }
    );
    assert_eq!(chain.len(), 0);
}

#[test]
fn test_filter_must_return_bool() {
    let mut chain = StageChain::new(ValueType::I64);
    assert!(chain.push_filter((|n: i64| n).into_func()).is_err());
}

#[test]
fn test_map_checks_against_previous_output() {
    let mut chain = StageChain::new(ValueType::I64);
    chain.push_map((|n: i64| n.to_string()).into_func()).unwrap();

    // The element is a string now.
    assert!(chain.push_map((|n: i64| n + 1).into_func()).is_err());
    assert!(chain.push_map((|s: String| s + "!").into_func()).is_ok());
}

#[test]
fn test_custom_resolver_drops_and_rewrites() {
    let mut chain = StageChain::new(ValueType::I64);
    let halve = FnResolver::new(ValueType::I64, |v: Value| {
        Ok(v.as_i64().filter(|n| n % 2 == 0).map(|n| Value::I64(n / 2)))
    });
    chain.push_custom(Box::new(halve)).unwrap();

    assert_eq!(chain.kind_at(0), Some(StageKind::Resolve));
    assert_eq!(emitted(chain.apply(Value::I64(8)).unwrap()), Value::I64(4));
    assert_eq!(chain.apply(Value::I64(7)).unwrap(), Outcome::Dropped(0));
}

#[test]
fn test_custom_resolver_must_declare_type() {
    let mut chain = StageChain::new(ValueType::I64);
    let vague = FnResolver::new(ValueType::Nil, |v: Value| Ok(Some(v)));
    assert!(matches!(
        chain.push_custom(Box::new(vague)),
        Err(StreamError::StageShape { stage: StageKind::Resolve, .. })
    ));
}

#[test]
fn test_mapper_must_declare_type() {
    let to_nil = || Func::new(Signature::new([ValueType::I64], [ValueType::Nil]), |_args: Args| {
        let mut out = Args::new();
        out.push(Value::Nil);
        Ok(out)
    });

    let mut chain = StageChain::new(ValueType::I64);
    assert!(matches!(
        chain.push_map(to_nil()),
        Err(StreamError::StageShape { stage: StageKind::Map, .. })
    ));
    assert_eq!(chain.len(), 0);

    let mut entries = EntryChain::new(ValueType::String, ValueType::I64);
    assert!(matches!(
        entries.push_map_value(to_nil()),
        Err(StreamError::StageShape { stage: StageKind::MapValue, .. })
    ));
    assert_eq!(entries.len(), 0);
}

#[test]
fn test_lying_resolver_fails_at_next_typed_stage() {
    let mut chain = StageChain::new(ValueType::I64);
    let liar = FnResolver::new(ValueType::I64, |_v: Value| Ok(Some(Value::string("x"))));
    chain.push_custom(Box::new(liar)).unwrap();
    chain.push_map((|n: i64| n * 2).into_func()).unwrap();

    assert_eq!(
        chain.apply(Value::I64(1)).unwrap_err(),
        StreamError::Conversion {
            expected: ValueType::I64,
            found: ValueType::String,
        }
    );
}

#[test]
fn test_dynamic_function_stage() {
    let signature = Signature::new([ValueType::I64], [ValueType::String]);
    let describe = Func::new(signature, |args: Args| {
        let mut out = Args::new();
        out.push(Value::string(format!("#{}", args[0])));
        Ok(out)
    });

    let mut chain = StageChain::new(ValueType::I64);
    chain.push_map(describe).unwrap();
    assert_eq!(emitted(chain.apply(Value::I64(3)).unwrap()), Value::string("#3"));
}

// ============================================================================
// Entry chains
// ============================================================================

#[test]
fn test_entry_filters() {
    let mut chain = EntryChain::new(ValueType::I64, ValueType::String);
    chain.push_filter((|k: i64, v: String| k > 0 && !v.is_empty()).into_func()).unwrap();
    chain.push_filter_key((|k: i64| k < 10).into_func()).unwrap();
    chain.push_filter_value((|v: String| v != "skip").into_func()).unwrap();

    let keep = chain.apply(Value::I64(1), Value::string("a")).unwrap();
    assert_eq!(keep, Outcome::Emit((Value::I64(1), Value::string("a"))));
    assert_eq!(chain.apply(Value::I64(0), Value::string("a")).unwrap(), Outcome::Dropped(0));
    assert_eq!(chain.apply(Value::I64(12), Value::string("a")).unwrap(), Outcome::Dropped(1));
    assert_eq!(chain.apply(Value::I64(2), Value::string("skip")).unwrap(), Outcome::Dropped(2));
}

#[test]
fn test_entry_maps_change_descriptors() {
    let mut chain = EntryChain::new(ValueType::I64, ValueType::String);
    chain.push_map_key((|k: i64| k as f64).into_func()).unwrap();
    assert_eq!(chain.out_types(), (&ValueType::F64, &ValueType::String));

    chain.push_map_value((|v: String| v.len() as i32).into_func()).unwrap();
    assert_eq!(chain.out_types(), (&ValueType::F64, &ValueType::I32));

    chain.push_map_entry((|k: f64, v: i32| (v, k)).into_func()).unwrap();
    assert_eq!(chain.out_types(), (&ValueType::I32, &ValueType::F64));

    let out = chain.apply(Value::I64(2), Value::string("abc")).unwrap();
    assert_eq!(out, Outcome::Emit((Value::I32(3), Value::F64(2.0))));
}

#[test]
fn test_entry_stage_kinds_checked_separately() {
    let mut chain = EntryChain::new(ValueType::I64, ValueType::String);

    let err = chain.push_filter_key((|v: String| v.is_empty()).into_func()).unwrap_err();
    assert!(matches!(err, StreamError::StageShape { stage: StageKind::FilterKey, .. }));

    let err = chain.push_map_value((|k: i64| k).into_func()).unwrap_err();
    assert!(matches!(err, StreamError::StageShape { stage: StageKind::MapValue, .. }));

    // A one-result mapper is not an entry mapper.
    let err = chain.push_map_entry((|k: i64, _v: String| k).into_func()).unwrap_err();
    assert!(matches!(err, StreamError::StageShape { stage: StageKind::MapEntry, .. }));

    assert_eq!(chain.len(), 0);
}

#[test]
fn test_entry_custom_resolver() {
    let mut chain = EntryChain::new(ValueType::I64, ValueType::String);
    let swap = FnEntryResolver::new(ValueType::String, ValueType::I64, |k: Value, v: Value| {
        Ok(Some((v, k)))
    });
    chain.push_custom(Box::new(swap)).unwrap();

    assert_eq!(chain.out_types(), (&ValueType::String, &ValueType::I64));
    assert_eq!(chain.kind_at(0), Some(StageKind::Resolve));
    let out = chain.apply(Value::I64(1), Value::string("one")).unwrap();
    assert_eq!(out, Outcome::Emit((Value::string("one"), Value::I64(1))));
}

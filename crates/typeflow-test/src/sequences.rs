//! Sequence fixtures.

use typeflow_core::{List, Value};

/// `["1", "2", "3", "4", "55", "6"]`
pub fn digit_strings() -> Value {
    strings(&["1", "2", "3", "4", "55", "6"])
}

/// A list of strings.
pub fn strings(items: &[&str]) -> Value {
    Value::List(List::from_items(items.iter().copied()))
}

/// `[start, end]` as `i64` values.
pub fn int_range(start: i64, end: i64) -> Value {
    Value::List(List::from_items(start..=end))
}

/// An empty list of `i64`.
pub fn empty_ints() -> Value {
    Value::List(List::from_items(Vec::<i64>::new()))
}

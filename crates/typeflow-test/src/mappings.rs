//! Mapping fixtures.

use typeflow_core::{Map, Value};

/// `{0: "0", 1: "1", ..., n: "n"}` plus any extra keys.
///
/// ```
/// use typeflow_test::mappings::indexed_strings;
///
/// let map = indexed_strings(5, &[99]);
/// assert_eq!(map.as_map().unwrap().len(), 7);
/// ```
pub fn indexed_strings(n: i64, extra: &[i64]) -> Value {
    let keys = (0..=n).chain(extra.iter().copied());
    Value::Map(Map::from_entries(keys.map(|k| (k, k.to_string()))))
}

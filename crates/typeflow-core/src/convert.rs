//! Conversions between Rust types and [`Value`].

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Result, StreamError};
use crate::value::{List, Map, Value};
use crate::value_type::ValueType;

/// A Rust type with a fixed runtime descriptor.
pub trait Typed {
    fn value_type() -> ValueType;
}

/// Converts a Rust value into a [`Value`] of `Self::value_type()`.
pub trait IntoValue: Typed {
    fn into_value(self) -> Value;
}

/// Extracts a Rust value from a [`Value`].
///
/// Fails with [`StreamError::Conversion`] when the value has another type.
pub trait FromValue: Typed + Sized {
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch<T: Typed>(found: &Value) -> StreamError {
    StreamError::conversion(T::value_type(), found.value_type())
}

macro_rules! scalar_value {
    ($ty:ty, $variant:ident) => {
        impl Typed for $ty {
            fn value_type() -> ValueType {
                ValueType::$variant
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch::<Self>(&other)),
                }
            }
        }
    };
}

scalar_value!(bool, Bool);
scalar_value!(i32, I32);
scalar_value!(i64, I64);
scalar_value!(f64, F64);
scalar_value!(Arc<str>, String);

impl Typed for String {
    fn value_type() -> ValueType {
        ValueType::String
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self.into())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.to_string()),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl Typed for &str {
    fn value_type() -> ValueType {
        ValueType::String
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.into())
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::list(T::value_type())
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(List::from_items(self))
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(list) if *list.elem_type() == T::value_type() => {
                list.into_iter().map(T::from_value).collect()
            }
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<K: Typed, V: Typed> Typed for HashMap<K, V> {
    fn value_type() -> ValueType {
        ValueType::map(K::value_type(), V::value_type())
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for HashMap<K, V> {
    fn into_value(self) -> Value {
        Value::Map(Map::from_entries(self))
    }
}

impl<K, V> FromValue for HashMap<K, V>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
{
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(map) if is_map_of::<K, V>(&map) => map
                .into_entries()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<K: Typed, V: Typed> Typed for IndexMap<K, V> {
    fn value_type() -> ValueType {
        ValueType::map(K::value_type(), V::value_type())
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for IndexMap<K, V> {
    fn into_value(self) -> Value {
        Value::Map(Map::from_entries(self))
    }
}

impl<K, V> FromValue for IndexMap<K, V>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
{
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(map) if is_map_of::<K, V>(&map) => map
                .into_entries()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

fn is_map_of<K: Typed, V: Typed>(map: &Map) -> bool {
    *map.key_type() == K::value_type() && *map.value_type() == V::value_type()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_round_trip() {
        assert_eq!(i64::from_value(7i64.into_value()), Ok(7));
        assert_eq!(String::from_value("x".into_value()), Ok("x".to_string()));
        assert_eq!(bool::from_value(true.into_value()), Ok(true));
    }

    #[test]
    fn test_scalar_mismatch() {
        let err = i64::from_value(Value::I32(3)).unwrap_err();
        assert_eq!(
            err,
            StreamError::Conversion {
                expected: ValueType::I64,
                found: ValueType::I32,
            }
        );
    }

    #[test]
    fn test_vec_checks_element_type() {
        let value = vec![1i32, 2, 3].into_value();
        assert_eq!(value.value_type(), ValueType::list(ValueType::I32));
        assert_eq!(Vec::<i32>::from_value(value.clone()), Ok(vec![1, 2, 3]));
        assert!(Vec::<i64>::from_value(value).is_err());
    }

    #[test]
    fn test_empty_vec_keeps_type() {
        let value = Vec::<String>::new().into_value();
        assert_eq!(value.value_type(), ValueType::list(ValueType::String));
    }

    #[test]
    fn test_hash_map_conversion() {
        let mut source = HashMap::new();
        source.insert(1i64, "one".to_string());
        source.insert(2i64, "two".to_string());

        let value = source.clone().into_value();
        assert_eq!(
            value.value_type(),
            ValueType::map(ValueType::I64, ValueType::String)
        );
        assert_eq!(HashMap::<i64, String>::from_value(value.clone()), Ok(source));
        assert!(HashMap::<i64, i64>::from_value(value).is_err());
    }
}

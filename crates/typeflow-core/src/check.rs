//! Shape compatibility checks.
//!
//! Pure predicates over values, descriptors and signatures. They never fail;
//! callers turn a `false` into a construction-time error.

use crate::func::Signature;
use crate::value::Value;
use crate::value_type::ValueType;

/// Returns true if the value is an ordered sequence.
pub fn is_sequence_like(value: &Value) -> bool {
    matches!(value, Value::List(_))
}

/// Returns true if the value is a key/value mapping.
pub fn is_mapping_like(value: &Value) -> bool {
    matches!(value, Value::Map(_))
}

/// `fn(elem) -> bool`
pub fn is_filter_of(signature: &Signature, elem: &ValueType) -> bool {
    signature.params() == [elem.clone()] && signature.results() == [ValueType::Bool]
}

/// `fn(elem) -> any`
pub fn is_mapper_of(signature: &Signature, elem: &ValueType) -> bool {
    signature.params() == [elem.clone()] && signature.results().len() == 1
}

/// `fn(key, value) -> bool`
pub fn is_entry_filter_of(signature: &Signature, key: &ValueType, value: &ValueType) -> bool {
    signature.params() == [key.clone(), value.clone()] && signature.results() == [ValueType::Bool]
}

/// `fn(elem) -> (any, any)`
pub fn is_pair_mapper_of(signature: &Signature, elem: &ValueType) -> bool {
    signature.params() == [elem.clone()] && signature.results().len() == 2
}

/// `fn(key, value) -> (any, any)`
pub fn is_entry_mapper_of(signature: &Signature, key: &ValueType, value: &ValueType) -> bool {
    signature.params() == [key.clone(), value.clone()] && signature.results().len() == 2
}

/// Returns true if `ty` is a list of `elem`.
pub fn is_list_of(ty: &ValueType, elem: &ValueType) -> bool {
    ty.elem() == Some(elem)
}

/// Returns true if `ty` is a map from `key` to `value`.
pub fn is_map_of(ty: &ValueType, key: &ValueType, value: &ValueType) -> bool {
    ty.entry() == Some((key, value))
}

/// Returns true if the descriptor can seed a custom source.
pub fn is_valid_hint(hint: &ValueType) -> bool {
    !hint.contains_nil()
}

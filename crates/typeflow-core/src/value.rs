//! Dynamic values flowing through pipelines.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::convert::IntoValue;
use crate::error::{Result, StreamError};
use crate::value_type::{Kind, ValueType};

/// A value whose type is only known at runtime.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of a value.
    Nil,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    String(Arc<str>),
    /// Homogeneous, ordered sequence.
    List(List),
    /// Homogeneous key/value mapping in insertion order.
    Map(Map),
    /// Named field set, shared on clone.
    Record(Record),
}

// Floats compare by bit pattern so equality agrees with Hash.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::List(v) => v.hash(state),
            Value::Map(v) => v.hash(state),
            Value::Record(v) => v.hash(state),
        }
    }
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Returns the runtime descriptor of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Nil => ValueType::Nil,
            Value::Bool(_) => ValueType::Bool,
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F64(_) => ValueType::F64,
            Value::String(_) => ValueType::String,
            Value::List(list) => ValueType::list(list.elem_type().clone()),
            Value::Map(map) => ValueType::map(map.key_type().clone(), map.value_type().clone()),
            Value::Record(record) => ValueType::Record(record.name.clone()),
        }
    }

    pub fn kind(&self) -> Kind {
        self.value_type().kind()
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract an integer, widening `I32`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            Value::I32(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::List(list) => {
                f.write_str("[")?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Record(record) => {
                write!(f, "{} {{", record.name())?;
                for (i, (name, value)) in record.fields().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {}: {}", name, value)?;
                }
                f.write_str(" }")
            }
        }
    }
}

// Order-independent hash, consistent with map equality.
fn unordered_hash<T: Hash>(items: impl Iterator<Item = T>) -> u64 {
    items
        .map(|item| {
            let mut hasher = DefaultHasher::new();
            item.hash(&mut hasher);
            hasher.finish()
        })
        .fold(0u64, u64::wrapping_add)
}

/// An ordered sequence whose element type is fixed, even when empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct List {
    elem: ValueType,
    items: Vec<Value>,
}

impl List {
    pub fn new(elem: ValueType) -> Self {
        Self {
            elem,
            items: Vec::new(),
        }
    }

    pub fn with_capacity(elem: ValueType, capacity: usize) -> Self {
        Self {
            elem,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Builds a list from typed Rust items.
    pub fn from_items<T: IntoValue>(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            elem: T::value_type(),
            items: items.into_iter().map(IntoValue::into_value).collect(),
        }
    }

    /// Builds a list, checking that every item has the declared element type.
    pub fn try_from_values(
        elem: ValueType,
        items: impl IntoIterator<Item = Value>,
    ) -> Result<Self> {
        let items: Vec<Value> = items.into_iter().collect();
        if let Some(bad) = items.iter().find(|item| item.value_type() != elem) {
            return Err(StreamError::conversion(elem, bad.value_type()));
        }
        Ok(Self { elem, items })
    }

    pub fn elem_type(&self) -> &ValueType {
        &self.elem
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Appends without checking the item type.
    ///
    /// Callers are responsible for pushing values of the element type.
    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A key/value mapping with fixed key and value types.
///
/// Entries keep insertion order; inserting an existing key replaces its value
/// in place.
#[derive(Debug, Clone)]
pub struct Map {
    key: ValueType,
    value: ValueType,
    entries: IndexMap<Value, Value>,
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value && self.entries == other.entries
    }
}

impl Eq for Map {}

impl Hash for Map {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.value.hash(state);
        self.entries.len().hash(state);
        unordered_hash(self.entries.iter()).hash(state);
    }
}

impl Map {
    pub fn new(key: ValueType, value: ValueType) -> Self {
        Self {
            key,
            value,
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(key: ValueType, value: ValueType, capacity: usize) -> Self {
        Self {
            key,
            value,
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Builds a map from typed Rust pairs.
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: IntoValue,
        V: IntoValue,
    {
        Self {
            key: K::value_type(),
            value: V::value_type(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect(),
        }
    }

    /// Builds a map, checking every key and value against the declared types.
    pub fn try_from_values(
        key: ValueType,
        value: ValueType,
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Result<Self> {
        let mut map = Map::new(key, value);
        for (k, v) in entries {
            if k.value_type() != map.key {
                return Err(StreamError::conversion(map.key.clone(), k.value_type()));
            }
            if v.value_type() != map.value {
                return Err(StreamError::conversion(map.value.clone(), v.value_type()));
            }
            map.entries.insert(k, v);
        }
        Ok(map)
    }

    pub fn key_type(&self) -> &ValueType {
        &self.key
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Value, Value> {
        self.entries.iter()
    }

    /// Inserts without checking types. Returns the replaced value, if any.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn into_entries(self) -> indexmap::map::IntoIter<Value, Value> {
        self.entries.into_iter()
    }
}

/// A named set of fields.
///
/// Cloning a record shares its fields; records are the dynamic stand-in for
/// references to user structs.
#[derive(Debug, Clone)]
pub struct Record {
    name: Arc<str>,
    fields: Arc<IndexMap<Arc<str>, Value>>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
            || (self.name == other.name && self.fields == other.fields)
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        unordered_hash(self.fields.iter()).hash(state);
    }
}

impl Record {
    pub fn builder(name: impl Into<Arc<str>>) -> RecordBuilder {
        RecordBuilder {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        ValueType::Record(self.name.clone())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns a field value or a `MissingField` error.
    pub fn require(&self, field: &str) -> Result<Value> {
        self.fields
            .get(field)
            .cloned()
            .ok_or_else(|| StreamError::MissingField {
                record: self.name.to_string(),
                field: field.to_string(),
            })
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_ref(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    name: Arc<str>,
    fields: IndexMap<Arc<str>, Value>,
}

impl RecordBuilder {
    pub fn field(mut self, name: impl Into<Arc<str>>, value: impl IntoValue) -> Self {
        self.fields.insert(name.into(), value.into_value());
        self
    }

    pub fn value(mut self, name: impl Into<Arc<str>>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn build(self) -> Record {
        Record {
            name: self.name,
            fields: Arc::new(self.fields),
        }
    }
}

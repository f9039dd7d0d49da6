//! Runtime type descriptors.

use std::fmt;
use std::sync::Arc;

/// Coarse structural kind of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Nil,
    Bool,
    Int,
    Float,
    String,
    List,
    Map,
    Record,
}

/// Describes what flows through a pipeline at a given point.
///
/// Two descriptors are compatible only when they are equal; container
/// descriptors compare their element types structurally and record
/// descriptors compare by record name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Nil,
    Bool,
    I32,
    I64,
    F64,
    String,
    List(Box<ValueType>),
    Map(Box<ValueType>, Box<ValueType>),
    Record(Arc<str>),
}

impl ValueType {
    pub fn list(elem: ValueType) -> Self {
        ValueType::List(Box::new(elem))
    }

    pub fn map(key: ValueType, value: ValueType) -> Self {
        ValueType::Map(Box::new(key), Box::new(value))
    }

    pub fn record(name: impl Into<Arc<str>>) -> Self {
        ValueType::Record(name.into())
    }

    pub fn kind(&self) -> Kind {
        match self {
            ValueType::Nil => Kind::Nil,
            ValueType::Bool => Kind::Bool,
            ValueType::I32 | ValueType::I64 => Kind::Int,
            ValueType::F64 => Kind::Float,
            ValueType::String => Kind::String,
            ValueType::List(_) => Kind::List,
            ValueType::Map(_, _) => Kind::Map,
            ValueType::Record(_) => Kind::Record,
        }
    }

    /// Element type of a list descriptor.
    pub fn elem(&self) -> Option<&ValueType> {
        match self {
            ValueType::List(elem) => Some(elem),
            _ => None,
        }
    }

    /// Key and value types of a map descriptor.
    pub fn entry(&self) -> Option<(&ValueType, &ValueType)> {
        match self {
            ValueType::Map(key, value) => Some((key, value)),
            _ => None,
        }
    }

    /// Returns true if this descriptor is `Nil` or contains `Nil` anywhere.
    pub fn contains_nil(&self) -> bool {
        match self {
            ValueType::Nil => true,
            ValueType::List(elem) => elem.contains_nil(),
            ValueType::Map(key, value) => key.contains_nil() || value.contains_nil(),
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Nil => f.write_str("nil"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::I32 => f.write_str("i32"),
            ValueType::I64 => f.write_str("i64"),
            ValueType::F64 => f.write_str("f64"),
            ValueType::String => f.write_str("string"),
            ValueType::List(elem) => write!(f, "list<{}>", elem),
            ValueType::Map(key, value) => write!(f, "map<{}, {}>", key, value),
            ValueType::Record(name) => write!(f, "record<{}>", name),
        }
    }
}

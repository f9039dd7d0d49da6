//! Error types for typeflow

use std::fmt;

use thiserror::Error;

use crate::func::Signature;
use crate::value_type::ValueType;

/// The kind of stage whose function failed a shape check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Filter,
    Map,
    Resolve,
    EntryFilter,
    FilterKey,
    FilterValue,
    MapKey,
    MapValue,
    MapEntry,
    /// Sequence to entry bridge with a `(key, value)` projector.
    PairProjection,
    /// Sequence to entry bridge using the element as key.
    KeyProjection,
}

impl StageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Filter => "filter",
            StageKind::Map => "map",
            StageKind::Resolve => "resolve",
            StageKind::EntryFilter => "entry_filter",
            StageKind::FilterKey => "filter_key",
            StageKind::FilterValue => "filter_value",
            StageKind::MapKey => "map_key",
            StageKind::MapValue => "map_value",
            StageKind::MapEntry => "map_entry",
            StageKind::PairProjection => "to_entry_stream",
            StageKind::KeyProjection => "as_map_key",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for typeflow operations.
///
/// Errors are cloneable: a pipeline stores the first failure and hands out
/// copies of it to every later call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The source value is not the container kind the constructor expects.
    #[error("source is not {expected}, found {found}")]
    Shape {
        expected: &'static str,
        found: ValueType,
    },

    /// A custom source was built without a usable element type hint.
    #[error("custom source requires a valid element type hint")]
    NilHint,

    /// A stage function's signature does not fit the current element type.
    #[error("{stage} stage expects {expected}, found {found}")]
    StageShape {
        stage: StageKind,
        expected: String,
        found: Signature,
    },

    /// A collect destination does not match the pipeline's output type.
    #[error("destination type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ValueType,
        found: ValueType,
    },

    /// A terminal call was repeated on a pipeline configured to reject reuse.
    #[error("stream has already been consumed")]
    Consumed,

    /// A value did not have the type its consumer declared.
    #[error("value conversion failed: expected {expected}, found {found}")]
    Conversion {
        expected: ValueType,
        found: ValueType,
    },

    /// A function body returned the wrong number of values.
    #[error("function returned {found} values, expected {expected}")]
    Arity { expected: usize, found: usize },

    /// A record lacks a field its consumer requires.
    #[error("record {record} has no field {field}")]
    MissingField { record: String, field: String },

    /// A cursor broke the advance/current contract.
    #[error("cursor contract violated: {0}")]
    Cursor(String),
}

impl StreamError {
    pub(crate) fn conversion(expected: ValueType, found: ValueType) -> Self {
        StreamError::Conversion { expected, found }
    }
}

/// Result type alias for typeflow operations
pub type Result<T> = std::result::Result<T, StreamError>;

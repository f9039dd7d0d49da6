//! typeflow - deferred, type-checked collection pipelines in Rust
//!
//! Build a pipeline over a list or map, append filter/map stages that are
//! checked against the current element type, then collect.
//!
//! # Example
//!
//! ```rust
//! use typeflow::prelude::*;
//!
//! let out = typeflow::sequence(Value::List(List::from_items(0i64..=6)))
//!     .as_map_key(|n: i64| n.to_string())
//!     .filter(|_k: i64, v: String| v != "6")
//!     .collect()
//!     .unwrap();
//!
//! assert_eq!(out.as_map().map(Map::len), Some(6));
//! ```

// User-facing derive
pub use typeflow_macros::Record;

// Value model
pub use typeflow_core::{
    check, FromValue, IntoFunc, IntoValue, Kind, List, Map, Record, RecordBuilder, Result, Signature,
    StageKind, StreamError, Typed, Value, ValueType,
};
pub use typeflow_core::{Args, Func};

// Pipelines
pub use typeflow_stream::{
    source, Cursor, EntryCursor, EntryResolver, EntryStream, FnEntryResolver, FnResolver,
    Resolver, SequenceStream, Values,
};

// Configuration
pub use typeflow_config::{ConfigError, ReusePolicy, StreamConfig, MAX_PREALLOC};

#[cfg(feature = "console")]
pub use typeflow_console as console;

/// Starts a sequence pipeline over a list value.
pub fn sequence(value: Value) -> SequenceStream {
    SequenceStream::from_sequence(value)
}

/// Starts an entry pipeline over a map value.
pub fn mapping(value: Value) -> EntryStream {
    EntryStream::from_mapping(value)
}

/// Internal types for macro-generated code. Do not use directly.
#[doc(hidden)]
pub mod __internal {
    pub use typeflow_core::{
        FromValue, IntoValue, Record, Result, StreamError, Typed, Value, ValueType,
    };
}

pub mod prelude {
    pub use super::Record;
    pub use super::{FromValue, IntoFunc, IntoValue, Typed};
    pub use super::{List, Map, Value, ValueType};
    pub use super::{EntryStream, SequenceStream};
    pub use super::{ReusePolicy, StreamConfig, StreamError};
}

//! Deferred, type-checked collection pipelines.
//!
//! A [`SequenceStream`] wraps a sequence source and an ordered list of
//! stages. Every stage is checked against the element type left by the
//! previous stage when it is appended; nothing is evaluated until a terminal
//! call (`collect`, `collect_into`, ...) pulls elements through the chain.
//! [`EntryStream`] is the keyed analogue over mappings.
//!
//! Append and construction failures are sticky: the stream keeps the first
//! error and every later call returns it, so a chain only needs to be checked
//! once at the end.
//!
//! ```
//! use typeflow_core::{Value, List};
//! use typeflow_stream::SequenceStream;
//!
//! let words = List::from_items(["1", "2", "3", "4", "55", "6"]);
//! let squares: Vec<i64> = SequenceStream::from_sequence(Value::List(words))
//!     .filter(|s: String| s.len() < 2)
//!     .map(|s: String| {
//!         let n: i64 = s.parse().unwrap_or(0);
//!         n * n
//!     })
//!     .collect_as()
//!     .unwrap();
//!
//! assert_eq!(squares, vec![1, 4, 9, 16, 36]);
//! ```

mod collect;
mod entry;
mod pipeline;
mod resolve;
mod sequence;
pub mod source;
mod state;

pub use collect::Values;
pub use entry::EntryStream;
pub use resolve::{EntryResolver, FnEntryResolver, FnResolver, Resolver};
pub use sequence::SequenceStream;
pub use source::{Cursor, EntryCursor, EntrySource, IterCursor, ListCursor, MapCursor, SequenceSource};
pub use typeflow_config::{ReusePolicy, StreamConfig};

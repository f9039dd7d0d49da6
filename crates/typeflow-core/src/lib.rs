//! Runtime value model for typeflow pipelines.
//!
//! Pipelines operate on [`Value`]s whose shape is described at runtime by a
//! [`ValueType`]. Functions handed to a pipeline are [`Func`]s: a declared
//! [`Signature`] plus a type-erased body. Ordinary closures become `Func`s
//! through [`IntoFunc`], which reads the signature off the closure's argument
//! and return types.
//!
//! The [`check`] module answers whether a function fits the element type
//! currently flowing through a pipeline.

pub mod check;
mod convert;
mod error;
mod func;
mod value;
mod value_type;


pub use convert::{FromValue, IntoValue, Typed};
pub use error::{Result, StageKind, StreamError};
pub use func::{marker, Args, Func, IntoFunc, Signature};
pub use value::{List, Map, Record, RecordBuilder, Value};
pub use value_type::{Kind, ValueType};

//! Shared test fixtures for typeflow crates.
//!
//! This crate provides input values and small cursors for testing.
//! It depends only on `typeflow-core` so any crate can take it as a
//! dev-dependency.
//!
//! - [`sequences`] - list values of strings and integers
//! - [`mappings`] - map values keyed by integers
//! - [`people`] - `Person` records
//! - [`cursors`] - caller-side cursors, including misbehaving ones
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! typeflow-test = { workspace = true }
//! ```
//!
//! ```
//! use typeflow_test::sequences::digit_strings;
//!
//! let list = digit_strings();
//! assert_eq!(list.as_list().unwrap().len(), 6);
//! ```

pub mod cursors;
pub mod mappings;
pub mod people;
pub mod sequences;

pub use people::{people, people_list, person, Person, PERSON};

//! # dynjson
//!
//! JSON codec for a dynamically-typed runtime value model.
//!
//! The two halves are independent: [`parse`] turns interchange text into a
//! [`Value`] graph (optionally passing every member through a *reviver*),
//! and [`stringify`] turns a graph back into text (optionally substituting
//! values through a *replacer*, honouring `toJSON` conversion methods and
//! getters, and pretty-printing with an indent unit).
//!
//! The parser never recurses: it runs an explicit frame stack, so arbitrarily
//! deep input costs heap memory proportional to its depth and nothing more.
//! The serializer rejects circular graphs with a `TypeError`-kind error.
//!
//! ## Quick start
//!
//! ```rust
//! use dynjson::{parse, stringify, stringify_with};
//!
//! let value = parse(r#"{"name":"Alice","scores":[95,87]}"#).unwrap();
//! assert_eq!(
//!     stringify(&value).unwrap().as_deref(),
//!     Some(r#"{"name":"Alice","scores":[95,87]}"#)
//! );
//!
//! let pretty = stringify_with(&value, None, 2).unwrap().unwrap();
//! assert!(pretty.starts_with("{\n  \"name\": \"Alice\""));
//! ```
//!
//! ## Modules
//!
//! - [`parser`]: text → value, with reviver support
//! - [`serializer`]: value → text, with replacer and indentation support
//! - [`value`]: the runtime value model (`Value`, `ObjectRef`, `ArrayRef`, `Callable`)
//! - [`format`]: escape table and number formatting
//! - [`options`]: `ParseOptions`, `StringifyOptions`, `Space`
//! - [`builtin`]: the `JSON` object surface (`parse`/`stringify` as callables)
//! - [`interop`]: conversions to and from `serde_json::Value`
//! - [`error`]: error types

pub mod builtin;
pub mod error;
pub mod format;
pub mod interop;
mod lexer;
pub mod options;
pub mod parser;
pub mod serializer;
pub mod value;

pub use error::{Error, Result, SyntaxErrorKind};
pub use interop::to_serde;
pub use options::{ParseOptions, Space, StringifyOptions};
pub use parser::{parse, parse_units, parse_with, parse_with_reviver};
pub use serializer::{stringify, stringify_with, stringify_with_options};
pub use value::{ArrayRef, Callable, JsString, ObjectRef, Property, Value};

//! A format-agnostic object-graph (de)serialization engine: walks an
//! in-memory object graph, classifies each value, dispatches to a
//! registered type handler, preserves object identity as references where
//! the graph shares structure, and resolves those references back on the
//! way in — with a pluggable wire format at the boundary.
//!
//! The [`driver::Driver`] is the entry point: build one from a
//! [`formatter::FormatterSettings`], register a handler per concrete type
//! via [`driver::Driver::register`], then call [`driver::Driver::serialize`]
//! / [`driver::Driver::deserialize`] against a [`value::Value`] document
//! tree. [`json::JsonCodec`] converts that tree to and from bytes; other
//! wire formats plug in the same way via [`codec::Codec`].
#![deny(rust_2018_compatibility)]
#![deny(rust_2018_idioms)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod capability;
pub mod codec;
pub mod driver;
pub mod error;
pub mod formatter;
pub mod handlers;
pub mod identity;
pub mod impls;
pub mod json;
pub mod path;
pub mod reference;
pub mod registry;
pub mod route;
pub mod semantics;
pub mod value;

pub use capability::{Classification, FromDocument, GraphRef, GraphValue, ToDocument, Versioned};
pub use driver::{resolve_reference, Driver};
pub use error::{GraphError, GraphResult};
pub use formatter::FormatterSettings;
pub use reference::PreservedReference;
pub use value::{Mapping, Value};

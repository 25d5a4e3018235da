//! Type handlers bundled with the engine (spec. §6 "Handler API").
//!
//! A handler is just a pair of closures registered with a
//! [`crate::driver::Driver`] — this module holds the ones every driver gets
//! for free, plus the small reusable traits (`EnumLike`) a caller's own
//! types can implement to get a handler generated for them.

pub mod builtin;

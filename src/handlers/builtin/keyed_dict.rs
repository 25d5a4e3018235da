//! The keyed-dict wrapper shape: how a mapping with non-attribute-eligible
//! keys is carried across formats that can only key by string (spec. §3
//! "AutoKeySerializableDictType", §6 supplemented feature from the
//! original's `KeySerializableDict`).
//!
//! The encoding itself — `{KSD_KEY: [[key_doc, value_doc], ...]}` — needs
//! the driver's own recursive serialize/deserialize to build and unwrap its
//! pairs, so unlike the other builtin handlers this module contributes no
//! registry entry; it only names the wire constant
//! [`crate::driver::Driver`] encodes and decodes directly.

/// The reserved mapping key a keyed-dict wrapper is carried under.
pub const KSD_KEY: &str = "__ksd__";

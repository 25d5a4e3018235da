//! The format boundary: converts between the engine's [`Value`] tree and a
//! concrete wire representation (spec. §6 "the path↔string conversion" and
//! its document-level counterpart).
//!
//! Grounded on the teacher's own format plug-ins (`json_core.rs`,
//! `postcard.rs`): a small trait implemented once per wire format, used by
//! callers alongside a [`crate::driver::Driver`] rather than by the driver
//! itself — the driver only ever speaks [`Value`].

use crate::value::Value;

/// A wire format capable of encoding/decoding a [`Value`] document tree.
pub trait Codec {
    /// This codec's failure mode.
    type Error: std::error::Error + 'static;

    /// Encode `value` to this format's bytes.
    fn encode(&self, value: &Value) -> Result<Vec<u8>, Self::Error>;

    /// Decode this format's bytes back to a [`Value`].
    fn decode(&self, bytes: &[u8]) -> Result<Value, Self::Error>;
}

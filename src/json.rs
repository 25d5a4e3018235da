//! JSON codec built on `serde_json`, replacing the teacher's `json_core`
//! plug-in (spec. §5.4 module layout: `src/json.rs`).

use serde_json::Number;

use crate::codec::Codec;
use crate::value::{Mapping, Value};

/// The JSON wire format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    type Error = serde_json::Error;

    fn encode(&self, value: &Value) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&to_json(value))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, Self::Error> {
        let parsed: serde_json::Value = serde_json::from_slice(bytes)?;
        Ok(from_json(parsed))
    }
}

/// Convert an engine [`Value`] to a `serde_json::Value`.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => Number::from_f64(*f).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Seq(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping.iter() {
                object.insert(key.clone(), to_json(value));
            }
            serde_json::Value::Object(object)
        }
    }
}

/// Convert a `serde_json::Value` to an engine [`Value`]. Numbers that carry
/// no integral representation fall back to [`Value::Float`]; this is a
/// lossy direction only for numbers wider than `i64`/`f64`, which JSON
/// itself does not distinguish from ordinary numbers either.
pub fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Seq(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(object) => {
            let mut mapping = Mapping::new();
            for (key, value) in object {
                mapping.insert(key, from_json(value));
            }
            Value::Map(mapping)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json_bytes() {
        let mut mapping = Mapping::new();
        mapping.insert("a", Value::Int(1));
        mapping.insert("b", Value::Seq(vec![Value::Bool(true), Value::Null]));
        let value = Value::Map(mapping);

        let codec = JsonCodec;
        let bytes = codec.encode(&value).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn floats_survive_the_json_number_boundary() {
        let value = Value::Float(2.5);
        let codec = JsonCodec;
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }
}

//! [`GraphValue`] implementations for the handful of concrete Rust types
//! the engine treats as PRIMITIVE or SPECIAL natively, plus the two
//! structural wrapper types (`List`, `Dict`) callers use to build a native
//! document-shaped graph by hand. Grounded on the teacher's own blanket
//! `impl TreeSchema for $ty` pattern in `impls.rs`/`impls/`, generalized
//! from compile-time tree reflection to this engine's dynamic dispatch.

use std::any::Any;
use std::rc::Rc;

use crate::capability::{AttrKey, Classification, GraphRef, GraphValue, Special};
use crate::value::Value;

macro_rules! impl_primitive {
    ($ty:ty, $name:literal, $variant:expr) => {
        impl GraphValue for $ty {
            fn type_name(&self) -> &'static str {
                $name
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn classify(&self) -> Classification {
                Classification::Primitive($variant(self.clone()))
            }
        }
    };
}

impl_primitive!(bool, "bool", Value::Bool);
impl_primitive!(i64, "i64", Value::Int);
impl_primitive!(f64, "f64", Value::Float);
impl_primitive!(String, "String", Value::String);

/// The null value.
///
/// Classified as OBJECT rather than PRIMITIVE, despite `Value::Null` being
/// a primitive document value: `Null` needs identity-cache eviction after
/// its first check-in (spec. §4.3 "the NoneType handler explicitly deletes
/// any cached entry for the sentinel null identity to avoid cross-graph
/// reuse") and a registered handler that tags it `"NoneType"`
/// (`handlers::builtin::none`), neither of which apply to real primitives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Null;

impl GraphValue for Null {
    fn type_name(&self) -> &'static str {
        "NoneType"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evict_identity_after_checkin(&self) -> bool {
        true
    }
}

/// A native ordered sequence of graph values (spec. §3 "SPECIAL").
#[derive(Clone, Default)]
pub struct List(pub Vec<GraphRef>);

impl List {
    /// An empty list.
    pub fn new() -> Self {
        List(Vec::new())
    }
}

impl FromIterator<GraphRef> for List {
    fn from_iter<T: IntoIterator<Item = GraphRef>>(iter: T) -> Self {
        List(iter.into_iter().collect())
    }
}

impl GraphValue for List {
    fn type_name(&self) -> &'static str {
        "List"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn classify(&self) -> Classification {
        Classification::Special(Special::Seq(self.0.clone()))
    }
}

/// A native keyed mapping of graph values (spec. §3 "SPECIAL"). Keys are
/// themselves graph values; [`attr_key_for`] decides whether a given key
/// is ATTRIBUTE-eligible (a bare primitive string or integer) or must go
/// through the keyed-dict wrapper (spec. §3
/// "AutoKeySerializableDictType").
#[derive(Clone, Default)]
pub struct Dict(pub Vec<(GraphRef, GraphRef)>);

impl Dict {
    /// An empty mapping.
    pub fn new() -> Self {
        Dict(Vec::new())
    }
}

impl FromIterator<(GraphRef, GraphRef)> for Dict {
    fn from_iter<T: IntoIterator<Item = (GraphRef, GraphRef)>>(iter: T) -> Self {
        Dict(iter.into_iter().collect())
    }
}

impl GraphValue for Dict {
    fn type_name(&self) -> &'static str {
        "Dict"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn classify(&self) -> Classification {
        let pairs = self
            .0
            .iter()
            .map(|(k, v)| (attr_key_for(k), Rc::clone(v)))
            .collect();
        Classification::Special(Special::Map(pairs))
    }
}

/// Classify `key` as an ATTRIBUTE (bare string/integer) or an opaque,
/// non-attribute key requiring the keyed-dict wrapper.
pub fn attr_key_for(key: &GraphRef) -> AttrKey {
    match key.classify() {
        Classification::Primitive(v @ Value::String(_)) => AttrKey::Attribute(v),
        Classification::Primitive(v @ Value::Int(_)) => AttrKey::Attribute(v),
        _ => AttrKey::Key(Rc::clone(key)),
    }
}

/// Convenience constructor for a `GraphRef` around any concrete
/// [`GraphValue`].
pub fn wrap<T: GraphValue + 'static>(value: T) -> GraphRef {
    Rc::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_classification_round_trips_into_value() {
        let five: GraphRef = wrap(5i64);
        match five.classify() {
            Classification::Primitive(Value::Int(5)) => {}
            _ => panic!("expected Primitive(Int(5))"),
        }
    }

    #[test]
    fn dict_keys_classify_by_eligibility() {
        let string_key: GraphRef = wrap("k".to_string());
        let list_key: GraphRef = wrap(List::new());
        assert!(matches!(attr_key_for(&string_key), AttrKey::Attribute(Value::String(_))));
        assert!(matches!(attr_key_for(&list_key), AttrKey::Key(_)));
    }
}

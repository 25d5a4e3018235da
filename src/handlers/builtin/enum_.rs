//! A reusable handler generator for simple, C-like enums (spec. §8
//! scenario 6): each variant round-trips as `{"__class__": "<EnumName>",
//! "state": "<VARIANT>"}`.
//!
//! Unlike [`crate::impls::Null`] or `Optional`, there is no single Rust
//! type representing "any enum" — every concrete enum a caller defines
//! needs its own class tag and its own deserialize path. [`register`] is a
//! generic function, not a type, for exactly that reason: a caller calls it
//! once per enum type, not once per engine.

use std::any::TypeId;
use std::rc::Rc;

use crate::capability::GraphRef;
use crate::driver::Driver;
use crate::error::GraphError;

/// A simple, C-like enum whose members are identified purely by name.
pub trait EnumLike: Sized {
    /// This variant's name, as it appears on the wire.
    fn variant_name(&self) -> &'static str;

    /// Reconstruct a variant from its wire name, if `name` names one.
    fn from_variant_name(name: &str) -> Option<Self>;
}

const STATE_FIELD: &str = "state";

/// Register `T`'s handler under `class_name`.
pub fn register<T>(driver: &mut Driver, class_name: &'static str)
where
    T: EnumLike + crate::capability::GraphValue + 'static,
{
    driver.register(
        TypeId::of::<T>(),
        class_name,
        |obj, _route| {
            let value = obj
                .as_any()
                .downcast_ref::<T>()
                .expect("handler invoked for the TypeId it was registered under");
            Ok(vec![(
                STATE_FIELD.to_string(),
                Rc::new(value.variant_name().to_string()) as GraphRef,
            )])
        },
        move |fields, _route| {
            let state = fields
                .iter()
                .find(|(name, _)| name == STATE_FIELD)
                .and_then(|(_, value)| value.as_any().downcast_ref::<String>())
                .cloned()
                .ok_or_else(|| GraphError::InvalidDocument {
                    path: String::new(),
                    reason: format!("`{class_name}` document missing `state` field"),
                })?;
            let value = T::from_variant_name(&state).ok_or_else(|| GraphError::InvalidDocument {
                path: String::new(),
                reason: format!("`{class_name}` has no variant named `{state}`"),
            })?;
            Ok(Rc::new(value) as GraphRef)
        },
    );
}

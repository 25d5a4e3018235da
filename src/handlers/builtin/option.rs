//! The `Optional` handler: a presence-or-absence wrapper around any other
//! graph value, for callers building a native graph by hand who want an
//! explicit optional field distinct from [`crate::impls::Null`] itself
//! (spec. §6 supplemented feature: optional fields round-trip as an
//! object carrying zero or one child, not as a bare null).

use std::any::{Any, TypeId};
use std::rc::Rc;

use crate::capability::{GraphRef, GraphValue};
use crate::driver::Driver;

/// An optional graph value: `Some(value)` or `None`.
#[derive(Clone)]
pub struct Optional(pub Option<GraphRef>);

impl Optional {
    /// A present value.
    pub fn some(value: GraphRef) -> Self {
        Optional(Some(value))
    }

    /// An absent value.
    pub fn none() -> Self {
        Optional(None)
    }
}

impl GraphValue for Optional {
    fn type_name(&self) -> &'static str {
        "Optional"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

const VALUE_FIELD: &str = "value";

pub fn register(driver: &mut Driver) {
    driver.register(
        TypeId::of::<Optional>(),
        "Optional",
        |obj, _route| {
            let optional = obj
                .as_any()
                .downcast_ref::<Optional>()
                .expect("registered under Optional's own TypeId");
            Ok(match &optional.0 {
                Some(value) => vec![(VALUE_FIELD.to_string(), Rc::clone(value))],
                None => Vec::new(),
            })
        },
        |mut fields, _route| {
            let value = fields
                .iter()
                .position(|(name, _)| name == VALUE_FIELD)
                .map(|idx| fields.swap_remove(idx).1);
            Ok(Rc::new(Optional(value)) as GraphRef)
        },
    );
}

//! The `Date` handler: an ISO-8601 date/time value represented at the
//! document level as a single string field, the way the original engine's
//! date support does (spec. §6 supplemented feature). No time-zone or
//! calendar arithmetic lives here; this is a wire-shape adapter, not a
//! clock.

use std::any::{Any, TypeId};
use std::rc::Rc;

use crate::capability::{GraphRef, GraphValue};
use crate::driver::Driver;
use crate::error::GraphError;

/// An ISO-8601 date/time, carried as its formatted string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateValue(pub String);

impl GraphValue for DateValue {
    fn type_name(&self) -> &'static str {
        "Date"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

const ISO_FIELD: &str = "iso";

pub fn register(driver: &mut Driver) {
    driver.register(
        TypeId::of::<DateValue>(),
        "Date",
        |obj, _route| {
            let date = obj
                .as_any()
                .downcast_ref::<DateValue>()
                .expect("registered under DateValue's own TypeId");
            Ok(vec![(ISO_FIELD.to_string(), Rc::new(date.0.clone()) as GraphRef)])
        },
        |fields, _route| {
            let iso = fields
                .iter()
                .find(|(name, _)| name == ISO_FIELD)
                .and_then(|(_, value)| value.as_any().downcast_ref::<String>())
                .cloned()
                .ok_or_else(|| GraphError::InvalidDocument {
                    path: String::new(),
                    reason: "Date document missing `iso` field".to_string(),
                })?;
            Ok(Rc::new(DateValue(iso)) as GraphRef)
        },
    );
}

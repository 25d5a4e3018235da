//! The `NoneType` handler: tags [`crate::impls::Null`] so it round-trips
//! through the handler registry rather than through
//! [`crate::capability::Classification::Primitive`] (see the doc comment on
//! `Null` for why).

use std::any::TypeId;
use std::rc::Rc;

use crate::capability::GraphRef;
use crate::driver::Driver;
use crate::impls::Null;

pub fn register(driver: &mut Driver) {
    driver.register(
        TypeId::of::<Null>(),
        "NoneType",
        |_obj, _route| Ok(Vec::new()),
        |_fields, _route| Ok(Rc::new(Null) as GraphRef),
    );
}

//! Handlers registered on every fresh [`crate::driver::Driver`] (spec. §5.4
//! module layout: `handlers::builtin`).

pub mod date;
pub mod enum_;
pub mod keyed_dict;
pub mod none;
pub mod option;

use crate::driver::Driver;

/// Register every bundled handler onto `driver`. Called once from
/// [`Driver::new`]; a caller never calls this directly.
pub fn register_all(driver: &mut Driver) {
    none::register(driver);
    option::register(driver);
    date::register(driver);
}

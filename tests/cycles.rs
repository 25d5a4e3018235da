//! Self-referential graphs: `o.x = o` must round-trip without the driver
//! looping forever or losing the cycle.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use objgraph::capability::Fields;
use objgraph::route::Route;
use objgraph::{resolve_reference, Driver, FormatterSettings, FromDocument, GraphRef, GraphResult, GraphValue, ToDocument};

struct SelfRef {
    x: RefCell<GraphRef>,
}

impl GraphValue for SelfRef {
    fn type_name(&self) -> &'static str {
        "SelfRef"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ToDocument for SelfRef {
    fn to_document(&self, _route: &mut Route) -> GraphResult<Fields> {
        Ok(vec![("x".to_string(), self.x.borrow().clone())])
    }
}

impl FromDocument for SelfRef {
    fn from_document(fields: Fields, _route: &mut Route) -> GraphResult<Self> {
        let x = fields.into_iter().find(|(name, _)| name == "x").unwrap().1;
        Ok(SelfRef { x: RefCell::new(x) })
    }
}

fn make_driver() -> Driver {
    let mut driver = Driver::new(FormatterSettings::default());
    driver.register_type::<SelfRef>("SelfRef");
    driver
}

#[test]
fn cycle_round_trips_and_the_restored_object_points_at_itself() {
    let driver = make_driver();

    let o = Rc::new(SelfRef {
        x: RefCell::new(Rc::new(0i64) as GraphRef),
    });
    *o.x.borrow_mut() = Rc::clone(&o) as GraphRef;
    let o: GraphRef = o;

    let doc = driver.serialize(&o).unwrap();

    let root = doc.as_map().expect("root document is a mapping");
    assert_eq!(root.get("__class__").and_then(|v| v.as_str()), Some("SelfRef"));
    let x_doc = root.get("x").expect("x field present");
    let x_map = x_doc.as_map().expect("x is wrapped as a reference");
    assert_eq!(x_map.get("ref").and_then(|v| v.as_str()), Some(""));

    let restored = driver.deserialize(doc).unwrap();
    let restored_self = restored.as_any().downcast_ref::<SelfRef>().unwrap();
    let resolved_x = resolve_reference(&restored_self.x.borrow()).expect("circular reference resolves by finalization");
    assert!(Rc::ptr_eq(&resolved_x, &restored));
}

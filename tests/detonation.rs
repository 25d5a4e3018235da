//! A reference to a path that never materializes: with detonation active
//! the traversal fails outright; with it cleared, the dangling placeholder
//! simply survives as an unresolved reference.

use std::any::Any;
use std::cell::RefCell;

use objgraph::capability::Fields;
use objgraph::route::Route;
use objgraph::semantics::Semantic;
use objgraph::{
    resolve_reference, Driver, FormatterSettings, FromDocument, GraphError, GraphRef, GraphResult, GraphValue, Mapping,
    ToDocument, Value,
};

struct Holder {
    x: RefCell<GraphRef>,
}

impl GraphValue for Holder {
    fn type_name(&self) -> &'static str {
        "Holder"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ToDocument for Holder {
    fn to_document(&self, _route: &mut Route) -> GraphResult<Fields> {
        Ok(vec![("x".to_string(), self.x.borrow().clone())])
    }
}

impl FromDocument for Holder {
    fn from_document(fields: Fields, _route: &mut Route) -> GraphResult<Self> {
        let x = fields.into_iter().find(|(name, _)| name == "x").unwrap().1;
        Ok(Holder { x: RefCell::new(x) })
    }
}

fn dangling_document() -> Value {
    let mut inner = Mapping::new();
    inner.insert("ref", Value::String("/nonexistent".to_string()));
    let mut mapping = Mapping::new();
    mapping.insert("__class__", Value::String("Holder".to_string()));
    mapping.insert("x", Value::Map(inner));
    Value::Map(mapping)
}

#[test]
fn detonate_set_fails_finalization_on_a_dangling_reference() {
    let mut driver = Driver::new(FormatterSettings::default());
    driver.register_type::<Holder>("Holder");

    let err = driver.deserialize(dangling_document()).unwrap_err();
    assert_eq!(err, GraphError::PreservedReferenceNotDissolved { count: 1 });
}

#[test]
fn detonate_cleared_leaves_the_placeholder_pending() {
    let settings = FormatterSettings::default().with_default(Semantic::DetonateDanglingPreservedReferences(false));
    let mut driver = Driver::new(settings);
    driver.register_type::<Holder>("Holder");

    let restored = driver.deserialize(dangling_document()).unwrap();
    let holder = restored.as_any().downcast_ref::<Holder>().unwrap();
    assert_eq!(resolve_reference(&holder.x.borrow()), None);
}

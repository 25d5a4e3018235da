//! Shared, non-cyclic subobjects: serialized once, referenced from every
//! later occurrence, and resolved back to a single shared value on the way
//! in.

use std::rc::Rc;

use objgraph::impls::{wrap, List};
use objgraph::{Driver, FormatterSettings, GraphRef, GraphValue};

#[test]
fn a_doubly_referenced_leaf_serializes_to_one_value_and_one_reference() {
    let driver = Driver::new(FormatterSettings::default());
    let s: GraphRef = wrap("hello".to_string());
    let v: GraphRef = Rc::new(List(vec![Rc::clone(&s), Rc::clone(&s)]));

    let doc = driver.serialize(&v).unwrap();
    let seq = doc.as_seq().expect("List serializes to a sequence");
    assert_eq!(seq.len(), 2);
    assert_eq!(seq[0].as_str(), Some("hello"));
    let second = seq[1].as_map().expect("second occurrence is a reference");
    assert_eq!(second.get("ref").and_then(|r| r.as_str()), Some("/i0"));

    let restored = driver.deserialize(doc).unwrap();
    let items = match restored.classify() {
        objgraph::Classification::Special(objgraph::capability::Special::Seq(items)) => items,
        _ => panic!("expected a List back"),
    };
    assert_eq!(items.len(), 2);
    let a = items[0].as_any().downcast_ref::<String>().unwrap();
    let b = items[1].as_any().downcast_ref::<String>().unwrap();
    assert_eq!(a, "hello");
    assert_eq!(b, "hello");
    assert!(Rc::ptr_eq(&items[0], &items[1]), "shared identity should be restored, not just equal content");
}

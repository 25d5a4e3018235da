//! Non-attribute-keyed mappings route through the keyed-dict wrapper shape
//! rather than a plain document mapping.

use std::rc::Rc;

use objgraph::capability::{Classification, Special};
use objgraph::impls::{wrap, Dict, List};
use objgraph::{Driver, FormatterSettings, GraphValue};

#[test]
fn a_tuple_keyed_entry_round_trips_through_the_keyed_dict_wrapper() {
    let driver = Driver::new(FormatterSettings::default());
    let key = Rc::new(List(vec![wrap(1i64), wrap(2i64)]));
    let value = wrap("p".to_string());
    let dict = Rc::new(Dict(vec![(key, value)]));

    let doc = driver.serialize(&dict).unwrap();
    let root = doc.as_map().expect("keyed-dict wraps to a single-key mapping");
    let wrapped = root.get("__ksd__").expect("non-attribute keys route through the wrapper");
    let entries = wrapped.as_seq().expect("wrapper payload is a sequence of pairs");
    assert_eq!(entries.len(), 1);
    let pair = entries[0].as_seq().expect("each entry is a [key, value] pair");
    assert_eq!(pair.len(), 2);
    assert_eq!(pair[0].as_seq().unwrap()[0], objgraph::Value::Int(1));
    assert_eq!(pair[0].as_seq().unwrap()[1], objgraph::Value::Int(2));
    assert_eq!(pair[1], objgraph::Value::String("p".to_string()));

    let restored = driver.deserialize(doc).unwrap();
    let Classification::Special(Special::Map(pairs)) = restored.classify() else {
        panic!("expected a Dict back");
    };
    assert_eq!(pairs.len(), 1);
    let (restored_key, restored_value) = &pairs[0];
    let key_list = match restored_key {
        objgraph::capability::AttrKey::Key(k) => k,
        objgraph::capability::AttrKey::Attribute(_) => panic!("tuple key must not be attribute-eligible"),
    };
    let Classification::Special(Special::Seq(items)) = key_list.classify() else {
        panic!("expected the key to restore as a List");
    };
    assert_eq!(items[0].as_any().downcast_ref::<i64>(), Some(&1));
    assert_eq!(items[1].as_any().downcast_ref::<i64>(), Some(&2));
    assert_eq!(restored_value.as_any().downcast_ref::<String>().map(String::as_str), Some("p"));
}

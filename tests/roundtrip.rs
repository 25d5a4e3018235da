//! Scalar-mapping round-trip and the engine's core round-trip/idempotence/
//! path-reversibility invariants.

use std::rc::Rc;

use objgraph::capability::{AttrKey, Classification, Special};
use objgraph::impls::{wrap, Dict};
use objgraph::path::{Key, Path};
use objgraph::{Driver, FormatterSettings, GraphRef, GraphValue, Mapping, Value};

fn dict_of(pairs: Vec<(&str, Value)>) -> GraphRef {
    let entries = pairs
        .into_iter()
        .map(|(k, v)| (wrap(k.to_string()), wrap_value(v)))
        .collect::<Vec<_>>();
    Rc::new(entries.into_iter().collect::<Dict>()) as GraphRef
}

fn wrap_value(v: Value) -> GraphRef {
    match v {
        Value::Int(i) => wrap(i),
        Value::String(s) => wrap(s),
        Value::Bool(b) => wrap(b),
        _ => panic!("unsupported in this helper"),
    }
}

#[test]
fn simple_scalar_mapping_round_trips_unchanged() {
    let driver = Driver::new(FormatterSettings::default());
    let obj = dict_of(vec![("a", Value::Int(1)), ("b", Value::String("x".to_string()))]);

    let doc = driver.serialize(&obj).unwrap();
    let mut expected = Mapping::new();
    expected.insert("a", Value::Int(1));
    expected.insert("b", Value::String("x".to_string()));
    assert_eq!(doc, Value::Map(expected));

    let restored = driver.deserialize(doc).unwrap();
    let Classification::Special(Special::Map(pairs)) = restored.classify() else {
        panic!("expected a Dict back");
    };
    assert_eq!(pairs.len(), 2);
    for (key, value) in pairs {
        let AttrKey::Attribute(Value::String(name)) = key else {
            panic!("expected attribute-eligible string keys");
        };
        match name.as_str() {
            "a" => assert_eq!(value.as_any().downcast_ref::<i64>(), Some(&1)),
            "b" => assert_eq!(value.as_any().downcast_ref::<String>().map(String::as_str), Some("x")),
            other => panic!("unexpected key `{other}`"),
        }
    }
}

#[test]
fn serializing_the_same_object_twice_yields_equal_trees() {
    let driver = Driver::new(FormatterSettings::default());
    let obj = dict_of(vec![("a", Value::Int(1))]);

    let first = driver.serialize(&obj).unwrap();
    let second = driver.serialize(&obj).unwrap();
    assert_eq!(first, second);
}

#[test]
fn deserializing_the_same_document_twice_yields_equal_graphs() {
    let driver = Driver::new(FormatterSettings::default());
    let mut mapping = Mapping::new();
    mapping.insert("a", Value::Int(1));
    let doc = Value::Map(mapping);

    let first = driver.deserialize(doc.clone()).unwrap();
    let second = driver.deserialize(doc).unwrap();

    let extract = |r: &GraphRef| -> i64 {
        let Classification::Special(Special::Map(pairs)) = r.classify() else {
            panic!("expected a Dict");
        };
        *pairs[0].1.as_any().downcast_ref::<i64>().unwrap()
    };
    assert_eq!(extract(&first), extract(&second));
}

#[test]
fn every_path_produced_round_trips_through_its_string_encoding() {
    let paths = vec![
        Path::root(),
        Path(vec![Key::Name("a".into())]),
        Path(vec![Key::Name("a".into()), Key::Index(3), Key::Name("b/c~d".into())]),
        // An integer ATTRIBUTE dict key (spec. `attr_key_for`) pushes a
        // pure-digit Key::Name; it must not decode back as a Key::Index.
        Path(vec![Key::Name("0".into())]),
    ];
    for p in paths {
        let s = p.to_path_string();
        assert_eq!(Path::parse_path_string(&s).unwrap(), p);
    }
}

//! Enum round-trip through the generic `EnumLike` builtin handler.

use std::any::Any;
use std::rc::Rc;

use objgraph::handlers::builtin::enum_::{self, EnumLike};
use objgraph::{Driver, FormatterSettings, GraphValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Green,
    Blue,
}

impl EnumLike for Color {
    fn variant_name(&self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Green => "GREEN",
            Color::Blue => "BLUE",
        }
    }

    fn from_variant_name(name: &str) -> Option<Self> {
        match name {
            "RED" => Some(Color::Red),
            "GREEN" => Some(Color::Green),
            "BLUE" => Some(Color::Blue),
            _ => None,
        }
    }
}

impl GraphValue for Color {
    fn type_name(&self) -> &'static str {
        "Color"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn an_enum_value_serializes_to_a_class_and_state_pair_and_back() {
    let mut driver = Driver::new(FormatterSettings::default());
    enum_::register::<Color>(&mut driver, "Color");

    let value = Rc::new(Color::Red) as objgraph::GraphRef;
    let doc = driver.serialize(&value).unwrap();
    let mapping = doc.as_map().expect("enum serializes to a tagged mapping");
    assert_eq!(mapping.get("__class__").and_then(|v| v.as_str()), Some("Color"));
    assert_eq!(mapping.get("state").and_then(|v| v.as_str()), Some("RED"));

    let restored = driver.deserialize(doc).unwrap();
    assert_eq!(restored.as_any().downcast_ref::<Color>(), Some(&Color::Red));
}

//! Schema-version migration: a document tagged with an old version number
//! is rewritten by the type's conversion manager before its handler ever
//! sees it.

use std::any::Any;
use std::rc::Rc;

use objgraph::capability::Fields;
use objgraph::route::Route;
use objgraph::{Driver, FormatterSettings, FromDocument, GraphRef, GraphResult, GraphValue, Mapping, ToDocument, Value};

struct Widget {
    new_field: GraphRef,
}

impl GraphValue for Widget {
    fn type_name(&self) -> &'static str {
        "Widget"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn version_info(&self) -> Option<Value> {
        Some(Value::Int(2))
    }
}

impl ToDocument for Widget {
    fn to_document(&self, _route: &mut Route) -> GraphResult<Fields> {
        Ok(vec![("new".to_string(), Rc::clone(&self.new_field))])
    }
}

impl FromDocument for Widget {
    fn from_document(fields: Fields, _route: &mut Route) -> GraphResult<Self> {
        let new_field = fields.into_iter().find(|(name, _)| name == "new").unwrap().1;
        Ok(Widget { new_field })
    }
}

fn rename_old_to_new(raw: &mut Mapping, version_info: &Value) -> GraphResult<()> {
    if matches!(version_info, Value::Int(1)) {
        if let Some(value) = raw.remove("old") {
            raw.insert("new", value);
        }
    }
    Ok(())
}

#[test]
fn a_v1_document_migrates_its_renamed_field_before_reconstruction() {
    let mut driver = Driver::new(FormatterSettings::default());
    driver.register_type::<Widget>("Widget");
    driver.register_conversion_manager(std::any::TypeId::of::<Widget>(), rename_old_to_new);

    let mut mapping = Mapping::new();
    mapping.insert("__class__", Value::String("Widget".to_string()));
    mapping.insert("__version__", Value::Int(1));
    mapping.insert("old", Value::Int(42));
    let doc = Value::Map(mapping);

    let restored = driver.deserialize(doc).unwrap();
    let widget = restored.as_any().downcast_ref::<Widget>().unwrap();
    assert_eq!(widget.new_field.as_any().downcast_ref::<i64>(), Some(&42));
}

#[test]
fn a_version_tag_without_a_conversion_manager_for_an_unversioned_type_is_rejected() {
    let driver = Driver::new(FormatterSettings::default());
    // No type is registered at all, so the unknown class tag itself is the
    // first failure; this just documents that a stray version tag never
    // silently passes through on an unrecognized type.
    let mut mapping = Mapping::new();
    mapping.insert("__class__", Value::String("Ghost".to_string()));
    mapping.insert("__version__", Value::Int(1));
    let doc = Value::Map(mapping);

    assert!(driver.deserialize(doc).is_err());
}

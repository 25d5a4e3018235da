//! The recursive serialize/deserialize orchestrator (spec. §4.3, §4.4) —
//! classifies values, dispatches to handlers, tracks identity, and
//! resolves references.
//!
//! Grounded on the teacher's own recursive `TreeSerialize`/
//! `TreeDeserialize` walk (`tree.rs`): one method recurses depth-first,
//! pushing/popping a path frame around every child, propagating errors
//! with `?` rather than unwinding through panics.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace};

use crate::capability::{identity_of, AttrKey, Classification, Fields, GraphRef, GraphValue, Special};
use crate::error::{GraphError, GraphResult};
use crate::formatter::FormatterSettings;
use crate::handlers::builtin;
use crate::identity::{DeserializeIdCache, SerializeIdCache};
use crate::impls::{Dict, List};
use crate::path::{Path, PathFrame};
use crate::reference::{PreservedReference, REF_KEY};
use crate::registry::HandlerRegistry;
use crate::route::Route;
use crate::semantics::{Semantic, SemanticKind};
use crate::value::{Mapping, Value};

/// Serialize-side handler: produces a type's shallow field list, still
/// carrying unserialized sub-objects for the driver to recurse into
/// (spec. §6 "Handler API (serialize side)").
pub type SerializeHandler = dyn Fn(&GraphRef, &mut Route) -> GraphResult<Fields>;

/// Deserialize-side handler: reconstructs a value from its (already
/// recursed into, already version-migrated) field list (spec. §6
/// "Handler API (deserialize side)").
pub type DeserializeHandler = dyn Fn(Fields, &mut Route) -> GraphResult<GraphRef>;

/// A type-level "check in on deserialization route" hook (spec. §6),
/// invoked after the class/version tags are consumed but before dispatch.
pub type CheckInDeserialize = dyn Fn(&mut Route);

/// A type's conversion manager, captured at registration time (spec. §6
/// `update_to_current`).
pub type ConversionFn = dyn Fn(&mut Mapping, &Value) -> GraphResult<()>;

/// The recursive (de)serialization engine (spec. §2 component 6).
///
/// Owns the handler registries and formatter settings; stateless between
/// calls to [`Driver::serialize`]/[`Driver::deserialize`], each of which
/// builds its own [`Route`], [`PathFrame`], and identity cache (spec. §5
/// "one traversal owns one Route and one driver instance").
pub struct Driver {
    settings: Rc<FormatterSettings>,
    serialize_handlers: HandlerRegistry<SerializeHandler>,
    deserialize_handlers: HandlerRegistry<DeserializeHandler>,
    check_in_deserialize: Vec<(TypeId, Box<CheckInDeserialize>)>,
    conversion_managers: Vec<(TypeId, Box<ConversionFn>)>,
    by_class_name: HashMap<String, TypeId>,
}

impl Driver {
    /// A driver over `settings`, pre-populated with the bundled builtin
    /// handlers (null, optional, date, enum support).
    pub fn new(settings: FormatterSettings) -> Self {
        let mut driver = Driver {
            settings: Rc::new(settings),
            serialize_handlers: HandlerRegistry::new(),
            deserialize_handlers: HandlerRegistry::new(),
            check_in_deserialize: Vec::new(),
            conversion_managers: Vec::new(),
            by_class_name: HashMap::new(),
        };
        builtin::register_all(&mut driver);
        driver
    }

    /// The formatter settings this driver was built from.
    pub fn settings(&self) -> &FormatterSettings {
        &self.settings
    }

    /// Register a type's serialize/deserialize handlers under `class_name`
    /// (spec. §4.2 "Handler entry"). Later registrations for the same
    /// `type_id` shadow earlier ones.
    pub fn register(
        &mut self,
        type_id: TypeId,
        class_name: impl Into<String>,
        serialize: impl Fn(&GraphRef, &mut Route) -> GraphResult<Fields> + 'static,
        deserialize: impl Fn(Fields, &mut Route) -> GraphResult<GraphRef> + 'static,
    ) {
        let class_name = class_name.into();
        self.by_class_name.insert(class_name, type_id);
        self.serialize_handlers.register(type_id, Box::new(serialize));
        self.deserialize_handlers.register(type_id, Box::new(deserialize));
    }

    /// Register a concrete type implementing both [`crate::capability::ToDocument`]
    /// and [`crate::capability::FromDocument`] under `class_name`, the way a
    /// caller normally opts in rather than building the two closures
    /// [`Driver::register`] takes by hand.
    pub fn register_type<T>(&mut self, class_name: impl Into<String>)
    where
        T: crate::capability::ToDocument + crate::capability::FromDocument + 'static,
    {
        self.register(
            TypeId::of::<T>(),
            class_name,
            |obj, route| {
                let concrete = obj
                    .as_any()
                    .downcast_ref::<T>()
                    .expect("registered under T's own TypeId");
                concrete.to_document(route)
            },
            |fields, route| Ok(Rc::new(T::from_document(fields, route)?) as GraphRef),
        );
    }

    /// Register a type-level "check in on deserialization route" hook
    /// (spec. §6), run after tags are consumed, before dispatch.
    pub fn register_check_in_deserialize(&mut self, type_id: TypeId, hook: impl Fn(&mut Route) + 'static) {
        self.check_in_deserialize.push((type_id, Box::new(hook)));
    }

    /// Register a type's conversion manager (spec. §6
    /// `get_conversion_manager`).
    pub fn register_conversion_manager(
        &mut self,
        type_id: TypeId,
        manager: impl Fn(&mut Mapping, &Value) -> GraphResult<()> + 'static,
    ) {
        self.conversion_managers.push((type_id, Box::new(manager)));
    }

    // ---- serialize -----------------------------------------------------

    /// Serialize `obj` to a document tree (spec. §4.3 entry point).
    pub fn serialize(&self, obj: &GraphRef) -> GraphResult<Value> {
        let mut route = Route::new(Rc::clone(&self.settings));
        let mut path = PathFrame::new();
        let mut id_cache = SerializeIdCache::<GraphRef>::new();
        let result = self.serialize_value(obj, &mut route, &mut path, &mut id_cache);
        if result.is_ok() {
            route.run_finalize();
        }
        result
    }

    fn serialize_value(
        &self,
        obj: &GraphRef,
        route: &mut Route,
        path: &mut PathFrame,
        id_cache: &mut SerializeIdCache<GraphRef>,
    ) -> GraphResult<Value> {
        obj.check_in_serialization_route(route);

        if route.get_bool(SemanticKind::AutoPreserveReferences) {
            let identity = identity_of(obj);
            let current_path = path.current_string();
            if let Some(existing_path) = id_cache.check_in(identity, Rc::clone(obj), &current_path) {
                trace!("serialize: {current_path} replaced with reference to {existing_path}");
                let mut placeholder = Mapping::new();
                placeholder.insert(REF_KEY, Value::String(existing_path));
                return Ok(Value::Map(placeholder));
            }
            if obj.evict_identity_after_checkin() {
                id_cache.forget(identity);
            }
        }

        match obj.classify() {
            Classification::Primitive(v) => Ok(v),
            Classification::Special(special) => self.serialize_special(special, route, path, id_cache),
            Classification::Object => self.serialize_object(obj, route, path, id_cache),
        }
    }

    fn serialize_special(
        &self,
        special: Special,
        route: &mut Route,
        path: &mut PathFrame,
        id_cache: &mut SerializeIdCache<GraphRef>,
    ) -> GraphResult<Value> {
        match special {
            Special::Seq(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let mut guard = path.enter(index);
                    let mut child = route.branch();
                    out.push(self.serialize_value(&item, &mut child, &mut guard, id_cache)?);
                }
                Ok(Value::Seq(out))
            }
            Special::Map(pairs) => {
                let non_attribute = pairs.iter().any(|(k, _)| matches!(k, AttrKey::Key(_)));
                if non_attribute {
                    if !route.get_bool(SemanticKind::AutoKeySerializableDictType) {
                        return Err(GraphError::HandlerContract {
                            path: path.current_string(),
                            type_name: "Dict".to_string(),
                            reason: "mapping has non-attribute keys and AutoKeySerializableDictType is off".to_string(),
                        });
                    }
                    return self.serialize_keyed_dict(pairs, route, path, id_cache);
                }
                let mut mapping = Mapping::new();
                for (key, value) in pairs {
                    let key_str = match key {
                        AttrKey::Attribute(Value::String(s)) => s,
                        AttrKey::Attribute(Value::Int(i)) => i.to_string(),
                        _ => unreachable!("non-attribute key handled above"),
                    };
                    let mut guard = path.enter(key_str.clone());
                    let mut child = route.branch();
                    let doc = self.serialize_value(&value, &mut child, &mut guard, id_cache)?;
                    mapping.insert(key_str, doc);
                }
                if route.get_bool(SemanticKind::PreserveSerializableKeyOrdering) {
                    mapping.sort_keys();
                }
                Ok(Value::Map(mapping))
            }
        }
    }

    fn serialize_keyed_dict(
        &self,
        pairs: Vec<(AttrKey, GraphRef)>,
        route: &mut Route,
        path: &mut PathFrame,
        id_cache: &mut SerializeIdCache<GraphRef>,
    ) -> GraphResult<Value> {
        let mut guard = path.enter(builtin::keyed_dict::KSD_KEY);
        let mut entries = Vec::with_capacity(pairs.len());
        for (index, (key, value)) in pairs.into_iter().enumerate() {
            let mut pair_guard = guard.enter(index);
            let key_doc = {
                let mut k_guard = pair_guard.enter("0");
                match key {
                    AttrKey::Attribute(v) => v,
                    AttrKey::Key(k) => {
                        let mut child = route.branch();
                        self.serialize_value(&k, &mut child, &mut k_guard, id_cache)?
                    }
                }
            };
            let value_doc = {
                let mut v_guard = pair_guard.enter("1");
                let mut child = route.branch();
                self.serialize_value(&value, &mut child, &mut v_guard, id_cache)?
            };
            entries.push(Value::Seq(vec![key_doc, value_doc]));
        }
        let mut mapping = Mapping::new();
        mapping.insert(builtin::keyed_dict::KSD_KEY, Value::Seq(entries));
        Ok(Value::Map(mapping))
    }

    fn serialize_object(
        &self,
        obj: &GraphRef,
        route: &mut Route,
        path: &mut PathFrame,
        id_cache: &mut SerializeIdCache<GraphRef>,
    ) -> GraphResult<Value> {
        let type_id = obj.as_any().type_id();
        let lineage = obj.lineage();

        let mut mapping = Mapping::new();
        mapping.insert(self.settings.class_tag_key.clone(), Value::Null);

        if let Some(version_info) = obj.version_info() {
            mapping.insert(self.settings.version_tag_key.clone(), version_info);
        } else if route.get_bool(SemanticKind::SerializeNoneVersionInfo) {
            mapping.insert(self.settings.version_tag_key.clone(), Value::Null);
        }

        let fields = match self.serialize_handlers.lookup(type_id, lineage) {
            Some(handler) => handler(obj, route)?,
            None => match obj.to_document_fallback(route) {
                Some(result) => result?,
                None => {
                    return Err(GraphError::NotSerializable {
                        path: path.current_string(),
                        type_name: obj.type_name().to_string(),
                    })
                }
            },
        };

        route.add_frame_semantic(Semantic::AutoPreserveReferences(false));
        let wrapped_special = Special::Map(
            fields
                .into_iter()
                .map(|(name, value)| (AttrKey::Attribute(Value::String(name)), value))
                .collect(),
        );
        if let Value::Map(wrapped) = self.serialize_special(wrapped_special, route, path, id_cache)? {
            for (key, value) in wrapped.iter() {
                mapping.insert(key.clone(), value.clone());
            }
        }

        let class_name = match route.get_semantic(SemanticKind::OverrideClassString) {
            Some(semantic) => semantic.as_str().unwrap_or(obj.type_name()).to_string(),
            None => self.class_name_for(type_id).unwrap_or_else(|| obj.type_name().to_string()),
        };
        mapping.insert(self.settings.class_tag_key.clone(), Value::String(class_name));

        Ok(Value::Map(mapping))
    }

    fn class_name_for(&self, type_id: TypeId) -> Option<String> {
        self.by_class_name
            .iter()
            .find(|(_, id)| **id == type_id)
            .map(|(name, _)| name.clone())
    }

    // ---- deserialize -----------------------------------------------------

    /// Deserialize `document` back into a graph (spec. §4.4 entry point).
    pub fn deserialize(&self, document: Value) -> GraphResult<GraphRef> {
        let mut route = Route::new(Rc::clone(&self.settings));
        let mut path = PathFrame::new();
        let mut ctx = DeserializeCtx::default();
        let result = self.deserialize_value(&document, &document, &mut route, &mut path, &mut ctx);
        match result {
            Ok(value) => {
                let dangling = ctx.placeholders.iter().filter(|c| c.borrow().obj.is_none()).count();
                if route.get_bool(SemanticKind::DetonateDanglingPreservedReferences) && dangling > 0 {
                    return Err(GraphError::PreservedReferenceNotDissolved { count: dangling });
                }
                route.run_finalize();
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }

    fn deserialize_value(
        &self,
        root: &Value,
        value: &Value,
        route: &mut Route,
        path: &mut PathFrame,
        ctx: &mut DeserializeCtx,
    ) -> GraphResult<GraphRef> {
        let current_path = path.current_string();
        if let Some(existing) = ctx.id_cache.get(&current_path) {
            return Ok(existing);
        }

        let result = match value {
            Value::Map(mapping) => self.deserialize_mapping(root, mapping, route, path, ctx)?,
            Value::Seq(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let mut guard = path.enter(index);
                    let mut child = route.branch();
                    out.push(self.deserialize_value(root, item, &mut child, &mut guard, ctx)?);
                }
                Rc::new(List(out)) as GraphRef
            }
            primitive => self.wrap_primitive(primitive.clone())?,
        };

        ctx.id_cache.insert(current_path.clone(), Rc::clone(&result));
        if let Some(waiters) = ctx.circular_waiters.remove(&current_path) {
            for waiter in waiters {
                *waiter.borrow_mut() = PreservedReference::resolved(Rc::clone(&result), current_path.clone());
            }
        }
        Ok(result)
    }

    fn wrap_primitive(&self, value: Value) -> GraphResult<GraphRef> {
        Ok(match value {
            Value::Null => Rc::new(crate::impls::Null) as GraphRef,
            Value::Bool(b) => Rc::new(b) as GraphRef,
            Value::Int(i) => Rc::new(i) as GraphRef,
            Value::Float(f) => Rc::new(f) as GraphRef,
            Value::String(s) => Rc::new(s) as GraphRef,
            Value::Seq(_) | Value::Map(_) => unreachable!("not a primitive document value"),
        })
    }

    fn deserialize_mapping(
        &self,
        root: &Value,
        mapping: &Mapping,
        route: &mut Route,
        path: &mut PathFrame,
        ctx: &mut DeserializeCtx,
    ) -> GraphResult<GraphRef> {
        if mapping.len() == 1 {
            if let Some(Value::String(ref_path)) = mapping.get(REF_KEY) {
                return self.deserialize_reference(root, ref_path.clone(), route, path, ctx);
            }
            if let Some(encoded) = mapping.get(builtin::keyed_dict::KSD_KEY) {
                if mapping.get(&self.settings.class_tag_key).is_none() {
                    return self.deserialize_keyed_dict(root, encoded, route, path, ctx);
                }
            }
        }

        let Some(Value::String(class_name)) = mapping.get(&self.settings.class_tag_key) else {
            let mut dict = Vec::with_capacity(mapping.len());
            for (key, value) in mapping.iter() {
                let mut guard = path.enter(key.clone());
                let mut child = route.branch();
                let value_ref = self.deserialize_value(root, value, &mut child, &mut guard, ctx)?;
                dict.push((Rc::new(key.clone()) as GraphRef, value_ref));
            }
            return Ok(Rc::new(Dict(dict)) as GraphRef);
        };

        let type_id = *self
            .by_class_name
            .get(class_name)
            .ok_or_else(|| GraphError::InvalidDocument {
                path: path.current_string(),
                reason: format!("unknown class tag `{class_name}`"),
            })?;

        let version_info = mapping.get(&self.settings.version_tag_key).cloned();
        let mut raw = mapping.clone();
        raw.remove(&self.settings.class_tag_key);
        raw.remove(&self.settings.version_tag_key);

        if let Some(version_info) = &version_info {
            if let Some((_, manager)) = self.conversion_managers.iter().find(|(id, _)| *id == type_id) {
                debug!("deserialize: migrating `{class_name}` at `{}`", path.current_string());
                manager(&mut raw, version_info)?;
            } else if !matches!(version_info, Value::Null) {
                return Err(GraphError::InvalidDocument {
                    path: path.current_string(),
                    reason: format!("`{class_name}` has no conversion manager but a version tag was present"),
                });
            }
        }

        if let Some((_, hook)) = self.check_in_deserialize.iter().find(|(id, _)| *id == type_id) {
            hook(route);
        }

        let mut fields = Vec::with_capacity(raw.len());
        for (key, value) in raw.iter() {
            let mut guard = path.enter(key.clone());
            let mut child = route.branch();
            let value_ref = self.deserialize_value(root, value, &mut child, &mut guard, ctx)?;
            fields.push((key.clone(), value_ref));
        }

        let handler = self.deserialize_handlers.lookup(type_id, &[]).ok_or_else(|| GraphError::InvalidDocument {
            path: path.current_string(),
            reason: format!("no deserialize handler registered for `{class_name}`"),
        })?;
        let obj = handler(fields, route)?;

        if let Some(Semantic::NotifyFinalizedMethodName(_)) = route.get_semantic(SemanticKind::NotifyFinalizedMethodName) {
            let obj = Rc::clone(&obj);
            route.subscribe_finalize(Box::new(move || obj.notify_finalized()));
        }

        Ok(obj)
    }

    fn deserialize_keyed_dict(
        &self,
        root: &Value,
        encoded: &Value,
        route: &mut Route,
        path: &mut PathFrame,
        ctx: &mut DeserializeCtx,
    ) -> GraphResult<GraphRef> {
        let Value::Seq(entries) = encoded else {
            return Err(GraphError::InvalidDocument {
                path: path.current_string(),
                reason: "keyed-dict wrapper's payload is not a sequence".to_string(),
            });
        };
        let mut guard = path.enter(builtin::keyed_dict::KSD_KEY);
        let mut dict = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let Value::Seq(pair) = entry else {
                return Err(GraphError::InvalidDocument {
                    path: guard.current_string(),
                    reason: "keyed-dict entry is not a [key, value] pair".to_string(),
                });
            };
            let [k, v] = &pair[..] else {
                return Err(GraphError::InvalidDocument {
                    path: guard.current_string(),
                    reason: "keyed-dict entry does not have exactly two elements".to_string(),
                });
            };
            let mut pair_guard = guard.enter(index);
            let key_ref = {
                let mut k_guard = pair_guard.enter("0");
                let mut child = route.branch();
                self.deserialize_value(root, k, &mut child, &mut k_guard, ctx)?
            };
            let value_ref = {
                let mut v_guard = pair_guard.enter("1");
                let mut child = route.branch();
                self.deserialize_value(root, v, &mut child, &mut v_guard, ctx)?
            };
            dict.push((key_ref, value_ref));
        }
        Ok(Rc::new(Dict(dict)) as GraphRef)
    }

    fn deserialize_reference(
        &self,
        root: &Value,
        ref_path: String,
        route: &mut Route,
        path: &mut PathFrame,
        ctx: &mut DeserializeCtx,
    ) -> GraphResult<GraphRef> {
        let parsed = Path::parse_path_string(&ref_path)?;
        let resolve = route.get_bool(SemanticKind::ResolvePreservedReferences);
        let circular = parsed.is_prefix_of(path.current());

        if !resolve {
            return Ok(self.pending_placeholder(ref_path, ctx));
        }

        if circular {
            trace!("deserialize: circular reference to `{ref_path}` left pending");
            let placeholder = self.pending_placeholder(ref_path.clone(), ctx);
            let cell = placeholder
                .as_any()
                .downcast_ref::<ReferenceCell>()
                .expect("pending_placeholder always returns a ReferenceCell")
                .0
                .clone();
            ctx.circular_waiters.entry(ref_path).or_default().push(cell);
            return Ok(placeholder);
        }

        if let Some(existing) = ctx.id_cache.get(&ref_path) {
            return Ok(existing);
        }

        let Some(target) = root.get_path(&parsed) else {
            trace!("deserialize: reference to nonexistent path `{ref_path}`");
            return Ok(self.pending_placeholder(ref_path, ctx));
        };

        let mut detour_route = route.branch();
        let mut detour_path = PathFrame::at(parsed);
        let materialized = self.deserialize_value(root, target, &mut detour_route, &mut detour_path, ctx)?;
        Ok(materialized)
    }

    fn pending_placeholder(&self, ref_path: String, ctx: &mut DeserializeCtx) -> GraphRef {
        let cell = Rc::new(ReferenceCell(Rc::new(RefCell::new(PreservedReference::pending(ref_path)))));
        ctx.placeholders.push(Rc::clone(&cell.0));
        cell as GraphRef
    }
}

/// Per-traversal deserialize bookkeeping (spec. §3 "Identity cache", §4.4).
#[derive(Default)]
struct DeserializeCtx {
    id_cache: DeserializeIdCache<GraphRef>,
    /// Placeholders waiting on the ancestor path named by the map key to
    /// finish construction (spec. §4.4 "circular-reference detection").
    circular_waiters: HashMap<String, Vec<Rc<RefCell<PreservedReference>>>>,
    /// Every placeholder created this traversal, resolved or not, used to
    /// count dangling references at finalization (spec. §4.7).
    placeholders: Vec<Rc<RefCell<PreservedReference>>>,
}

/// A deserialize-side [`PreservedReference`] as a graph value: round-trips
/// back to `{"ref": path}` if re-serialized, and is patched in place once
/// its target finishes constructing (spec. §4.5).
struct ReferenceCell(Rc<RefCell<PreservedReference>>);

impl GraphValue for ReferenceCell {
    fn type_name(&self) -> &'static str {
        "PreservedReference"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn classify(&self) -> Classification {
        let ref_path = self.0.borrow().ref_path.clone();
        Classification::Special(Special::Map(vec![(
            AttrKey::Attribute(Value::String(REF_KEY.to_string())),
            Rc::new(ref_path) as GraphRef,
        )]))
    }
}

/// Follow `value` through one level of reference indirection.
///
/// A field populated during deserialize may hold a reference placeholder
/// rather than the object it names directly. That is unavoidable for a
/// self- or mutually-referential graph, since the ancestor object is still
/// under construction at the moment the placeholder is handed to it (spec.
/// §9 "model with an arena + indices or with interior-mutable cells").
/// Returns `Some(value)` unchanged for anything that is not a placeholder,
/// `Some(target)` for a resolved one, and `None` for one still pending.
pub fn resolve_reference(value: &GraphRef) -> Option<GraphRef> {
    match value.as_any().downcast_ref::<ReferenceCell>() {
        Some(cell) => cell.0.borrow().obj.clone(),
        None => Some(Rc::clone(value)),
    }
}

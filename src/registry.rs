//! Maps a runtime type to the handler that knows how to serialize or
//! deserialize it (spec. §4.2 "Handler registry").
//!
//! Generic over the handler's call signature `F` so the same lookup logic
//! serves both the serialize-side registry (`Fn(&GraphRef, &mut Route) ->
//! GraphResult<Value>`) and the deserialize-side registry (`Fn(Value, &mut
//! Route) -> GraphResult<GraphRef>`) without duplication, the way the
//! teacher's `Key::find` is reused across every `TreeKey` impl regardless
//! of what the key ultimately resolves to.

use std::any::TypeId;

/// A registry of handlers keyed by `TypeId`, dispatched by most-specific
/// ancestor. `F` is the unsized handler call signature, e.g. `dyn
/// Fn(&GraphRef, &mut Route) -> GraphResult<Value>`.
pub struct HandlerRegistry<F: ?Sized> {
    entries: Vec<(TypeId, Box<F>)>,
}

impl<F: ?Sized> Default for HandlerRegistry<F> {
    fn default() -> Self {
        HandlerRegistry { entries: Vec::new() }
    }
}

impl<F: ?Sized> HandlerRegistry<F> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `type_id`. Later registrations for the same
    /// `type_id` shadow earlier ones at lookup time (first match wins, and
    /// lookup scans front-to-back), matching the teacher's "first
    /// registered, first matched" convention for linear lookup tables.
    pub fn register(&mut self, type_id: TypeId, handler: Box<F>) {
        self.entries.insert(0, (type_id, handler));
    }

    /// Find the handler for `type_id`, falling back through `lineage`
    /// (most-specific ancestor first, per [`crate::capability::GraphValue::lineage`])
    /// when there is no exact match. Returns `None` if neither the type nor
    /// any of its declared ancestors has a registered handler.
    pub fn lookup(&self, type_id: TypeId, lineage: &[TypeId]) -> Option<&F> {
        if let Some(handler) = self.find(type_id) {
            return Some(handler);
        }
        lineage.iter().find_map(|ancestor| self.find(*ancestor))
    }

    fn find(&self, type_id: TypeId) -> Option<&F> {
        self.entries
            .iter()
            .find(|(id, _)| *id == type_id)
            .map(|(_, handler)| &**handler)
    }

    /// Whether any handler is registered for `type_id` or one of
    /// `lineage`'s entries.
    pub fn contains(&self, type_id: TypeId, lineage: &[TypeId]) -> bool {
        self.lookup(type_id, lineage).is_some()
    }
}

//! Capability traits objects opt into, replacing the duck-typed hooks of
//! the engine this crate generalizes (spec. §6 "Object capability hooks",
//! §9 "Replace with an explicit capability trait/interface; objects opt
//! in").

use std::any::{Any, TypeId};
use std::rc::Rc;

use crate::error::GraphResult;
use crate::route::Route;
use crate::value::Value;

/// Any value the engine can hold in the graph: the common currency the
/// driver traverses, dispatches on, and tracks identity for.
///
/// Concrete Rust types (structs, enums, builtin containers) opt in by
/// implementing this trait and registering a handler for their `TypeId`
/// with [`crate::driver::Driver::register`]. `as_any` exists because
/// trait-object upcasting (`&dyn GraphValue as &dyn Any`) is not available
/// on the toolchain versions this crate targets; each implementor
/// provides the one-line forwarding body.
pub trait GraphValue: Any {
    /// A stable, human-readable name for this type, used in error
    /// messages. Typically `std::any::type_name::<Self>()`.
    fn type_name(&self) -> &'static str;

    /// Ancestor `TypeId`s this value should also match under during
    /// most-specific-ancestor handler lookup (spec. §4.2), most-specific
    /// first. Empty for concrete leaf types with no declared ancestry.
    fn lineage(&self) -> &'static [TypeId] {
        &[]
    }

    /// Borrow as `&dyn Any`, for downcasting the final output of a
    /// traversal back to a concrete type.
    fn as_any(&self) -> &dyn Any;

    /// How the driver should treat this value (spec. §3 "Value category").
    /// Defaults to `Object`, the catch-all requiring handler-registry
    /// dispatch; primitives and structural containers override this.
    fn classify(&self) -> Classification {
        Classification::Object
    }

    /// Lets an object install route-scoped semantics for its own subtree
    /// just before handler selection (spec. §4.3 step 2, §6
    /// `check_in_serialization_route`). Most objects don't need this.
    fn check_in_serialization_route(&self, _route: &mut Route) {}

    /// Fallback serializer consulted only when no handler is registered
    /// for this value's type or lineage (spec. §6 `to_dict`, §4.2 "default
    /// handler"). Returning `None` lets the driver raise `NotSerializable`.
    fn to_document_fallback(&self, _route: &mut Route) -> Option<GraphResult<Fields>> {
        None
    }

    /// Whether the driver must immediately evict this value's identity
    /// entry right after the first check-in, rather than letting later
    /// occurrences become references. Used by the null-value handler to
    /// avoid treating every subsequent `None` as a reference to the first
    /// (spec. §4.3 "tie-breaks and edge cases": "the NoneType handler
    /// explicitly deletes any cached entry for the sentinel null identity
    /// to avoid cross-graph reuse").
    fn evict_identity_after_checkin(&self) -> bool {
        false
    }

    /// This value's version info, if it is a versioned type currently
    /// carrying one (spec. §6 `get_version_object`). `None` means either
    /// "not versioned" or "no version set"; the driver cannot tell those
    /// apart without the type's own judgment, so it asks the value, not a
    /// separate trait.
    fn version_info(&self) -> Option<Value> {
        None
    }

    /// Invoked once, during finalization, for an object whose
    /// deserialization route carried a `NotifyFinalizedMethodName`
    /// semantic (spec. §6 "invoke the named post-construction callback").
    /// Static dispatch cannot look a method up by name the way the
    /// original's reflective call does, so every opted-in type overrides
    /// this single hook instead; the semantic's string payload is
    /// documentation for callers porting a schema, not something the
    /// driver consults.
    fn notify_finalized(&self) {}
}

/// An object-graph value, type-erased but identity-trackable.
pub type GraphRef = Rc<dyn GraphValue>;

/// The shallow field list a type handler or [`GraphValue::to_document_fallback`]
/// produces on serialize, and a [`FromDocument`] impl consumes on
/// deserialize: attribute names paired with (still-unserialized, or
/// already-reconstructed) sub-objects. The driver recurses into these,
/// extending the path by each field name.
pub type Fields = Vec<(String, GraphRef)>;

/// How the driver treats a value during traversal (spec. §3 "Value
/// category", restricted here to the OBJECT-adjacent categories a runtime
/// value can report about itself; PRIMITIVE carries its finished document
/// value directly, SPECIAL carries its already-erased children).
pub enum Classification {
    /// A scalar leaf; `Value` is the finished document representation, no
    /// further recursion needed.
    Primitive(Value),
    /// A structural container native to the document format.
    Special(Special),
    /// Everything else: dispatched through the handler registry, falling
    /// back to [`GraphValue::to_document_fallback`].
    Object,
}

/// The two structural container shapes a [`Classification::Special`]
/// value can take.
pub enum Special {
    /// An ordered sequence of children.
    Seq(Vec<GraphRef>),
    /// A keyed mapping, whose keys may or may not be ATTRIBUTE-eligible
    /// (spec. §4.3 "Mapping handlers must first consult
    /// AutoKeySerializableDictType").
    Map(Vec<(AttrKey, GraphRef)>),
}

/// A native mapping's key, classified for attribute eligibility.
pub enum AttrKey {
    /// Already a document-level ATTRIBUTE value (string or integer).
    Attribute(Value),
    /// Not ATTRIBUTE-eligible; the whole mapping must be wrapped through
    /// the keyed-dict serializable form (spec. §3 "Semantic:
    /// AutoKeySerializableDictType").
    Key(GraphRef),
}

/// Produces a type's shallow field list for serialization (spec. §6
/// `to_dict`). Paired with [`FromDocument`] and consumed by
/// [`crate::driver::Driver::register_type`], which wires both into the
/// handler registries via a generic closure rather than a derive macro.
pub trait ToDocument: GraphValue {
    /// This value's fields, in emission order. The driver recurses into
    /// each one itself; this only needs to list them.
    fn to_document(&self, route: &mut Route) -> GraphResult<Fields>;
}

/// The type-level capability pairing [`ToDocument`]'s serializer with its
/// inverse (spec. §6 `from_dict`). `Sized` because it reconstructs `Self`
/// by value; registered into the deserialize handler registry via a
/// generic closure, never called through `dyn GraphValue`.
pub trait FromDocument: GraphValue + Sized {
    /// Reconstruct `Self` from its shallow field list (already recursed
    /// into and, if versioned, already migrated by the driver).
    fn from_document(fields: Fields, route: &mut Route) -> GraphResult<Self>;
}

/// Schema-version metadata for a versioned type (spec. §6
/// `get_conversion_manager`). Consulted only at registration time, to
/// capture a type's conversion manager into the closure
/// [`crate::driver::Driver::register`] stores; never called through `dyn
/// GraphValue`.
pub trait Versioned: GraphValue {
    /// The conversion manager able to migrate raw documents of this type.
    type Manager: ConversionManager;

    /// The conversion manager for this type.
    fn conversion_manager() -> Self::Manager;
}

/// Migrates an older document shape to the current schema (spec. §6
/// `update_to_current`). The core never implements a concrete manager —
/// only invokes one (spec. §1 "the version-migration algorithms
/// themselves ... are external collaborators").
pub trait ConversionManager {
    /// Migrate `raw` (the tagged object's mapping, with class/version tags
    /// already removed, fields not yet recursed into) from `version_info`'s
    /// schema to the current one, in place.
    fn update_to_current(&self, raw: &mut crate::value::Mapping, version_info: &Value) -> GraphResult<()>;
}

/// The stable identity of a `GraphRef` for this traversal: the address of
/// its allocation. Two `GraphRef`s referring to the same underlying
/// allocation (e.g. two clones of the same `Rc`) share an identity.
pub fn identity_of(value: &GraphRef) -> usize {
    Rc::as_ptr(value) as *const () as usize
}

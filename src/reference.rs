//! Placeholder values standing in for an object already encountered
//! elsewhere in the traversal (spec. §4.5).

use crate::capability::GraphRef;

/// The reserved document key a [`PreservedReference`] is encoded under.
pub const REF_KEY: &str = "ref";

/// A two-field record: on the serialize side, replaces a value that has
/// already been visited, carrying the path of its canonical occurrence. On
/// the deserialize side, marks an occurrence pointing at a location not yet
/// (or currently being) materialized.
#[derive(Clone)]
pub struct PreservedReference {
    /// A strong handle to the already-materialized object, once resolved.
    /// `None` while the placeholder is still pending resolution.
    pub obj: Option<GraphRef>,
    /// The path string identifying the canonical occurrence this reference
    /// points at.
    pub ref_path: String,
}

impl PreservedReference {
    /// A reference pointing at `ref_path`, not yet resolved to an object.
    pub fn pending(ref_path: impl Into<String>) -> Self {
        PreservedReference {
            obj: None,
            ref_path: ref_path.into(),
        }
    }

    /// A reference that already carries its resolved object.
    pub fn resolved(obj: GraphRef, ref_path: impl Into<String>) -> Self {
        PreservedReference {
            obj: Some(obj),
            ref_path: ref_path.into(),
        }
    }
}

impl std::fmt::Debug for PreservedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreservedReference")
            .field("obj", &self.obj.is_some())
            .field("ref_path", &self.ref_path)
            .finish()
    }
}

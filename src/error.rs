//! Error types for the object-graph engine.
//!
//! Layered the way the teacher's own `error.rs` layers `KeyError` ->
//! `ValueError` -> `SerDeError`: a narrow error for path-string round-trip
//! failures, and a top-level enum covering every traversal failure.

/// A path string produced by [`crate::path::Path::to_string`] could not be
/// parsed back into a [`crate::path::Path`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed path string: {0:?}")]
pub struct PathError(pub String);

/// Errors that can occur during a single serialize or deserialize traversal.
///
/// A traversal aborts on the first error; no partial result is surfaced.
/// Every variant carries the path at which the failure was observed so
/// callers can locate the offending node in the source document or graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// No handler matched the value and it implements no fallback
    /// capability trait.
    #[error("no handler for type `{type_name}` at `{path}`")]
    NotSerializable {
        /// Path at which the unhandled value was encountered.
        path: String,
        /// `type_name::<T>()` of the offending value.
        type_name: String,
    },

    /// Finalization observed unresolved [`crate::reference::PreservedReference`]s
    /// while [`crate::semantics::Semantic::DetonateDanglingPreservedReferences`]
    /// was active.
    #[error("{count} dangling preserved reference(s) remained after finalization")]
    PreservedReferenceNotDissolved {
        /// Number of references that never resolved.
        count: usize,
    },

    /// A class-tag value did not resolve to a known type, or a version tag
    /// was present without a conversion manager when migration was required.
    #[error("invalid document at `{path}`: {reason}")]
    InvalidDocument {
        /// Path at which the document was malformed.
        path: String,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// A reference path string could not be parsed.
    #[error(transparent)]
    PathFormat(#[from] PathError),

    /// A handler produced a value of a disallowed category (e.g. a
    /// deserialize handler returning something other than a constructed
    /// object, or a serialize handler returning a non-mapping for an
    /// object-classified value).
    #[error("handler for `{type_name}` at `{path}` produced a disallowed value: {reason}")]
    HandlerContract {
        /// Path at which the contract violation was observed.
        path: String,
        /// `type_name::<T>()` of the handler's subject type.
        type_name: String,
        /// What was wrong with the handler's output.
        reason: String,
    },
}

impl GraphError {
    /// The path at which this error occurred, if the variant carries one.
    pub fn path(&self) -> Option<&str> {
        match self {
            GraphError::NotSerializable { path, .. } => Some(path),
            GraphError::InvalidDocument { path, .. } => Some(path),
            GraphError::HandlerContract { path, .. } => Some(path),
            GraphError::PreservedReferenceNotDissolved { .. } => None,
            GraphError::PathFormat(_) => None,
        }
    }
}

/// Shorthand used throughout the crate.
pub type GraphResult<T> = Result<T, GraphError>;

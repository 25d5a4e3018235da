//! Per-traversal behavioral overrides consulted by the driver at every
//! recursion step (spec. §3 "Semantic", §4.1).

/// A behavioral flag or value the driver consults during traversal.
///
/// Closed enum rather than an open keyed registry (spec. §9: "replace
/// dynamic dispatch ... with a tagged-variant value"): the semantic kinds
/// are fixed by this crate, so there is nothing a caller could register
/// that the driver wouldn't already know how to interpret, and "adding an
/// unrecognized semantic kind" (spec.'s programming-error case) simply
/// cannot happen.
#[derive(Debug, Clone, PartialEq)]
pub enum Semantic {
    /// Whether identity tracking is active for nested objects.
    AutoPreserveReferences(bool),
    /// Whether non-attribute-keyed mappings are wrapped into a
    /// keyed-dict serializable form before serialization.
    AutoKeySerializableDictType(bool),
    /// Whether finalization must fail if references remain unresolved.
    DetonateDanglingPreservedReferences(bool),
    /// Whether references are resolved eagerly in-line rather than left as
    /// deferred placeholders.
    ResolvePreservedReferences(bool),
    /// Whether emitted mappings enforce stable (lexical) key order.
    PreserveSerializableKeyOrdering(bool),
    /// Whether absent version info is still written explicitly.
    SerializeNoneVersionInfo(bool),
    /// Overrides the class tag emitted for the current frame.
    OverrideClassString(String),
    /// Names a post-construction callback on the produced object.
    NotifyFinalizedMethodName(String),
}

/// Discriminant-only twin of [`Semantic`], used as a lookup key. Kept
/// separate from `Semantic` itself (rather than deriving `Hash`/`Eq` on a
/// payload-bearing enum and matching on it) so a lookup by kind doesn't
/// need a dummy payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SemanticKind {
    /// See [`Semantic::AutoPreserveReferences`].
    AutoPreserveReferences,
    /// See [`Semantic::AutoKeySerializableDictType`].
    AutoKeySerializableDictType,
    /// See [`Semantic::DetonateDanglingPreservedReferences`].
    DetonateDanglingPreservedReferences,
    /// See [`Semantic::ResolvePreservedReferences`].
    ResolvePreservedReferences,
    /// See [`Semantic::PreserveSerializableKeyOrdering`].
    PreserveSerializableKeyOrdering,
    /// See [`Semantic::SerializeNoneVersionInfo`].
    SerializeNoneVersionInfo,
    /// See [`Semantic::OverrideClassString`].
    OverrideClassString,
    /// See [`Semantic::NotifyFinalizedMethodName`].
    NotifyFinalizedMethodName,
}

impl Semantic {
    /// This semantic's kind.
    pub fn kind(&self) -> SemanticKind {
        match self {
            Semantic::AutoPreserveReferences(_) => SemanticKind::AutoPreserveReferences,
            Semantic::AutoKeySerializableDictType(_) => {
                SemanticKind::AutoKeySerializableDictType
            }
            Semantic::DetonateDanglingPreservedReferences(_) => {
                SemanticKind::DetonateDanglingPreservedReferences
            }
            Semantic::ResolvePreservedReferences(_) => SemanticKind::ResolvePreservedReferences,
            Semantic::PreserveSerializableKeyOrdering(_) => {
                SemanticKind::PreserveSerializableKeyOrdering
            }
            Semantic::SerializeNoneVersionInfo(_) => SemanticKind::SerializeNoneVersionInfo,
            Semantic::OverrideClassString(_) => SemanticKind::OverrideClassString,
            Semantic::NotifyFinalizedMethodName(_) => SemanticKind::NotifyFinalizedMethodName,
        }
    }

    /// This semantic's bool payload, if it has one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Semantic::AutoPreserveReferences(b)
            | Semantic::AutoKeySerializableDictType(b)
            | Semantic::DetonateDanglingPreservedReferences(b)
            | Semantic::ResolvePreservedReferences(b)
            | Semantic::PreserveSerializableKeyOrdering(b)
            | Semantic::SerializeNoneVersionInfo(b) => Some(*b),
            Semantic::OverrideClassString(_) | Semantic::NotifyFinalizedMethodName(_) => None,
        }
    }

    /// This semantic's string payload, if it has one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Semantic::OverrideClassString(s) | Semantic::NotifyFinalizedMethodName(s) => {
                Some(s.as_str())
            }
            _ => None,
        }
    }
}

/// A small fixed-shape lookup table from [`SemanticKind`] to [`Semantic`],
/// in the spirit of the teacher's `KeyLookup` — a closed key space does not
/// need a general hash map.
#[derive(Debug, Clone, Default)]
pub struct SemanticMap(Vec<Semantic>);

impl SemanticMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `semantic`, replacing any existing value of the same kind.
    pub fn set(&mut self, semantic: Semantic) {
        let kind = semantic.kind();
        if let Some(slot) = self.0.iter_mut().find(|s| s.kind() == kind) {
            *slot = semantic;
        } else {
            self.0.push(semantic);
        }
    }

    /// Look up a semantic by kind.
    pub fn get(&self, kind: SemanticKind) -> Option<&Semantic> {
        self.0.iter().find(|s| s.kind() == kind)
    }

    /// Clear all entries (used when a frame-scoped map is discarded after
    /// one child frame).
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrites_same_kind() {
        let mut m = SemanticMap::new();
        m.set(Semantic::AutoPreserveReferences(true));
        m.set(Semantic::AutoPreserveReferences(false));
        assert_eq!(
            m.get(SemanticKind::AutoPreserveReferences).unwrap().as_bool(),
            Some(false)
        );
    }
}

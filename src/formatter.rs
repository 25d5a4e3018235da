//! Formatter settings: the value carrying a format's reserved keys, value
//! classification, path codec, and default semantics (spec. §6).

use crate::path::Path;
use crate::semantics::{Semantic, SemanticKind};

/// Settings shared by every [`crate::route::Route`] of a traversal.
///
/// A plain, `Clone`-able value — there is no global mutable state (spec.
/// §9): a caller builds one `FormatterSettings`, wraps it in an `Rc`, and
/// every `Driver`/`Route` built from it shares the same immutable
/// defaults.
#[derive(Debug, Clone)]
pub struct FormatterSettings {
    /// The reserved mapping key naming a tagged object's concrete type.
    pub class_tag_key: String,
    /// The reserved mapping key carrying schema-version metadata.
    pub version_tag_key: String,
    /// Default semantics, consulted when a route has no more specific
    /// override (spec. §4.1 "delegates to the formatter's default
    /// registry").
    defaults: Vec<Semantic>,
}

impl Default for FormatterSettings {
    fn default() -> Self {
        FormatterSettings {
            class_tag_key: "__class__".to_string(),
            version_tag_key: "__version__".to_string(),
            defaults: vec![
                Semantic::AutoPreserveReferences(true),
                Semantic::AutoKeySerializableDictType(true),
                Semantic::DetonateDanglingPreservedReferences(true),
                Semantic::ResolvePreservedReferences(true),
                Semantic::PreserveSerializableKeyOrdering(false),
                Semantic::SerializeNoneVersionInfo(false),
            ],
        }
    }
}

impl FormatterSettings {
    /// Override the class-tag key.
    pub fn with_class_tag_key(mut self, key: impl Into<String>) -> Self {
        self.class_tag_key = key.into();
        self
    }

    /// Override the version-tag key.
    pub fn with_version_tag_key(mut self, key: impl Into<String>) -> Self {
        self.version_tag_key = key.into();
        self
    }

    /// Override a default semantic.
    pub fn with_default(mut self, semantic: Semantic) -> Self {
        let kind = semantic.kind();
        if let Some(slot) = self.defaults.iter_mut().find(|s| s.kind() == kind) {
            *slot = semantic;
        } else {
            self.defaults.push(semantic);
        }
        self
    }

    /// The crate's default semantic for `kind`, if any.
    pub fn default_semantic(&self, kind: SemanticKind) -> Option<&Semantic> {
        self.defaults.iter().find(|s| s.kind() == kind)
    }

    /// Encode a path to its string form. `Path::to_path_string` already
    /// implements the reversible encoding this method forwards to; kept as
    /// a method on `FormatterSettings` so formats can override the codec
    /// without touching `Path` itself (spec. §6 "the path↔string
    /// conversion").
    pub fn path_to_str(&self, path: &Path) -> String {
        path.to_path_string()
    }

    /// Decode a path string back to a `Path`.
    pub fn str_to_path(&self, s: &str) -> Result<Path, crate::error::PathError> {
        Path::parse_path_string(s)
    }
}

//! Bidirectional mapping between object identity and document path (spec.
//! §3 "Identity cache").

use std::collections::HashMap;
use std::rc::Rc;

/// Serialize-side identity bookkeeping: `object identity -> path string`,
/// plus the strong-handle "lifecycle" collection that keeps identities
/// from being recycled mid-traversal (spec. §3 invariant, §9 "hold strong
/// handles for the traversal's lifetime").
///
/// Generic over the handle type `H` held in the lifecycle list: the driver
/// passes in whatever `Rc<dyn ...>` it is traversing, so this module does
/// not need to know the object-graph's value trait.
pub struct SerializeIdCache<H> {
    paths: HashMap<usize, String>,
    lifecycle: Vec<H>,
}

impl<H> Default for SerializeIdCache<H> {
    fn default() -> Self {
        SerializeIdCache {
            paths: HashMap::new(),
            lifecycle: Vec::new(),
        }
    }
}

impl<H: Clone> SerializeIdCache<H> {
    /// A fresh, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check in `obj` at the current path. If its identity was already
    /// seen, returns the path it was first seen at (the caller replaces
    /// `obj` with a [`crate::reference::PreservedReference`]). Otherwise
    /// records `obj` at `current_path`, holds a strong handle to it for the
    /// remainder of the traversal, and returns `None`.
    pub fn check_in(&mut self, identity: usize, handle: H, current_path: &str) -> Option<String> {
        if let Some(existing) = self.paths.get(&identity) {
            return Some(existing.clone());
        }
        self.paths.insert(identity, current_path.to_string());
        self.lifecycle.push(handle);
        None
    }

    /// Remove a cached identity, e.g. the NoneType sentinel (spec. §4.3
    /// "the NoneType handler explicitly deletes any cached entry for the
    /// sentinel null identity to avoid cross-graph reuse").
    pub fn forget(&mut self, identity: usize) {
        self.paths.remove(&identity);
    }

    /// Whether the cache holds no entries. Used by the finalization-hygiene
    /// test (spec. §8) to assert per-traversal state resets cleanly.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.lifecycle.is_empty()
    }

    /// Drop every held identity and strong handle.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.lifecycle.clear();
    }
}

/// Deserialize-side identity bookkeeping: `path string -> materialized
/// value`.
pub struct DeserializeIdCache<V> {
    values: HashMap<String, V>,
}

impl<V> Default for DeserializeIdCache<V> {
    fn default() -> Self {
        DeserializeIdCache {
            values: HashMap::new(),
        }
    }
}

impl<V: Clone> DeserializeIdCache<V> {
    /// A fresh, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the materialized value for `path`.
    pub fn insert(&mut self, path: impl Into<String>, value: V) {
        self.values.insert(path.into(), value);
    }

    /// Look up the materialized value for `path`, if any.
    pub fn get(&self, path: &str) -> Option<V> {
        self.values.get(path).cloned()
    }

    /// Whether `path` has already been materialized.
    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop every cached value.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_visit_returns_none_second_returns_path() {
        let mut cache: SerializeIdCache<Rc<i32>> = SerializeIdCache::new();
        let handle = Rc::new(42i32);
        assert_eq!(cache.check_in(1, Rc::clone(&handle), "/a"), None);
        assert_eq!(
            cache.check_in(1, Rc::clone(&handle), "/b"),
            Some("/a".to_string())
        );
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}

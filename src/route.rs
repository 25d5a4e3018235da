//! Per-traversal state: the current handler's view of the world.
//!
//! Grounded on the original `Route`/`FormatterFrame` split (spec. §4.1):
//! a `Route` is single-use, owned by one driver call, and `branch()`
//! produces a child that shares the finalizer list but has its own
//! semantics.

use std::cell::RefCell;
use std::rc::Rc;

use crate::formatter::FormatterSettings;
use crate::semantics::{Semantic, SemanticKind, SemanticMap};

/// A callback registered to run during finalization, in subscription
/// order. Receives nothing beyond its captured state — deferred wiring
/// (e.g. resolving a lingering reference, invoking a
/// `NotifyFinalizedMethodName` callback) is expected to have captured
/// whatever it needs when it was subscribed.
pub type FinalizeSubscriber = Box<dyn FnOnce()>;

#[derive(Default)]
struct FinalizeList(RefCell<Vec<FinalizeSubscriber>>);

/// Per-traversal state carrying the active handler context, semantics,
/// and finalization subscribers (spec. §3 "Route").
pub struct Route {
    /// Route-scoped semantics: visible to this route and all descendants
    /// produced by `branch()`.
    semantics: SemanticMap,
    /// Frame-scoped semantics this route was handed by its parent at
    /// `branch()` time: visible to this route's own lookups, but never
    /// copied any further (spec. §4.1 "the very next child frame observes
    /// it but further descendants do not").
    frame_semantics: SemanticMap,
    /// Frame-scoped semantics staged by this route via `add_frame_semantic`,
    /// waiting to be handed to the next `branch()` child and then cleared.
    pending_frame: SemanticMap,
    finalize: Rc<FinalizeList>,
    settings: Rc<FormatterSettings>,
}

impl Route {
    /// A fresh root route using `settings`' defaults.
    pub fn new(settings: Rc<FormatterSettings>) -> Self {
        Route {
            semantics: SemanticMap::new(),
            frame_semantics: SemanticMap::new(),
            pending_frame: SemanticMap::new(),
            finalize: Rc::new(FinalizeList::default()),
            settings,
        }
    }

    /// The formatter settings this traversal is using.
    pub fn settings(&self) -> &FormatterSettings {
        &self.settings
    }

    /// Look up a semantic: frame-scoped value (inherited from the parent
    /// for this frame only), then route-scoped value, then the formatter's
    /// default. Returns `None` if nothing set it.
    pub fn get_semantic(&self, kind: SemanticKind) -> Option<&Semantic> {
        self.frame_semantics
            .get(kind)
            .or_else(|| self.semantics.get(kind))
            .or_else(|| self.settings.default_semantic(kind))
    }

    /// Convenience: look up a boolean semantic, defaulting to `false` if
    /// entirely unset.
    pub fn get_bool(&self, kind: SemanticKind) -> bool {
        self.get_semantic(kind).and_then(Semantic::as_bool).unwrap_or(false)
    }

    /// Install a route-scoped semantic: visible to this route and every
    /// descendant branched from it.
    pub fn add_semantic(&mut self, semantic: Semantic) {
        self.semantics.set(semantic);
    }

    /// Stage a frame-scoped semantic: handed to the very next `branch()`
    /// child (visible to that child's own lookups only), then discarded —
    /// the child's own descendants never see it (spec. §4.1).
    pub fn add_frame_semantic(&mut self, semantic: Semantic) {
        self.pending_frame.set(semantic);
    }

    /// Register a callback to run, in subscription order, during
    /// finalization.
    pub fn subscribe_finalize(&self, cb: FinalizeSubscriber) {
        self.finalize.0.borrow_mut().push(cb);
    }

    /// Run and clear all finalize subscribers, in subscription order.
    pub(crate) fn run_finalize(&self) {
        let subs: Vec<_> = self.finalize.0.borrow_mut().drain(..).collect();
        for sub in subs {
            sub();
        }
    }

    /// Produce a child route: shares the finalizer list (spec. "sharing
    /// the finalizer list"), inherits route-scoped semantics as a starting
    /// point, and receives this route's staged frame-scoped semantics for
    /// its own lookups only — consuming them, so a second `branch()` call
    /// (e.g. a sibling in the same loop) does not also receive them unless
    /// `add_frame_semantic` is called again first.
    pub fn branch(&mut self) -> Route {
        let child = Route {
            semantics: self.semantics.clone(),
            frame_semantics: self.pending_frame.clone(),
            pending_frame: SemanticMap::new(),
            finalize: Rc::clone(&self.finalize),
            settings: Rc::clone(&self.settings),
        };
        self.pending_frame.clear();
        child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::FormatterSettings;

    #[test]
    fn frame_scoped_semantic_reaches_only_the_immediate_child() {
        let mut route = Route::new(Rc::new(FormatterSettings::default()));
        route.add_frame_semantic(Semantic::AutoPreserveReferences(false));
        // staged, not yet visible on `route` itself (it was never added
        // route-scoped, only handed to the next branch)
        assert_eq!(route.get_bool(SemanticKind::AutoPreserveReferences), true);
        let mut child = route.branch();
        assert_eq!(child.get_bool(SemanticKind::AutoPreserveReferences), false);
        let grandchild = child.branch();
        assert_eq!(grandchild.get_bool(SemanticKind::AutoPreserveReferences), true);
    }

    #[test]
    fn a_second_branch_does_not_see_a_consumed_frame_semantic() {
        let mut route = Route::new(Rc::new(FormatterSettings::default()));
        route.add_frame_semantic(Semantic::AutoPreserveReferences(false));
        let _first_child = route.branch();
        let second_child = route.branch();
        assert_eq!(second_child.get_bool(SemanticKind::AutoPreserveReferences), true);
    }

    #[test]
    fn route_scoped_semantic_is_inherited() {
        let mut route = Route::new(Rc::new(FormatterSettings::default()));
        route.add_semantic(Semantic::AutoPreserveReferences(false));
        let child = route.branch();
        assert_eq!(child.get_bool(SemanticKind::AutoPreserveReferences), false);
    }

    #[test]
    fn finalize_runs_in_subscription_order() {
        let route = Route::new(Rc::new(FormatterSettings::default()));
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let order = Rc::clone(&order);
            route.subscribe_finalize(Box::new(move || order.borrow_mut().push(i)));
        }
        route.run_finalize();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }
}

//! Lifetime tracking for the destructor-insertion overlay.
//!
//! An ordered list of `(declaration, scope id)` pairs, pushed on scope entry
//! and on each tracked local declaration. Scope exit walks the list from the
//! most recently declared entry backwards *within the current scope only*;
//! a `return` walks back to the enclosing function start and suppresses the
//! scope-end unwind for everything it covered.
//!
//! The tracker only does bookkeeping; the statement rules turn the returned
//! declaration lists into destructor calls or explanatory comments.

use lucid_ir::DeclId;

#[derive(Copy, Clone, Debug)]
struct LifetimeEntry {
    /// `None` marks a scope boundary.
    decl: Option<DeclId>,
    /// Boundary entry opened a function body.
    func_start: bool,
    scope: u32,
}

/// Tracks which locals are alive per scope.
#[derive(Default)]
pub struct LifetimeTracker {
    enabled: bool,
    objects: Vec<LifetimeEntry>,
    scope_counter: u32,
}

impl LifetimeTracker {
    pub fn new(enabled: bool) -> Self {
        LifetimeTracker {
            enabled,
            objects: Vec::new(),
            scope_counter: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enter a scope; `func_start` marks a function body.
    pub fn start_scope(&mut self, func_start: bool) {
        if !self.enabled {
            return;
        }
        self.scope_counter += 1;
        self.objects.push(LifetimeEntry {
            decl: None,
            func_start,
            scope: self.scope_counter,
        });
    }

    /// Track a local declaration. Callers skip pointers, rvalue-reference
    /// bindings and anything already recorded.
    pub fn add(&mut self, decl: DeclId) {
        if !self.enabled {
            return;
        }
        if self.contains(decl) {
            return;
        }
        self.objects.push(LifetimeEntry {
            decl: Some(decl),
            func_start: false,
            scope: self.scope_counter,
        });
    }

    /// Whether a declaration is already tracked (lifetime-extended
    /// temporaries get recorded right after the object that extends them).
    pub fn contains(&self, decl: DeclId) -> bool {
        self.objects.iter().any(|e| e.decl == Some(decl))
    }

    /// Locals to destroy at a `return`, most recently declared first,
    /// up to the enclosing function start.
    pub fn on_return(&self) -> Vec<DeclId> {
        if !self.enabled {
            return Vec::new();
        }
        let mut out = Vec::new();
        for entry in self.objects.iter().rev() {
            if entry.func_start {
                break;
            }
            if let Some(decl) = entry.decl {
                out.push(decl);
            }
        }
        out
    }

    /// Locals to destroy at normal scope end, most recently declared first,
    /// restricted to the current scope. `covered_by_return` suppresses the
    /// unwind (a `return` already emitted it) but still closes the scope.
    pub fn end_scope(&mut self, covered_by_return: bool) -> Vec<DeclId> {
        if !self.enabled {
            return Vec::new();
        }
        let mut out = Vec::new();
        if !covered_by_return {
            for entry in self.objects.iter().rev() {
                if entry.scope != self.scope_counter {
                    break;
                }
                if let Some(decl) = entry.decl {
                    out.push(decl);
                }
            }
        }
        self.remove_top();
        out
    }

    fn remove_top(&mut self) {
        let scope = self.scope_counter;
        self.objects.retain(|e| e.scope != scope);
        self.scope_counter = self.scope_counter.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decl(n: u32) -> DeclId {
        DeclId::new(n)
    }

    #[test]
    fn disabled_tracker_is_inert() {
        let mut tracker = LifetimeTracker::new(false);
        tracker.start_scope(true);
        tracker.add(decl(1));
        assert_eq!(tracker.end_scope(false), Vec::<DeclId>::new());
    }

    #[test]
    fn scope_end_unwinds_in_reverse() {
        let mut tracker = LifetimeTracker::new(true);
        tracker.start_scope(true);
        tracker.add(decl(1));
        tracker.add(decl(2));
        assert_eq!(tracker.end_scope(false), vec![decl(2), decl(1)]);
    }

    #[test]
    fn inner_scope_does_not_unwind_outer_locals() {
        let mut tracker = LifetimeTracker::new(true);
        tracker.start_scope(true);
        tracker.add(decl(1));
        tracker.start_scope(false);
        tracker.add(decl(2));
        assert_eq!(tracker.end_scope(false), vec![decl(2)]);
        assert_eq!(tracker.end_scope(false), vec![decl(1)]);
    }

    #[test]
    fn return_unwinds_to_function_start() {
        let mut tracker = LifetimeTracker::new(true);
        tracker.start_scope(true);
        tracker.add(decl(1));
        tracker.start_scope(false);
        tracker.add(decl(2));
        assert_eq!(tracker.on_return(), vec![decl(2), decl(1)]);
    }

    #[test]
    fn return_suppresses_scope_end_unwind() {
        let mut tracker = LifetimeTracker::new(true);
        tracker.start_scope(true);
        tracker.add(decl(1));
        assert_eq!(tracker.end_scope(true), Vec::<DeclId>::new());
    }

    #[test]
    fn duplicates_are_not_tracked_twice() {
        let mut tracker = LifetimeTracker::new(true);
        tracker.start_scope(true);
        tracker.add(decl(1));
        tracker.add(decl(1));
        assert_eq!(tracker.end_scope(false), vec![decl(1)]);
    }
}

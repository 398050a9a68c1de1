//! Global feature flags.
//!
//! One bit per "this run required supporting declaration X". Writes are
//! monotonic; the driver reads the table once at end of run and prepends the
//! resolved boilerplate. The table lives in the session, so independent runs
//! start clean.

use bitflags::bitflags;

bitflags! {
    /// Supporting declarations a run turned out to need.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FeatureFlags: u32 {
        /// Dynamic allocation (`operator new` / `malloc`).
        const ALLOC = 1 << 0;
        /// Placement new for promise construction.
        const PLACEMENT_NEW = 1 << 1;
        /// Exception handling scaffolding.
        const EXCEPTIONS = 1 << 2;
        /// `NULL` (stddef).
        const STDDEF = 1 << 3;
        /// `_Static_assert` (assert header).
        const ASSERT = 1 << 4;
        /// The dispatch-table entry type.
        const VTABLE = 1 << 5;
        /// Array construction/destruction helpers.
        const VEC_HELPERS = 1 << 6;
    }
}

/// Boilerplate lines for each flag, in the fixed order the driver prepends
/// them. The order is part of the contract: headers first, then synthesized
/// support types, then helper declarations.
const BOILERPLATE: [(FeatureFlags, &[&str]); 7] = [
    (FeatureFlags::STDDEF, &["#include <stddef.h>"]),
    (FeatureFlags::ASSERT, &["#include <assert.h>"]),
    (FeatureFlags::ALLOC, &["#include <stdlib.h>"]),
    (
        FeatureFlags::PLACEMENT_NEW,
        &["#include <new> /* placement new */"],
    ),
    (
        FeatureFlags::EXCEPTIONS,
        &["#include <exception>"],
    ),
    (
        FeatureFlags::VTABLE,
        &[
            "struct __mptr",
            "{",
            "  long __delta;",
            "  int __index;",
            "  void (*__fn)();",
            "};",
        ],
    ),
    (
        FeatureFlags::VEC_HELPERS,
        &[
            "void * __vec_new(void * __ptr, size_t __size, int __count, void * __ctor);",
            "void __vec_delete(void * __ptr, size_t __size, int __count, void * __dtor);",
        ],
    ),
];

/// Resolve the flag table into the ordered preamble.
pub fn resolve_preamble(flags: FeatureFlags) -> Vec<String> {
    let mut lines = Vec::new();
    for (flag, text) in BOILERPLATE {
        if flags.contains(flag) {
            lines.extend(text.iter().map(|s| (*s).to_owned()));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_flags_empty_preamble() {
        assert_eq!(resolve_preamble(FeatureFlags::empty()), Vec::<String>::new());
    }

    #[test]
    fn preamble_order_is_fixed() {
        let lines = resolve_preamble(FeatureFlags::ALLOC | FeatureFlags::STDDEF);
        assert_eq!(lines, vec!["#include <stddef.h>", "#include <stdlib.h>"]);
    }

    #[test]
    fn vtable_flag_emits_entry_type() {
        let lines = resolve_preamble(FeatureFlags::VTABLE);
        assert!(lines.iter().any(|l| l.contains("__delta")));
        assert!(lines.iter().any(|l| l.contains("void (*__fn)()")));
    }

    #[test]
    fn flags_are_monotonic() {
        let mut flags = FeatureFlags::empty();
        flags |= FeatureFlags::ALLOC;
        flags |= FeatureFlags::ALLOC;
        assert_eq!(resolve_preamble(flags).len(), 1);
    }
}

//! Node ids and ranges.
//!
//! All tree children are `u32` indices into the arena, never boxes; lists of
//! children are half-open ranges into side tables. Ids are cheap to copy and
//! to hash, which is what lets lowering passes read a node by value and then
//! synthesize new nodes into the same arena.

use std::fmt;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// Declaration node id.
    DeclId
);
define_id!(
    /// Statement node id.
    StmtId
);
define_id!(
    /// Expression node id.
    ExprId
);
define_id!(
    /// Interned type id.
    TypeId
);

macro_rules! define_range {
    ($(#[$doc:meta])* $name:ident => $id:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub struct $name {
            pub start: u32,
            pub end: u32,
        }

        impl $name {
            pub const EMPTY: $name = $name { start: 0, end: 0 };

            #[inline]
            pub const fn new(start: u32, end: u32) -> Self {
                $name { start, end }
            }

            #[inline]
            pub const fn len(self) -> usize {
                (self.end - self.start) as usize
            }

            #[inline]
            pub const fn is_empty(self) -> bool {
                self.start == self.end
            }
        }
    };
}

define_range!(
    /// Range of declaration ids in the arena's decl-list table.
    DeclRange => DeclId
);
define_range!(
    /// Range of statement ids in the arena's stmt-list table.
    StmtRange => StmtId
);
define_range!(
    /// Range of expression ids in the arena's expr-list table.
    ExprRange => ExprId
);
define_range!(
    /// Range of type ids in the type interner's param table.
    TypeRange => TypeId
);
define_range!(
    /// Range of closure captures in the arena's capture table.
    CaptureRange => ExprId
);
define_range!(
    /// Range of base-class specifiers in the arena's base table.
    BaseRange => DeclId
);
define_range!(
    /// Range of constructor member initializers.
    CtorInitRange => ExprId
);

//! Program tree for the Lucid lowering engine.
//!
//! This crate holds everything the lowering passes consume and fabricate:
//!
//! 1. **Spans and a line index** - byte ranges plus line/column lookup, the
//!    basis of the deterministic naming scheme for synthesized entities.
//! 2. **Interners** - strings and types, addressed by 4-byte handles.
//! 3. **Nodes** - declarations, statements and expressions as closed sums
//!    with `Copy` payloads, stored in a [`NodeArena`].
//! 4. **Synthesis helpers** - the [`build`] module, used by every pass to
//!    manufacture replacement fragments.
//!
//! The tree arrives fully resolved: the front end has already performed name
//! resolution, overload resolution and template instantiation. Lowering never
//! rewrites a node it did not synthesize.

pub mod arena;
pub mod build;
mod ids;
mod interner;
mod line_index;
mod name;
pub mod node;
mod span;
pub mod types;

pub use arena::NodeArena;
pub use ids::{
    BaseRange, CaptureRange, CtorInitRange, DeclId, DeclRange, ExprId, ExprRange, StmtId,
    StmtRange, TypeId, TypeRange,
};
pub use interner::StringInterner;
pub use line_index::{LineCol, LineIndex};
pub use name::Name;
pub use node::{
    Access, BaseSpecifier, BinaryOp, BindingAccess, Capture, CaptureKind, CastKind, CastStyle,
    CtorInit, CtorTarget, Decl, DeclKind, Expr, ExprKind, FnDecl, FnFlags, FnRole, FoldDirection,
    RecordDecl, RecordTag, Stmt, StmtKind, StorageClass, SuspendKind, UnaryOp, VarDecl,
};
pub use span::{Span, SpanError};
pub use types::{BuiltinKind, Quals, Type, TypeInterner, TypeKind};

/// A fully resolved program as handed over by the front end.
///
/// Top-level declarations are listed in declaration order; the
/// virtual-dispatch backend relies on that order when populating its
/// this-pointer offset map.
pub struct Module {
    pub arena: NodeArena,
    pub types: TypeInterner,
    pub interner: StringInterner,
    pub top_level: Vec<DeclId>,
    pub line_index: LineIndex,
}

impl Module {
    /// An empty module with fresh interners. Primarily for tests and for
    /// drivers that build trees programmatically.
    pub fn new() -> Self {
        Module {
            arena: NodeArena::new(),
            types: TypeInterner::new(),
            interner: StringInterner::new(),
            top_level: Vec::new(),
            line_index: LineIndex::default(),
        }
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

/// Spanned nodes expose their span uniformly.
pub trait Spanned {
    fn span(&self) -> Span;
}

impl Spanned for Decl {
    fn span(&self) -> Span {
        self.span
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

//! Node arena.
//!
//! Contiguous storage for all tree nodes plus the side tables child ranges
//! point into. The front end fills it during hand-over; lowering passes
//! append synthetic fragments to the same arena. Reads return copies, so a
//! pass can hold a node while allocating new ones.

use crate::{
    BaseRange, BaseSpecifier, Capture, CaptureRange, CtorInit, CtorInitRange, Decl, DeclId,
    DeclKind, DeclRange, Expr, ExprId, ExprKind, ExprRange, Span, Stmt, StmtId, StmtKind,
    StmtRange, TypeId,
};

/// Arena for declarations, statements and expressions.
#[derive(Default)]
pub struct NodeArena {
    decls: Vec<Decl>,
    stmts: Vec<Stmt>,
    exprs: Vec<Expr>,

    decl_lists: Vec<DeclId>,
    stmt_lists: Vec<StmtId>,
    expr_lists: Vec<ExprId>,
    captures: Vec<Capture>,
    bases: Vec<BaseSpecifier>,
    ctor_inits: Vec<CtorInit>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    // --- reads (by value; nodes are Copy) ---

    #[inline]
    pub fn decl(&self, id: DeclId) -> Decl {
        self.decls[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> Stmt {
        self.stmts[id.index()]
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> Expr {
        self.exprs[id.index()]
    }

    #[inline]
    pub fn decl_list(&self, range: DeclRange) -> &[DeclId] {
        &self.decl_lists[range.start as usize..range.end as usize]
    }

    #[inline]
    pub fn stmt_list(&self, range: StmtRange) -> &[StmtId] {
        &self.stmt_lists[range.start as usize..range.end as usize]
    }

    #[inline]
    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.start as usize..range.end as usize]
    }

    #[inline]
    pub fn capture_list(&self, range: CaptureRange) -> &[Capture] {
        &self.captures[range.start as usize..range.end as usize]
    }

    #[inline]
    pub fn base_list(&self, range: BaseRange) -> &[BaseSpecifier] {
        &self.bases[range.start as usize..range.end as usize]
    }

    #[inline]
    pub fn ctor_init_list(&self, range: CtorInitRange) -> &[CtorInit] {
        &self.ctor_inits[range.start as usize..range.end as usize]
    }

    // --- allocation ---

    pub fn alloc_decl(&mut self, kind: DeclKind, span: Span) -> DeclId {
        let id = DeclId::new(self.decls.len() as u32);
        self.decls.push(Decl { kind, span });
        id
    }

    pub fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        let id = StmtId::new(self.stmts.len() as u32);
        self.stmts.push(Stmt { kind, span });
        id
    }

    pub fn alloc_expr(&mut self, kind: ExprKind, ty: TypeId, span: Span) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        self.exprs.push(Expr { kind, ty, span });
        id
    }

    pub fn alloc_decl_list(&mut self, ids: &[DeclId]) -> DeclRange {
        let start = self.decl_lists.len() as u32;
        self.decl_lists.extend_from_slice(ids);
        DeclRange::new(start, self.decl_lists.len() as u32)
    }

    pub fn alloc_stmt_list(&mut self, ids: &[StmtId]) -> StmtRange {
        let start = self.stmt_lists.len() as u32;
        self.stmt_lists.extend_from_slice(ids);
        StmtRange::new(start, self.stmt_lists.len() as u32)
    }

    pub fn alloc_expr_list(&mut self, ids: &[ExprId]) -> ExprRange {
        let start = self.expr_lists.len() as u32;
        self.expr_lists.extend_from_slice(ids);
        ExprRange::new(start, self.expr_lists.len() as u32)
    }

    pub fn alloc_captures(&mut self, captures: &[Capture]) -> CaptureRange {
        let start = self.captures.len() as u32;
        self.captures.extend_from_slice(captures);
        CaptureRange::new(start, self.captures.len() as u32)
    }

    pub fn alloc_bases(&mut self, bases: &[BaseSpecifier]) -> BaseRange {
        let start = self.bases.len() as u32;
        self.bases.extend_from_slice(bases);
        BaseRange::new(start, self.bases.len() as u32)
    }

    pub fn alloc_ctor_inits(&mut self, inits: &[CtorInit]) -> CtorInitRange {
        let start = self.ctor_inits.len() as u32;
        self.ctor_inits.extend_from_slice(inits);
        CtorInitRange::new(start, self.ctor_inits.len() as u32)
    }

    /// Replace the kind of a declaration the current session synthesized.
    ///
    /// Front-end nodes are never rewritten; this exists so a synthesized
    /// record can grow members while a pass walks the tree.
    pub fn replace_decl(&mut self, id: DeclId, kind: DeclKind) {
        if let Some(slot) = self.decls.get_mut(id.index()) {
            slot.kind = kind;
        }
    }

    /// Number of declarations currently allocated.
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// Number of expressions currently allocated.
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn alloc_and_read_back() {
        let mut arena = NodeArena::new();
        let e = arena.alloc_expr(ExprKind::IntLit(42), TypeId::INT, Span::DUMMY);
        let expr = arena.expr(e);
        assert_eq!(expr.kind, ExprKind::IntLit(42));
        assert_eq!(expr.ty, TypeId::INT);
    }

    #[test]
    fn lists_are_ranges() {
        let mut arena = NodeArena::new();
        let a = arena.alloc_expr(ExprKind::IntLit(1), TypeId::INT, Span::DUMMY);
        let b = arena.alloc_expr(ExprKind::IntLit(2), TypeId::INT, Span::DUMMY);
        let range = arena.alloc_expr_list(&[a, b]);
        assert_eq!(arena.expr_list(range), &[a, b]);
    }

    #[test]
    fn reads_allow_further_allocation() {
        let mut arena = NodeArena::new();
        let e = arena.alloc_expr(ExprKind::IntLit(5), TypeId::INT, Span::DUMMY);
        let copied = arena.expr(e);
        // Holding the copy, the arena is free to grow.
        let f = arena.alloc_expr(copied.kind, copied.ty, copied.span);
        assert_eq!(arena.expr(f).kind, ExprKind::IntLit(5));
    }
}

//! Synthesis helpers.
//!
//! Constructors for the tree fragments the lowering passes fabricate:
//! frame records, dispatch tables, resume functions, explanatory comments.
//! Everything built here carries [`Span::DUMMY`] and is owned by the arena
//! of the current lowering session.

use crate::{
    BinaryOp, CtorInitRange, DeclId, DeclKind, ExprId, ExprKind, FnDecl, FnFlags, FnRole, Name,
    NodeArena, RecordDecl, RecordTag, Span, StmtId, StmtKind, StorageClass, TypeId, UnaryOp,
    VarDecl,
};

// --- expressions ---

pub fn int_lit(arena: &mut NodeArena, value: i64) -> ExprId {
    arena.alloc_expr(ExprKind::IntLit(value), TypeId::INT, Span::DUMMY)
}

pub fn bool_lit(arena: &mut NodeArena, value: bool) -> ExprId {
    arena.alloc_expr(ExprKind::BoolLit(value), TypeId::BOOL, Span::DUMMY)
}

pub fn nullptr_lit(arena: &mut NodeArena) -> ExprId {
    arena.alloc_expr(ExprKind::NullptrLit, TypeId::NULLPTR_T, Span::DUMMY)
}

pub fn decl_ref(arena: &mut NodeArena, decl: DeclId, ty: TypeId) -> ExprId {
    arena.alloc_expr(ExprKind::DeclRef(decl), ty, Span::DUMMY)
}

pub fn member(arena: &mut NodeArena, base: ExprId, field: DeclId, arrow: bool, ty: TypeId) -> ExprId {
    arena.alloc_expr(
        ExprKind::Member {
            base,
            member: field,
            arrow,
        },
        ty,
        Span::DUMMY,
    )
}

pub fn assign(arena: &mut NodeArena, lhs: ExprId, rhs: ExprId, ty: TypeId) -> ExprId {
    arena.alloc_expr(
        ExprKind::Binary {
            op: BinaryOp::Assign,
            lhs,
            rhs,
        },
        ty,
        Span::DUMMY,
    )
}

pub fn binary(arena: &mut NodeArena, op: BinaryOp, lhs: ExprId, rhs: ExprId, ty: TypeId) -> ExprId {
    arena.alloc_expr(ExprKind::Binary { op, lhs, rhs }, ty, Span::DUMMY)
}

pub fn unary(arena: &mut NodeArena, op: UnaryOp, operand: ExprId, ty: TypeId) -> ExprId {
    arena.alloc_expr(ExprKind::Unary { op, operand }, ty, Span::DUMMY)
}

pub fn not(arena: &mut NodeArena, operand: ExprId) -> ExprId {
    unary(arena, UnaryOp::Not, operand, TypeId::BOOL)
}

pub fn addr_of(arena: &mut NodeArena, operand: ExprId, ty: TypeId) -> ExprId {
    unary(arena, UnaryOp::AddrOf, operand, ty)
}

pub fn deref(arena: &mut NodeArena, operand: ExprId, ty: TypeId) -> ExprId {
    unary(arena, UnaryOp::Deref, operand, ty)
}

pub fn call(arena: &mut NodeArena, callee: ExprId, args: &[ExprId], ty: TypeId) -> ExprId {
    let args = arena.alloc_expr_list(args);
    arena.alloc_expr(ExprKind::Call { callee, args }, ty, Span::DUMMY)
}

pub fn index(arena: &mut NodeArena, base: ExprId, idx: ExprId, ty: TypeId) -> ExprId {
    arena.alloc_expr(ExprKind::Index { base, index: idx }, ty, Span::DUMMY)
}

pub fn paren(arena: &mut NodeArena, sub: ExprId, ty: TypeId) -> ExprId {
    arena.alloc_expr(ExprKind::Paren { sub }, ty, Span::DUMMY)
}

pub fn sizeof_type(arena: &mut NodeArena, ty: TypeId) -> ExprId {
    arena.alloc_expr(ExprKind::SizeOf { ty }, TypeId::ULONG, Span::DUMMY)
}

// --- statements ---

pub fn expr_stmt(arena: &mut NodeArena, expr: ExprId) -> StmtId {
    arena.alloc_stmt(StmtKind::Expr { expr }, Span::DUMMY)
}

pub fn null_stmt(arena: &mut NodeArena) -> StmtId {
    arena.alloc_stmt(StmtKind::Null, Span::DUMMY)
}

pub fn comment(arena: &mut NodeArena, text: Name) -> StmtId {
    arena.alloc_stmt(StmtKind::Comment { text }, Span::DUMMY)
}

pub fn compound(arena: &mut NodeArena, stmts: &[StmtId]) -> StmtId {
    let stmts = arena.alloc_stmt_list(stmts);
    arena.alloc_stmt(StmtKind::Compound { stmts }, Span::DUMMY)
}

pub fn if_stmt(arena: &mut NodeArena, cond: ExprId, then_branch: StmtId) -> StmtId {
    arena.alloc_stmt(
        StmtKind::If {
            cond,
            then_branch,
            else_branch: None,
        },
        Span::DUMMY,
    )
}

pub fn return_stmt(arena: &mut NodeArena, value: Option<ExprId>) -> StmtId {
    arena.alloc_stmt(StmtKind::Return { value }, Span::DUMMY)
}

pub fn goto_stmt(arena: &mut NodeArena, label: Name) -> StmtId {
    arena.alloc_stmt(StmtKind::Goto { label }, Span::DUMMY)
}

pub fn label_stmt(arena: &mut NodeArena, name: Name) -> StmtId {
    arena.alloc_stmt(StmtKind::Label { name, sub: None }, Span::DUMMY)
}

pub fn case_stmt(arena: &mut NodeArena, value: ExprId, body: StmtId) -> StmtId {
    arena.alloc_stmt(StmtKind::Case { value, body }, Span::DUMMY)
}

pub fn switch_stmt(arena: &mut NodeArena, cond: ExprId, body: StmtId) -> StmtId {
    arena.alloc_stmt(StmtKind::Switch { cond, body }, Span::DUMMY)
}

pub fn decl_stmt(arena: &mut NodeArena, decl: DeclId) -> StmtId {
    let decls = arena.alloc_decl_list(&[decl]);
    arena.alloc_stmt(StmtKind::Decl { decls }, Span::DUMMY)
}

// --- declarations ---

pub fn var(arena: &mut NodeArena, name: Name, ty: TypeId, init: Option<ExprId>) -> DeclId {
    arena.alloc_decl(
        DeclKind::Var(VarDecl {
            name,
            ty,
            init,
            storage: StorageClass::None,
            is_constexpr: false,
        }),
        Span::DUMMY,
    )
}

pub fn static_var(arena: &mut NodeArena, name: Name, ty: TypeId, init: Option<ExprId>) -> DeclId {
    arena.alloc_decl(
        DeclKind::Var(VarDecl {
            name,
            ty,
            init,
            storage: StorageClass::Static,
            is_constexpr: false,
        }),
        Span::DUMMY,
    )
}

pub fn param(arena: &mut NodeArena, name: Name, ty: TypeId) -> DeclId {
    arena.alloc_decl(DeclKind::Param { name, ty }, Span::DUMMY)
}

pub fn field(arena: &mut NodeArena, name: Name, ty: TypeId) -> DeclId {
    arena.alloc_decl(
        DeclKind::Field {
            name,
            ty,
            init: None,
        },
        Span::DUMMY,
    )
}

/// A free function with the given parameters and body.
pub fn function(
    arena: &mut NodeArena,
    name: Name,
    ret: TypeId,
    params: &[DeclId],
    body: Option<StmtId>,
) -> DeclId {
    let params = arena.alloc_decl_list(params);
    arena.alloc_decl(
        DeclKind::Function(FnDecl {
            name,
            role: FnRole::Free,
            ret,
            params,
            body,
            flags: FnFlags::empty(),
            parent: None,
            inits: CtorInitRange::EMPTY,
        }),
        Span::DUMMY,
    )
}

/// A plain struct with the given members and no bases.
pub fn record(arena: &mut NodeArena, name: Name, members: &[DeclId]) -> DeclId {
    let members = arena.alloc_decl_list(members);
    arena.alloc_decl(
        DeclKind::Record(RecordDecl {
            name,
            tag: RecordTag::Struct,
            bases: crate::BaseRange::EMPTY,
            members,
            has_definition: true,
        }),
        Span::DUMMY,
    )
}

/// Replace a record's member list. Used when a synthesized record grows
/// fields during a pass (coroutine frames).
pub fn set_record_members(arena: &mut NodeArena, record: DeclId, members: &[DeclId]) {
    let decl = arena.decl(record);
    if let DeclKind::Record(mut rd) = decl.kind {
        rd.members = arena.alloc_decl_list(members);
        arena.replace_decl(record, DeclKind::Record(rd));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn build_assignment() {
        let mut arena = NodeArena::new();
        let v = var(&mut arena, Name::EMPTY, TypeId::INT, None);
        let lhs = decl_ref(&mut arena, v, TypeId::INT);
        let rhs = int_lit(&mut arena, 3);
        let asg = assign(&mut arena, lhs, rhs, TypeId::INT);
        match arena.expr(asg).kind {
            ExprKind::Binary { op, .. } => assert_eq!(op, BinaryOp::Assign),
            other => panic!("expected binary assignment, got {other:?}"),
        }
    }

    #[test]
    fn synthesized_nodes_have_dummy_spans() {
        let mut arena = NodeArena::new();
        let c = comment(&mut arena, Name::EMPTY);
        assert!(arena.stmt(c).span.is_dummy());
    }

    #[test]
    fn grow_record_members() {
        let mut arena = NodeArena::new();
        let r = record(&mut arena, Name::EMPTY, &[]);
        let f = field(&mut arena, Name::EMPTY, TypeId::INT);
        set_record_members(&mut arena, r, &[f]);
        match arena.decl(r).kind {
            DeclKind::Record(rd) => assert_eq!(arena.decl_list(rd.members), &[f]),
            other => panic!("expected record, got {other:?}"),
        }
    }
}

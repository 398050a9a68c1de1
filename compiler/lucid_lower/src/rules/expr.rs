//! Expression rules.
//!
//! Mostly faithful re-printing; the lowering-visible parts are the
//! implicit-conversion reveal, fold expansion and the closure handling in
//! the sibling `lambda` module.

use lucid_ir::{CastKind, CastStyle, ExprId, ExprKind, FoldDirection, TypeKind};

use crate::dispatch::Backend;
use crate::printer::{unsupported, Printer};
use crate::rules::decl_name;
use crate::type_name::type_name;

pub fn float_lit(p: &mut Printer<'_, '_>, bits: u64) {
    let f = f64::from_bits(bits);
    if f.is_nan() {
        p.out.append("NAN");
    } else if f.is_infinite() {
        p.out
            .append(if f.is_sign_positive() { "INFINITY" } else { "-INFINITY" });
    } else {
        // Debug formatting preserves precision and keeps a decimal point.
        p.out.append(&format!("{f:?}"));
    }
}

pub fn decl_ref<B: Backend>(_b: &mut B, p: &mut Printer<'_, '_>, _id: ExprId, decl: lucid_ir::DeclId) {
    let name = decl_name(p, decl);
    p.out.append(name);
}

pub fn member<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let ExprKind::Member { base, member, arrow } = p.arena().expr(id).kind else {
        return;
    };
    b.expr(p, base);
    p.out.append(if arrow { "->" } else { "." });
    let name = decl_name(p, member);
    p.out.append(name);
}

pub fn call<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let ExprKind::Call { callee, args } = p.arena().expr(id).kind else {
        return;
    };
    b.expr(p, callee);
    paren_args(b, p, args);
}

pub fn member_call<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let ExprKind::MemberCall { callee, args } = p.arena().expr(id).kind else {
        return;
    };
    b.expr(p, callee);
    paren_args(b, p, args);
}

pub(crate) fn paren_args<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, args: lucid_ir::ExprRange) {
    p.out.append_char('(');
    let ids: Vec<ExprId> = p.arena().expr_list(args).to_vec();
    let mut needs_comma = false;
    for arg in ids {
        if needs_comma {
            p.out.append(", ");
        }
        needs_comma = true;
        b.expr(p, arg);
    }
    p.out.append_char(')');
}

pub fn unary<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let ExprKind::Unary { op, operand } = p.arena().expr(id).kind else {
        return;
    };
    if op.is_postfix() {
        b.expr(p, operand);
        p.out.append(op.spelling());
    } else {
        p.out.append(op.spelling());
        b.expr(p, operand);
    }
}

pub fn binary<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let ExprKind::Binary { op, lhs, rhs } = p.arena().expr(id).kind else {
        return;
    };
    b.expr(p, lhs);
    p.out.append(&format!(" {} ", op.spelling()));
    b.expr(p, rhs);
}

pub fn conditional<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let ExprKind::Conditional {
        cond,
        then_branch,
        else_branch,
    } = p.arena().expr(id).kind
    else {
        return;
    };
    b.expr(p, cond);
    p.out.append(" ? ");
    b.expr(p, then_branch);
    p.out.append(" : ");
    b.expr(p, else_branch);
}

pub fn index<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let ExprKind::Index { base, index } = p.arena().expr(id).kind else {
        return;
    };
    b.expr(p, base);
    p.out.append_char('[');
    b.expr(p, index);
    p.out.append_char(']');
}

/// Implicit-conversion reveal: value-category adjustments stay invisible,
/// everything that changes representation prints as an explicit cast.
pub fn implicit_cast<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let expr = p.arena().expr(id);
    let ExprKind::ImplicitCast { kind, sub } = expr.kind else {
        return;
    };
    match kind {
        CastKind::LValueToRValue
        | CastKind::NoOp
        | CastKind::ArrayToPointerDecay
        | CastKind::NullToPointer => b.expr(p, sub),
        CastKind::IntegralCast
        | CastKind::FloatingCast
        | CastKind::IntegralToFloating
        | CastKind::FloatingToIntegral
        | CastKind::IntegralToBoolean
        | CastKind::DerivedToBase => {
            let dest = type_name(p.sess, expr.ty);
            p.out.append(&format!("static_cast<{dest}>("));
            b.expr(p, sub);
            p.out.append_char(')');
        }
        CastKind::UserConversion => {
            let dest = type_name(p.sess, expr.ty);
            b.expr(p, sub);
            p.out.append(&format!(".operator {dest}()"));
        }
    }
}

pub fn explicit_cast<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let expr = p.arena().expr(id);
    let ExprKind::ExplicitCast { style, sub } = expr.kind else {
        return;
    };
    let dest = type_name(p.sess, expr.ty);
    match style {
        CastStyle::Static => {
            p.out.append(&format!("static_cast<{dest}>("));
            b.expr(p, sub);
            p.out.append_char(')');
        }
        CastStyle::Const => {
            p.out.append(&format!("const_cast<{dest}>("));
            b.expr(p, sub);
            p.out.append_char(')');
        }
        CastStyle::Reinterpret => {
            p.out.append(&format!("reinterpret_cast<{dest}>("));
            b.expr(p, sub);
            p.out.append_char(')');
        }
        CastStyle::CStyle => {
            p.out.append(&format!("({dest})"));
            b.expr(p, sub);
        }
        CastStyle::Functional => {
            p.out.append(&dest);
            p.out.append_char('(');
            b.expr(p, sub);
            p.out.append_char(')');
        }
    }
}

pub fn construct_expr<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let expr = p.arena().expr(id);
    let ExprKind::Construct { args, .. } = expr.kind else {
        return;
    };
    let name = type_name(p.sess, expr.ty);
    p.out.append(&name);
    paren_args(b, p, args);
}

pub fn new_expr<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let expr = p.arena().expr(id);
    let ExprKind::New { args, placement } = expr.kind else {
        return;
    };
    p.out.append("new ");
    if let Some(placement) = placement {
        // `new(addr) T(...)` - reveal the placement argument.
        p.out.append_char('(');
        b.expr(p, placement);
        p.out.append(") ");
    }
    // The expression's type is `T *`; spell the allocated type.
    let pointee = match p.types().get(expr.ty).kind {
        TypeKind::Pointer(inner) => inner,
        _ => expr.ty,
    };
    let name = type_name(p.sess, pointee);
    p.out.append(&name);
    paren_args(b, p, args);
}

pub fn delete_expr<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let ExprKind::Delete { operand, is_array } = p.arena().expr(id).kind else {
        return;
    };
    p.out.append(if is_array { "delete[] " } else { "delete " });
    b.expr(p, operand);
}

/// Fold expansion: the conceptual left/right fold with the resolved
/// operator spelling; initializer placement follows the direction.
pub fn fold<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let ExprKind::Fold {
        op,
        pack,
        init,
        direction,
    } = p.arena().expr(id).kind
    else {
        return;
    };
    let spelling = op.spelling();
    p.out.append_char('(');
    match direction {
        FoldDirection::Left => {
            // (init op ... op pack) / (... op pack)
            if let Some(init) = init {
                b.expr(p, init);
                p.out.append(&format!(" {spelling} "));
            }
            p.out.append(&format!("... {spelling} "));
            b.expr(p, pack);
        }
        FoldDirection::Right => {
            // (pack op ... op init) / (pack op ...)
            b.expr(p, pack);
            p.out.append(&format!(" {spelling} ..."));
            if let Some(init) = init {
                p.out.append(&format!(" {spelling} "));
                b.expr(p, init);
            }
        }
    }
    p.out.append_char(')');
}

pub fn init_list<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let ExprKind::InitList { elems } = p.arena().expr(id).kind else {
        return;
    };
    p.out.append_char('{');
    let ids: Vec<ExprId> = p.arena().expr_list(elems).to_vec();
    let mut needs_comma = false;
    for elem in ids {
        if needs_comma {
            p.out.append(", ");
        }
        needs_comma = true;
        b.expr(p, elem);
    }
    p.out.append_char('}');
}

/// Outside the coroutine backend a suspend point keeps its keyword syntax.
pub fn suspend_expr<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let expr = p.arena().expr(id);
    let ExprKind::Suspend { kind, operand, .. } = expr.kind else {
        unsupported!(p, expr.kind.kind_name());
        return;
    };
    p.out.append(kind.keyword());
    p.out.append_char(' ');
    b.expr(p, operand);
}

//! Statement rules.
//!
//! Contains the iterator-loop desugaring and the lifetime-overlay emission;
//! everything else is structural re-printing.

use lucid_ir::{DeclId, DeclKind, ExprId, StmtId, StmtKind, TypeKind};

use crate::dispatch::Backend;
use crate::hoist::HoistKind;
use crate::printer::Printer;
use crate::rules::decl_name;
use crate::type_name::type_name;

/// A compound statement in statement position.
pub fn compound<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    compound_with_scope(b, p, id, false);
}

/// A compound statement; `func_start` marks a function body for the
/// lifetime overlay's return unwinding.
pub fn compound_with_scope<B: Backend>(
    b: &mut B,
    p: &mut Printer<'_, '_>,
    id: StmtId,
    func_start: bool,
) {
    let StmtKind::Compound { stmts } = p.arena().stmt(id).kind else {
        b.stmt(p, id);
        return;
    };
    p.lifetime.start_scope(func_start);
    p.out.open_scope();
    let children: Vec<StmtId> = p.arena().stmt_list(stmts).to_vec();
    let mut last_was_return = false;
    for child in children {
        last_was_return = matches!(p.arena().stmt(child).kind, StmtKind::Return { .. });
        b.stmt(p, child);
    }
    let unwind = p.lifetime.end_scope(last_was_return);
    emit_lifetime_unwind(b, p, &unwind);
    p.out.close_scope(false);
    p.out.newline();
}

pub fn expr_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, expr: ExprId) {
    p.hoist.push(HoistKind::BinaryOperator, &p.out);
    b.expr(p, expr);
    p.out.append_semi_line();
    flush_hoist(p);
}

pub fn decl_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::Decl { decls } = p.arena().stmt(id).kind else {
        return;
    };
    let ids: Vec<DeclId> = p.arena().decl_list(decls).to_vec();
    for decl in ids {
        b.decl(p, decl);
        track_local_lifetime(p, decl);
    }
}

/// Register a local with the lifetime overlay, skipping pointers and
/// rvalue-reference bindings.
pub(crate) fn track_local_lifetime(p: &mut Printer<'_, '_>, decl: DeclId) {
    if !p.lifetime.enabled() {
        return;
    }
    if let DeclKind::Var(vd) = p.arena().decl(decl).kind {
        let types = p.types();
        if types.is_pointer(vd.ty) || types.is_rvalue_ref(vd.ty) {
            return;
        }
        p.lifetime.add(decl);
    }
}

pub fn if_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::If {
        cond,
        then_branch,
        else_branch,
    } = p.arena().stmt(id).kind
    else {
        return;
    };
    p.out.append("if(");
    b.expr(p, cond);
    p.out.append(") ");
    braced_body(b, p, then_branch);
    if let Some(else_branch) = else_branch {
        p.out.append("else ");
        braced_body(b, p, else_branch);
    }
}

pub fn while_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::While { cond, body } = p.arena().stmt(id).kind else {
        return;
    };
    p.out.append("while(");
    b.expr(p, cond);
    p.out.append(") ");
    braced_body(b, p, body);
}

pub fn do_while_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::DoWhile { body, cond } = p.arena().stmt(id).kind else {
        return;
    };
    p.out.append("do ");
    braced_body(b, p, body);
    p.out.append("while(");
    b.expr(p, cond);
    p.out.append_line(");");
}

pub fn for_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::For {
        init,
        cond,
        inc,
        body,
    } = p.arena().stmt(id).kind
    else {
        return;
    };
    p.out.append("for(");
    if let Some(init) = init {
        inline_for_init(b, p, init);
    }
    p.out.append("; ");
    if let Some(cond) = cond {
        b.expr(p, cond);
    }
    p.out.append("; ");
    if let Some(inc) = inc {
        b.expr(p, inc);
    }
    p.out.append(") ");
    braced_body(b, p, body);
}

/// Print a for-init declaration without its trailing semicolon/newline.
fn inline_for_init<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, init: StmtId) {
    match p.arena().stmt(init).kind {
        StmtKind::Decl { decls } => {
            let ids: Vec<DeclId> = p.arena().decl_list(decls).to_vec();
            let mut needs_comma = false;
            for decl in ids {
                if needs_comma {
                    p.out.append(", ");
                }
                needs_comma = true;
                crate::rules::decl::var_decl(b, p, decl, false);
            }
        }
        StmtKind::Expr { expr } => b.expr(p, expr),
        _ => b.stmt(p, init),
    }
}

/// Iterator-loop desugaring.
///
/// The range subject, begin and end land in their own enclosing block so
/// they do not leak; the loop itself becomes an ordinary counted loop with
/// the element binding declared first in the body.
pub fn range_for_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::RangeFor {
        range_stmt,
        begin_stmt,
        end_stmt,
        cond,
        inc,
        loop_var,
        body,
    } = p.arena().stmt(id).kind
    else {
        return;
    };

    p.out.open_scope();
    b.stmt(p, range_stmt);
    b.stmt(p, begin_stmt);
    b.stmt(p, end_stmt);
    p.out.newline();

    p.out.append("for(; ");
    b.expr(p, cond);
    p.out.append("; ");
    b.expr(p, inc);
    p.out.append(") ");

    p.out.open_scope();
    b.decl(p, loop_var);
    match p.arena().stmt(body).kind {
        // The body already is a block; splice its children into the scope
        // we just opened.
        StmtKind::Compound { stmts } => {
            let children: Vec<StmtId> = p.arena().stmt_list(stmts).to_vec();
            for child in children {
                b.stmt(p, child);
            }
        }
        _ => b.stmt(p, body),
    }
    p.out.close_scope(false);
    p.out.newline();

    p.out.close_scope(true);
    p.out.newline();
}

pub fn return_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, value: Option<ExprId>) {
    let unwind = p.lifetime.on_return();
    emit_lifetime_unwind(b, p, &unwind);

    p.hoist.push(HoistKind::ReturnStmt, &p.out);
    p.out.append("return");
    if let Some(value) = value {
        p.out.append_char(' ');
        b.expr(p, value);
    }
    p.out.append_semi_line();
    flush_hoist(p);
}

pub fn switch_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::Switch { cond, body } = p.arena().stmt(id).kind else {
        return;
    };
    p.out.append("switch(");
    b.expr(p, cond);
    p.out.append(") ");
    braced_body(b, p, body);
}

pub fn case_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::Case { value, body } = p.arena().stmt(id).kind else {
        return;
    };
    p.out.append("case ");
    b.expr(p, value);
    p.out.append(": ");
    b.stmt(p, body);
}

pub fn default_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::Default { body } = p.arena().stmt(id).kind else {
        return;
    };
    p.out.append("default: ");
    b.stmt(p, body);
}

pub fn label_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::Label { name, sub } = p.arena().stmt(id).kind else {
        return;
    };
    let name = p.name(name);
    p.out.append(name);
    p.out.append_line(":;");
    if let Some(sub) = sub {
        b.stmt(p, sub);
    }
}

pub fn try_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::Try { body, handler } = p.arena().stmt(id).kind else {
        return;
    };
    p.out.append("try ");
    braced_body(b, p, body);
    b.stmt(p, handler);
}

pub fn catch_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::Catch { param, body } = p.arena().stmt(id).kind else {
        return;
    };
    p.out.append("catch(");
    match param {
        Some(param) => crate::rules::decl::param_decl(p, param),
        None => p.out.append("..."),
    }
    p.out.append(") ");
    braced_body(b, p, body);
}

/// `co_return` outside the coroutine backend keeps its keyword.
pub fn coreturn_stmt<B: Backend>(
    b: &mut B,
    p: &mut Printer<'_, '_>,
    value: Option<ExprId>,
    _promise_call: Option<ExprId>,
) {
    p.out.append("co_return");
    if let Some(value) = value {
        p.out.append_char(' ');
        b.expr(p, value);
    }
    p.out.append_semi_line();
}

/// Default handling of a coroutine function body: print the inner body with
/// the suspend keywords intact. The coroutine backend overrides this.
pub fn coroutine_body<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, _fn_decl: DeclId, body: StmtId) {
    coroutine_inner_body(b, p, body);
}

pub fn coroutine_inner_body<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let StmtKind::CoroutineBody { body, .. } = p.arena().stmt(id).kind else {
        b.stmt(p, id);
        return;
    };
    compound_with_scope(b, p, body, true);
}

/// Wrap a non-compound statement body in braces.
pub(crate) fn braced_body<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, body: StmtId) {
    if matches!(p.arena().stmt(body).kind, StmtKind::Compound { .. }) {
        b.stmt(p, body);
    } else {
        p.out.open_scope();
        b.stmt(p, body);
        p.out.close_scope(false);
        p.out.newline();
    }
}

/// Flush the innermost hoist frame, appending any construction text that
/// never found a use site.
pub(crate) fn flush_hoist(p: &mut Printer<'_, '_>) {
    // The frame's buffer cannot be spliced while `out` is borrowed, so take
    // the leftovers first.
    let mut out = std::mem::take(&mut p.out);
    if let Some(leftover) = p.hoist.pop(&mut out) {
        out.append(&leftover);
    }
    p.out = out;
}

/// Emit the end-of-life marker for each declaration, most recently declared
/// first: a destructor call where the type needs one, otherwise a comment.
pub(crate) fn emit_lifetime_unwind<B: Backend>(
    _b: &mut B,
    p: &mut Printer<'_, '_>,
    decls: &[DeclId],
) {
    for &decl in decls {
        let DeclKind::Var(vd) = p.arena().decl(decl).kind else {
            continue;
        };
        let name = decl_name(p, decl).to_owned();
        let types = p.types();
        let mut ty = types.non_reference(vd.ty);
        let array = types.as_array(ty);
        if let Some((elem, _)) = array {
            ty = elem;
        }

        if !needs_destruction(p, ty) {
            p.out.append_comment_line(&format!("{name} // lifetime ends here"));
            continue;
        }

        let type_text = type_name(p.sess, ty);
        match array {
            Some((_, len)) => {
                // One destructor call per array element.
                for i in 0..len {
                    p.out.append_line(&format!("{name}[{i}].~{type_text}();"));
                }
            }
            None => p.out.append_line(&format!("{name}.~{type_text}();")),
        }
    }
}

/// Whether end of scope performs observable destruction for this type.
pub(crate) fn needs_destruction(p: &Printer<'_, '_>, ty: lucid_ir::TypeId) -> bool {
    let types = p.types();
    let ty = types.resolve_deduced(types.non_reference(ty));
    match types.get(ty).kind {
        TypeKind::Record(decl) => record_needs_destruction(p, decl),
        TypeKind::Array { elem, .. } => needs_destruction(p, elem),
        _ => false,
    }
}

fn record_needs_destruction(p: &Printer<'_, '_>, decl: DeclId) -> bool {
    let DeclKind::Record(rd) = p.arena().decl(decl).kind else {
        return false;
    };
    let members: Vec<DeclId> = p.arena().decl_list(rd.members).to_vec();
    for member in members {
        match p.arena().decl(member).kind {
            DeclKind::Function(fd)
                if fd.role == lucid_ir::FnRole::Destructor
                    && !fd.flags.contains(lucid_ir::FnFlags::IMPLICIT) =>
            {
                return true;
            }
            DeclKind::Field { ty, .. } if needs_destruction(p, ty) => return true,
            _ => {}
        }
    }
    let bases: Vec<lucid_ir::BaseSpecifier> = p.arena().base_list(rd.bases).to_vec();
    bases
        .iter()
        .any(|base| record_needs_destruction(p, base.record))
}

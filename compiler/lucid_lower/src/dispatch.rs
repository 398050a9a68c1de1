//! Dispatcher.
//!
//! One handler per node kind, totalized: kinds with no rule fall through to
//! a visible placeholder comment instead of aborting. The alternate backends
//! are the same dispatcher with a fixed set of kinds overridden: the
//! [`Backend`] trait's default methods call the shared rules, and an
//! override affects exactly that kind and its sub-dispatch.

use lucid_ir::{DeclId, DeclKind, ExprId, ExprKind, Name, StmtId, StmtKind, TypeId};

use crate::printer::{unsupported, Printer};
use crate::rules;

/// Overridable dispatch surface.
///
/// The default implementation is the general lowering; the coroutine and
/// virtual-dispatch backends override the subset of kinds they reinterpret.
pub trait Backend: Sized {
    // --- catch-alls ---

    fn decl(&mut self, p: &mut Printer<'_, '_>, id: DeclId) {
        walk_decl(self, p, id);
    }

    fn stmt(&mut self, p: &mut Printer<'_, '_>, id: StmtId) {
        walk_stmt(self, p, id);
    }

    fn expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        walk_expr(self, p, id);
    }

    // --- declaration kinds ---

    fn var_decl(&mut self, p: &mut Printer<'_, '_>, id: DeclId) {
        rules::decl::var_decl(self, p, id, true);
    }

    fn function_decl(&mut self, p: &mut Printer<'_, '_>, id: DeclId) {
        rules::decl::function_decl(self, p, id);
    }

    fn record_decl(&mut self, p: &mut Printer<'_, '_>, id: DeclId) {
        rules::decl::record_decl(self, p, id);
    }

    fn type_alias(&mut self, p: &mut Printer<'_, '_>, name: Name, ty: TypeId) {
        rules::decl::type_alias(p, name, ty);
    }

    fn static_assert(&mut self, p: &mut Printer<'_, '_>, cond: ExprId, message: Name) {
        rules::decl::static_assert(self, p, cond, message);
    }

    // --- statement kinds ---

    fn decl_stmt(&mut self, p: &mut Printer<'_, '_>, id: StmtId) {
        rules::stmt::decl_stmt(self, p, id);
    }

    fn return_stmt(&mut self, p: &mut Printer<'_, '_>, value: Option<ExprId>) {
        rules::stmt::return_stmt(self, p, value);
    }

    fn coreturn_stmt(
        &mut self,
        p: &mut Printer<'_, '_>,
        value: Option<ExprId>,
        promise_call: Option<ExprId>,
    ) {
        rules::stmt::coreturn_stmt(self, p, value, promise_call);
    }

    /// Called by function printing when the body is a coroutine.
    /// `fn_decl` is the owning function, `body` the `CoroutineBody`.
    fn coroutine_body(&mut self, p: &mut Printer<'_, '_>, fn_decl: DeclId, body: StmtId) {
        rules::stmt::coroutine_body(self, p, fn_decl, body);
    }

    // --- expression kinds ---

    fn this_expr(&mut self, p: &mut Printer<'_, '_>) {
        p.out.append(p.closure_this.unwrap_or("this"));
    }

    fn decl_ref(&mut self, p: &mut Printer<'_, '_>, id: ExprId, decl: DeclId) {
        rules::expr::decl_ref(self, p, id, decl);
    }

    fn member_call(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        rules::expr::member_call(self, p, id);
    }

    fn construct_expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        rules::expr::construct_expr(self, p, id);
    }

    fn new_expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        rules::expr::new_expr(self, p, id);
    }

    fn delete_expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        rules::expr::delete_expr(self, p, id);
    }

    fn implicit_cast(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        rules::expr::implicit_cast(self, p, id);
    }

    fn explicit_cast(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        rules::expr::explicit_cast(self, p, id);
    }

    fn nullptr_literal(&mut self, p: &mut Printer<'_, '_>) {
        p.out.append("nullptr");
    }

    fn suspend_expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        rules::expr::suspend_expr(self, p, id);
    }

    fn lambda_expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        rules::lambda::lambda_expr(self, p, id);
    }
}

/// The general lowering with no overrides.
pub struct DefaultBackend;

impl Backend for DefaultBackend {}

/// Kind-indexed dispatch over declarations.
pub fn walk_decl<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: DeclId) {
    let decl = p.arena().decl(id);
    tracing::trace!(kind = decl.kind.kind_name(), ?id, "walk_decl");
    match decl.kind {
        DeclKind::Var(_) => b.var_decl(p, id),
        DeclKind::Decomposition { .. } => rules::decl::decomposition(b, p, id),
        DeclKind::Binding { name, .. } => p.out.append(p.sess.name(name)),
        DeclKind::Param { .. } => rules::decl::param_decl(p, id),
        DeclKind::Field { .. } => rules::decl::field_decl(b, p, id),
        DeclKind::Function(_) => b.function_decl(p, id),
        DeclKind::Record(_) => b.record_decl(p, id),
        DeclKind::Namespace { .. } => rules::decl::namespace_decl(b, p, id),
        DeclKind::TypeAlias { name, ty } => b.type_alias(p, name, ty),
        DeclKind::StaticAssert { cond, message } => b.static_assert(p, cond, message),
    }
}

/// Kind-indexed dispatch over statements.
pub fn walk_stmt<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: StmtId) {
    let stmt = p.arena().stmt(id);
    tracing::trace!(kind = stmt.kind.kind_name(), ?id, "walk_stmt");
    match stmt.kind {
        StmtKind::Compound { .. } => rules::stmt::compound(b, p, id),
        StmtKind::Expr { expr } => rules::stmt::expr_stmt(b, p, expr),
        StmtKind::Decl { .. } => b.decl_stmt(p, id),
        StmtKind::If { .. } => rules::stmt::if_stmt(b, p, id),
        StmtKind::While { .. } => rules::stmt::while_stmt(b, p, id),
        StmtKind::DoWhile { .. } => rules::stmt::do_while_stmt(b, p, id),
        StmtKind::For { .. } => rules::stmt::for_stmt(b, p, id),
        StmtKind::RangeFor { .. } => rules::stmt::range_for_stmt(b, p, id),
        StmtKind::Return { value } => b.return_stmt(p, value),
        StmtKind::Break => p.out.append_line("break;"),
        StmtKind::Continue => p.out.append_line("continue;"),
        StmtKind::Switch { .. } => rules::stmt::switch_stmt(b, p, id),
        StmtKind::Case { .. } => rules::stmt::case_stmt(b, p, id),
        StmtKind::Default { .. } => rules::stmt::default_stmt(b, p, id),
        StmtKind::Goto { label } => {
            let label = p.name(label).to_owned();
            p.out.append_line(&format!("goto {label};"));
        }
        StmtKind::Label { .. } => rules::stmt::label_stmt(b, p, id),
        StmtKind::Null => p.out.append_semi_line(),
        StmtKind::Comment { text } => {
            let text = p.name(text).to_owned();
            p.out.append_comment_line(&text);
        }
        StmtKind::Try { .. } => rules::stmt::try_stmt(b, p, id),
        StmtKind::Catch { .. } => rules::stmt::catch_stmt(b, p, id),
        StmtKind::CoroutineBody { .. } => {
            // Reached only through function printing; a stray coroutine
            // body without its function prints the inner body.
            rules::stmt::coroutine_inner_body(b, p, id);
        }
        StmtKind::CoReturn {
            value,
            promise_call,
        } => b.coreturn_stmt(p, value, promise_call),
        StmtKind::Asm { .. } => unsupported!(p, stmt.kind.kind_name()),
    }
}

/// Kind-indexed dispatch over expressions.
pub fn walk_expr<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let expr = p.arena().expr(id);
    match expr.kind {
        ExprKind::IntLit(value) => p.out.append(&value.to_string()),
        ExprKind::FloatLit(bits) => rules::expr::float_lit(p, bits),
        ExprKind::BoolLit(value) => p.out.append(if value { "true" } else { "false" }),
        ExprKind::CharLit(c) => p.out.append(&format!("'{}'", c.escape_default())),
        ExprKind::StringLit(text) => {
            let text = p.name(text);
            p.out.append(&format!("\"{}\"", text.escape_default()));
        }
        ExprKind::NullptrLit => b.nullptr_literal(p),
        ExprKind::DeclRef(decl) => b.decl_ref(p, id, decl),
        ExprKind::This => b.this_expr(p),
        ExprKind::Member { .. } => rules::expr::member(b, p, id),
        ExprKind::Call { .. } => rules::expr::call(b, p, id),
        ExprKind::MemberCall { .. } => b.member_call(p, id),
        ExprKind::Unary { .. } => rules::expr::unary(b, p, id),
        ExprKind::Binary { .. } => rules::expr::binary(b, p, id),
        ExprKind::Conditional { .. } => rules::expr::conditional(b, p, id),
        ExprKind::Paren { sub } => {
            p.out.append_char('(');
            b.expr(p, sub);
            p.out.append_char(')');
        }
        ExprKind::Index { .. } => rules::expr::index(b, p, id),
        ExprKind::ImplicitCast { .. } => b.implicit_cast(p, id),
        ExprKind::ExplicitCast { .. } => b.explicit_cast(p, id),
        ExprKind::Construct { .. } => b.construct_expr(p, id),
        ExprKind::New { .. } => b.new_expr(p, id),
        ExprKind::Delete { .. } => b.delete_expr(p, id),
        ExprKind::Lambda { .. } => b.lambda_expr(p, id),
        ExprKind::Fold { .. } => rules::expr::fold(b, p, id),
        ExprKind::Suspend { .. } => b.suspend_expr(p, id),
        ExprKind::InitList { .. } => rules::expr::init_list(b, p, id),
        ExprKind::SizeOf { ty } => {
            let name = crate::type_name::type_name(p.sess, ty);
            p.out.append(&format!("sizeof({name})"));
        }
    }
}

//! Coroutine lowering.
//!
//! Rewrites a suspendable function into an explicit heap frame, a
//! resume/destroy function pair and a numbered-label state machine:
//!
//! 1. A pre-pass counts the suspend points in the body, deduplicated by
//!    node identity (tree rewriting can visit one source expression twice).
//! 2. A second pre-pass discovers the locals living in the frame: every
//!    declaration directly inside the body, plus the captured parameters.
//! 3. The ramp allocates the frame, installs the resume/destroy pointers,
//!    zeroes the suspend index and calls the resume function.
//! 4. The resume function dispatches on the suspend index - case 0 is the
//!    entry/initial-suspend case, one case per body suspend point jumps to
//!    its numbered resume label.
//! 5. The destroy function runs the frame's destructor and deallocates.
//!
//! Field offsets and layout are illustrative, not ABI-binding.

use rustc_hash::{FxHashMap, FxHashSet};

use lucid_ir::{build, DeclId, DeclKind, ExprId, ExprKind, StmtId, StmtKind, TypeId};

use crate::dispatch::{walk_decl, walk_stmt, Backend};
use crate::flags::FeatureFlags;
use crate::printer::Printer;
use crate::rules;
use crate::type_name::{type_name, type_name_with_declarator};

/// State of the function being lowered. A fourth implicit "invalid" state
/// exists before lowering starts.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum CoroState {
    Invalid,
    InitialSuspend,
    Body,
    FinalSuspend,
}

/// Per-function lowering context.
struct CoroCtx {
    fsm_name: String,
    frame_name: String,
    /// Offset of the function's first output byte; the frame record is
    /// spliced here once its fields are complete.
    pos_before_func: usize,
    /// Rendered frame field declarations, in layout order.
    frame_fields: Vec<String>,
    field_names: FxHashSet<String>,
    /// Frame-resident declarations and the field they map to.
    frame_vars: FxHashMap<DeclId, String>,
    /// Result-slot access text per suspend point already lowered.
    suspend_results: FxHashMap<ExprId, String>,
    /// Suspend points found by the dedup pre-pass.
    suspend_total: usize,
    /// Suspend points lowered so far (1-based body numbering).
    emitted: usize,
    state: CoroState,
    has_this: bool,
    in_body: bool,
}

impl CoroCtx {
    fn add_field(&mut self, rendered: String, name: &str) {
        if self.field_names.insert(name.to_owned()) {
            self.frame_fields.push(rendered);
        }
    }

    fn resume_label(&self, index: usize) -> String {
        format!("__resume_{}_{index}", self.fsm_name)
    }
}

/// The coroutine backend: the general dispatcher with the suspend-related
/// kinds overridden.
#[derive(Default)]
pub struct CoroBackend {
    ctx: Option<CoroCtx>,
}

impl CoroBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn in_coroutine_body(&self) -> bool {
        self.ctx.as_ref().is_some_and(|ctx| ctx.in_body)
    }
}

impl Backend for CoroBackend {
    fn function_decl(&mut self, p: &mut Printer<'_, '_>, id: DeclId) {
        // Record where the function starts; the frame record is spliced
        // back here once its fields are complete.
        let pos = p.out.current_pos();
        if function_coroutine_body(p, id).is_some() {
            tracing::debug!(?id, "lowering coroutine");
            self.ctx = Some(CoroCtx {
                fsm_name: String::new(),
                frame_name: String::new(),
                pos_before_func: pos,
                frame_fields: Vec::new(),
                field_names: FxHashSet::default(),
                frame_vars: FxHashMap::default(),
                suspend_results: FxHashMap::default(),
                suspend_total: 0,
                emitted: 0,
                state: CoroState::Invalid,
                has_this: false,
                in_body: false,
            });
        }
        rules::decl::function_decl(self, p, id);
    }

    fn coroutine_body(&mut self, p: &mut Printer<'_, '_>, fn_decl: DeclId, body: StmtId) {
        if self.ctx.is_none() {
            // A coroutine body reached outside function lowering; keep the
            // keyword form rather than failing.
            rules::stmt::coroutine_body(self, p, fn_decl, body);
            return;
        }
        self.lower_coroutine(p, fn_decl, body);
        self.ctx = None;
    }

    fn stmt(&mut self, p: &mut Printer<'_, '_>, id: StmtId) {
        if !self.in_coroutine_body() {
            walk_stmt(self, p, id);
            return;
        }

        // Lower every suspend point reachable from this statement first;
        // the statement text then reads the cached result slots.
        let suspends = collect_suspends_in_stmt(p, id);
        let mut stmt_is_pure_suspend = false;
        if let StmtKind::Expr { expr } = p.arena().stmt(id).kind {
            if suspends.len() == 1 && strip_trivia(p, expr) == suspends[0] {
                stmt_is_pure_suspend = true;
            }
        }
        for suspend in suspends {
            self.emit_suspend_machinery(p, suspend);
        }
        if stmt_is_pure_suspend {
            return;
        }
        walk_stmt(self, p, id);
    }

    fn decl_stmt(&mut self, p: &mut Printer<'_, '_>, id: StmtId) {
        if !self.in_coroutine_body() {
            rules::stmt::decl_stmt(self, p, id);
            return;
        }
        let StmtKind::Decl { decls } = p.arena().stmt(id).kind else {
            return;
        };
        let ids: Vec<DeclId> = p.arena().decl_list(decls).to_vec();
        for decl in ids {
            let field = self
                .ctx
                .as_ref()
                .and_then(|ctx| ctx.frame_vars.get(&decl).cloned());
            match (field, p.arena().decl(decl).kind) {
                (Some(field), DeclKind::Var(vd)) => {
                    // The declaration became a frame field; only the
                    // initialization remains here.
                    p.out.append(&format!("__f->{field}"));
                    if let Some(init) = vd.init {
                        p.out.append(" = ");
                        self.expr(p, init);
                    }
                    p.out.append_semi_line();
                }
                _ => walk_decl(self, p, decl),
            }
        }
    }

    fn decl_ref(&mut self, p: &mut Printer<'_, '_>, id: ExprId, decl: DeclId) {
        let field = self
            .ctx
            .as_ref()
            .and_then(|ctx| ctx.frame_vars.get(&decl).cloned());
        match field {
            Some(field) if self.in_coroutine_body() => {
                p.out.append(&format!("__f->{field}"));
            }
            _ => rules::expr::decl_ref(self, p, id, decl),
        }
    }

    fn this_expr(&mut self, p: &mut Printer<'_, '_>) {
        if self.in_coroutine_body() && self.ctx.as_ref().is_some_and(|c| c.has_this) {
            p.out.append("__f->__this");
        } else {
            p.out.append(p.closure_this.unwrap_or("this"));
        }
    }

    fn suspend_expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        let cached = self
            .ctx
            .as_ref()
            .and_then(|ctx| ctx.suspend_results.get(&id).cloned());
        match cached {
            Some(access) => p.out.append(&access),
            // A suspend point outside the lowered body (or before the
            // machinery ran) keeps its keyword form.
            None => rules::expr::suspend_expr(self, p, id),
        }
    }

    fn coreturn_stmt(
        &mut self,
        p: &mut Printer<'_, '_>,
        value: Option<ExprId>,
        promise_call: Option<ExprId>,
    ) {
        if !self.in_coroutine_body() {
            rules::stmt::coreturn_stmt(self, p, value, promise_call);
            return;
        }
        p.out.append_comment_line("co_return");
        if let Some(promise_call) = promise_call {
            self.expr(p, promise_call);
            p.out.append_semi_line();
        }
        let label = self
            .ctx
            .as_ref()
            .map(|ctx| format!("__final_suspend_{}", ctx.fsm_name));
        if let Some(label) = label {
            p.out.append_line(&format!("goto {label};"));
        }
    }
}

impl CoroBackend {
    fn lower_coroutine(&mut self, p: &mut Printer<'_, '_>, fn_decl: DeclId, body_id: StmtId) {
        let StmtKind::CoroutineBody {
            body,
            promise,
            init_suspend,
            final_suspend,
            return_stmt,
            allocate,
            deallocate,
            param_moves,
            exception_handler,
            return_on_alloc_failure,
        } = p.arena().stmt(body_id).kind
        else {
            return;
        };

        let fn_name = rules::decl_name(p, fn_decl).to_owned();
        let promise_ty = promise_type(p, promise);
        let promise_field = rules::decl_name(p, promise).to_owned();
        let promise_field = if promise_field.is_empty() {
            "__promise".to_owned()
        } else {
            promise_field
        };

        // --- pre-passes ---

        let suspend_total = {
            let mut seen = FxHashSet::default();
            collect_suspends(p, body, &mut seen);
            seen.len()
        };
        let has_this = stmt_mentions_this(p, body);

        {
            let ctx = match self.ctx.as_mut() {
                Some(ctx) => ctx,
                None => return,
            };
            ctx.fsm_name = fn_name.clone();
            ctx.frame_name = format!("__{fn_name}Frame");
            ctx.suspend_total = suspend_total;
            ctx.state = CoroState::InitialSuspend;
            ctx.has_this = has_this;
        }
        let frame_name = format!("__{fn_name}Frame");
        let resume_fn = format!("__{fn_name}Resume");
        let destroy_fn = format!("__{fn_name}Destroy");

        // Frame layout starts with the resume/destroy pointers, then the
        // promise, the suspend bookkeeping, captured parameters and locals.
        let promise_text = type_name(p.sess, promise_ty);
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.add_field(
                format!("void (*__resume_fn)({frame_name} *);"),
                "__resume_fn",
            );
            ctx.add_field(
                format!("void (*__destroy_fn)({frame_name} *);"),
                "__destroy_fn",
            );
            ctx.add_field(format!("{promise_text} {promise_field};"), &promise_field);
            ctx.add_field("int __suspend_index;".to_owned(), "__suspend_index");
            ctx.add_field(
                "bool __initial_await_resume_called;".to_owned(),
                "__initial_await_resume_called",
            );
            ctx.frame_vars.insert(promise, promise_field.clone());
        }

        // Captured parameters.
        let params: Vec<DeclId> = p.arena().decl_list(param_moves).to_vec();
        for &param in &params {
            let name = rules::decl_name(p, param).to_owned();
            let ty = decl_type(p, param);
            let rendered = type_name_with_declarator(p.sess, ty, &name);
            if let Some(ctx) = self.ctx.as_mut() {
                ctx.frame_vars.insert(param, name.clone());
                ctx.add_field(format!("{rendered};"), &name);
            }
        }

        if has_this {
            if let Some(record) = function_parent(p, fn_decl) {
                let record_name = rules::decl_name(p, record).to_owned();
                if let Some(ctx) = self.ctx.as_mut() {
                    ctx.add_field(format!("{record_name} * __this;"), "__this");
                }
            }
        }

        // Locals living across the body; every declaration directly inside
        // the body moves into the frame.
        let locals = collect_frame_locals(p, body);
        for (decl, name, ty) in locals {
            let rendered = type_name_with_declarator(p.sess, ty, &name);
            if let Some(ctx) = self.ctx.as_mut() {
                ctx.frame_vars.insert(decl, name.clone());
                ctx.add_field(format!("{rendered};"), &name);
            }
        }

        // --- the ramp ---

        // From here on every reference to the promise, a captured parameter
        // or a frame-resident local prints as a frame access.
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.in_body = true;
        }

        p.out.open_scope();
        p.out
            .append_comment_line("Allocate the frame including the promise");
        p.sess.enable(FeatureFlags::ALLOC);
        p.out.append(&format!(
            "{frame_name} * __f = reinterpret_cast<{frame_name} *>("
        ));
        self.expr(p, allocate);
        p.out.append_line(");");

        if let Some(on_failure) = return_on_alloc_failure {
            p.out.append("if(nullptr == __f) ");
            rules::stmt::braced_body(self, p, on_failure);
        }

        p.out.append_line("__f->__suspend_index = 0;");
        p.out
            .append_line("__f->__initial_await_resume_called = false;");

        for &param in &params {
            let name = rules::decl_name(p, param).to_owned();
            let ty_text = type_name(p.sess, decl_type(p, param));
            p.out.append_line(&format!(
                "__f->{name} = std::forward<{ty_text}>({name});"
            ));
        }
        if has_this {
            p.out.append_line("__f->__this = this;");
        }

        p.out.newline();
        p.out.append_comment_line("Construct the promise.");
        p.sess.enable(FeatureFlags::PLACEMENT_NEW);
        let promise_text = type_name(p.sess, promise_ty);
        p.out.append_line(&format!(
            "new (&__f->{promise_field}) {promise_text}();"
        ));

        p.out.newline();
        p.out
            .append_comment_line("Forward declare the resume and destroy function.");
        p.out.append_line(&format!("void {resume_fn}({frame_name} *);"));
        p.out.append_line(&format!("void {destroy_fn}({frame_name} *);"));

        p.out.newline();
        p.out
            .append_comment_line("Assign the resume and destroy function pointers.");
        p.out.append_line(&format!("__f->__resume_fn = &{resume_fn};"));
        p.out.append_line(&format!("__f->__destroy_fn = &{destroy_fn};"));

        p.out.newline();
        p.out.append_comment_line(
            "Call the made up function with the coroutine body for initial suspend. \
             This function will be called subsequently by coroutine_handle<>::resume() \
             which calls __builtin_coro_resume(__handle_)",
        );
        p.out.append_line(&format!("{resume_fn}(__f);"));

        p.out.newline();
        if let Some(return_stmt) = return_stmt {
            walk_stmt(self, p, return_stmt);
        }
        p.out.close_scope(false);
        p.out.newline();
        p.out.newline();

        // --- the resume function ---

        p.out
            .append_comment_line("This function invoked by coroutine_handle<>::resume()");
        p.out.append_line(&format!("void {resume_fn}({frame_name} * __f)"));
        p.out.open_scope();

        let handler = exception_handler;
        if handler.is_some() {
            p.sess.enable(FeatureFlags::EXCEPTIONS);
            p.out.append("try");
            p.out.newline();
            p.out.open_scope();
        }

        p.out
            .append_comment_line("Create a switch to get to the correct resume point");
        self.emit_resume_switch(p);
        p.out.newline();

        // The initial suspend is the case-0 entry; it carries no index
        // assignment and no numbered label.
        self.emit_suspend_machinery(p, init_suspend);
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.state = CoroState::Body;
        }

        match p.arena().stmt(body).kind {
            StmtKind::Compound { stmts } => {
                let children: Vec<StmtId> = p.arena().stmt_list(stmts).to_vec();
                for child in children {
                    self.stmt(p, child);
                }
            }
            _ => self.stmt(p, body),
        }

        let final_label = format!("__final_suspend_{fn_name}");
        p.out.append_line(&format!("goto {final_label};"));

        if let Some(handler) = handler {
            p.out.close_scope(true);
            p.out.append(" catch(...) ");
            p.out.open_scope();
            // Only re-raise if the initial suspend's resume was never
            // reached; past that point the body runs inside the
            // compiler-managed scaffolding.
            p.out.append("if(!__f->__initial_await_resume_called) ");
            p.out.open_scope();
            p.out.append_line("throw;");
            p.out.close_scope(false);
            p.out.newline();
            self.emit_catch_body(p, handler);
            p.out.close_scope(true);
            p.out.newline();
        }

        p.out.append_line(&format!("{final_label}:;"));
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.state = CoroState::FinalSuspend;
        }
        self.emit_suspend_machinery(p, final_suspend);

        p.out.close_scope(true);
        p.out.newline();
        p.out.newline();

        // --- the destroy function ---

        p.out
            .append_comment_line("This function invoked by coroutine_handle<>::destroy()");
        p.out.append_line(&format!("void {destroy_fn}({frame_name} * __f)"));
        p.out.open_scope();
        p.out.append_comment_line("destroy all variables with dtors");
        p.out.append_line(&format!("__f->~{frame_name}();"));
        p.out.append_comment_line("Deallocating the coroutine frame");
        p.out.append_comment_line(
            "Note: The actual argument to delete is __builtin_coro_frame with the promise as parameter",
        );
        self.expr(p, deallocate);
        p.out.append_semi_line();
        p.out.close_scope(false);
        p.out.newline();

        // --- splice the completed frame record before the function ---

        if let Some(ctx) = self.ctx.as_mut() {
            ctx.in_body = false;
            ctx.state = CoroState::Invalid;
        }
        let frame_text = self.render_frame_record();
        let pos = self
            .ctx
            .as_ref()
            .map(|ctx| ctx.pos_before_func)
            .unwrap_or_default();
        p.out.insert_at(pos, &frame_text);
    }

    /// The numbered-label dispatch: case 0 breaks into the entry path, each
    /// body suspend point gets `case i: goto __resume_<fsm>_i;`.
    ///
    /// The switch body is synthesized as a tree fragment and printed through
    /// the ordinary dispatch, like every other synthetic statement; only the
    /// frame-field condition is spelled directly.
    fn emit_resume_switch(&mut self, p: &mut Printer<'_, '_>) {
        let (fsm, suspend_total) = match self.ctx.as_ref() {
            Some(ctx) => (ctx.fsm_name.clone(), ctx.suspend_total),
            None => return,
        };

        let mut cases = Vec::with_capacity(suspend_total + 1);
        {
            let arena = p.arena_mut();
            let zero = build::int_lit(arena, 0);
            let brk = arena.alloc_stmt(StmtKind::Break, lucid_ir::Span::DUMMY);
            cases.push(build::case_stmt(arena, zero, brk));
        }
        for i in 1..=suspend_total {
            let label = p.sess.module.interner.intern(&format!("__resume_{fsm}_{i}"));
            let arena = p.arena_mut();
            let value = build::int_lit(arena, i as i64);
            let target = build::goto_stmt(arena, label);
            cases.push(build::case_stmt(arena, value, target));
        }
        let body = build::compound(p.arena_mut(), &cases);

        p.out.append("switch(__f->__suspend_index) ");
        rules::stmt::braced_body(self, p, body);
    }

    /// Lower one suspend point: assign the next index, evaluate the ready
    /// check, conditionally early-return, place the resume label, then the
    /// resumed value's use.
    fn emit_suspend_machinery(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        let id = strip_trivia(p, id);
        let ExprKind::Suspend {
            kind,
            operand,
            ready,
            suspend,
            resume,
        } = p.arena().expr(id).kind
        else {
            return;
        };

        // Dedup by identity: a source expression revisited during rewriting
        // is lowered once.
        if self
            .ctx
            .as_ref()
            .is_some_and(|ctx| ctx.suspend_results.contains_key(&id))
        {
            return;
        }

        let (state, index, label) = {
            let ctx = match self.ctx.as_mut() {
                Some(ctx) => ctx,
                None => return,
            };
            match ctx.state {
                CoroState::Body => {
                    ctx.emitted += 1;
                    let index = ctx.emitted;
                    (CoroState::Body, Some(index), Some(ctx.resume_label(index)))
                }
                state => (state, None, None),
            }
        };

        p.out.newline();
        p.out.append_comment_line(kind.keyword());

        if let Some(index) = index {
            p.out
                .append_line(&format!("__f->__suspend_index = {index};"));
        }

        let suspend_returns_bool = p.arena().expr(suspend).ty == TypeId::BOOL;

        p.out.append("if(!(");
        self.expr(p, ready);
        p.out.append(")) ");
        p.out.open_scope();
        if suspend_returns_bool {
            // Suspend only if await_suspend returned true.
            p.out.append("if(");
            self.expr(p, suspend);
            p.out.append(") ");
            p.out.open_scope();
            self.emit_suspend_return(p, state);
            p.out.close_scope(false);
            p.out.newline();
        } else {
            self.expr(p, suspend);
            p.out.append_semi_line();
            self.emit_suspend_return(p, state);
        }
        p.out.close_scope(false);
        p.out.newline();

        if state == CoroState::FinalSuspend {
            // Falling past the final suspend destroys the coroutine.
            p.out.append_line("__f->__destroy_fn(__f);");
            return;
        }

        if let Some(label) = label {
            p.out.append_line(&format!("{label}:;"));
        }

        // The resumed value's use: value-bearing suspends store into a
        // frame slot the surrounding expression reads back.
        let resume_ty = p.arena().expr(resume).ty;
        if p.types().is_void(resume_ty) {
            self.expr(p, resume);
            p.out.append_semi_line();
            if let Some(ctx) = self.ctx.as_mut() {
                // Empty access: nothing to read back, but the identity is
                // recorded so a revisit does not lower the point twice.
                ctx.suspend_results.insert(id, String::new());
            }
        } else {
            let slot = self.suspend_slot_name(p, operand, index);
            let rendered_ty = type_name(p.sess, resume_ty);
            if let Some(ctx) = self.ctx.as_mut() {
                ctx.add_field(format!("{rendered_ty} {slot}_res;"), &format!("{slot}_res"));
                ctx.suspend_results
                    .insert(id, format!("__f->{slot}_res"));
            }
            p.out.append(&format!("__f->{slot}_res = "));
            self.expr(p, resume);
            p.out.append_semi_line();
        }
    }

    fn emit_suspend_return(&mut self, p: &mut Printer<'_, '_>, state: CoroState) {
        if state == CoroState::InitialSuspend {
            p.out
                .append_line("__f->__initial_await_resume_called = true;");
        }
        p.out.append_line("return;");
    }

    /// Frame slot name for a suspend point, anchored at the operand's
    /// source location so repeated lowering agrees.
    fn suspend_slot_name(
        &mut self,
        p: &mut Printer<'_, '_>,
        operand: ExprId,
        index: Option<usize>,
    ) -> String {
        let span = p.arena().expr(operand).span;
        if span.is_dummy() {
            format!("__suspend_{}", index.unwrap_or_default())
        } else {
            p.sess.line_col_name("suspend_", span)
        }
    }

    fn emit_catch_body(&mut self, p: &mut Printer<'_, '_>, handler: StmtId) {
        match p.arena().stmt(handler).kind {
            StmtKind::Catch { body, .. } => match p.arena().stmt(body).kind {
                StmtKind::Compound { stmts } => {
                    let children: Vec<StmtId> = p.arena().stmt_list(stmts).to_vec();
                    for child in children {
                        self.stmt(p, child);
                    }
                }
                _ => self.stmt(p, body),
            },
            _ => self.stmt(p, handler),
        }
    }

    fn render_frame_record(&self) -> String {
        let Some(ctx) = self.ctx.as_ref() else {
            return String::new();
        };
        let mut text = String::new();
        text.push_str(&format!("struct {}\n{{\n", ctx.frame_name));
        for field in &ctx.frame_fields {
            text.push_str("  ");
            text.push_str(field);
            text.push('\n');
        }
        text.push_str("};\n\n");
        text
    }
}

// --- tree walks ---

/// The coroutine body of a function, when it has one.
fn function_coroutine_body(p: &Printer<'_, '_>, id: DeclId) -> Option<StmtId> {
    let DeclKind::Function(fd) = p.arena().decl(id).kind else {
        return None;
    };
    let body = fd.body?;
    matches!(p.arena().stmt(body).kind, StmtKind::CoroutineBody { .. }).then_some(body)
}

fn function_parent(p: &Printer<'_, '_>, id: DeclId) -> Option<DeclId> {
    match p.arena().decl(id).kind {
        DeclKind::Function(fd) => fd.parent,
        _ => None,
    }
}

fn decl_type(p: &Printer<'_, '_>, id: DeclId) -> TypeId {
    match p.arena().decl(id).kind {
        DeclKind::Var(vd) => vd.ty,
        DeclKind::Param { ty, .. }
        | DeclKind::Field { ty, .. }
        | DeclKind::Binding { ty, .. } => ty,
        _ => TypeId::VOID,
    }
}

fn promise_type(p: &Printer<'_, '_>, promise: DeclId) -> TypeId {
    decl_type(p, promise)
}

/// Peel parens and implicit casts off an expression.
fn strip_trivia(p: &Printer<'_, '_>, id: ExprId) -> ExprId {
    match p.arena().expr(id).kind {
        ExprKind::Paren { sub } | ExprKind::ImplicitCast { sub, .. } => strip_trivia(p, sub),
        _ => id,
    }
}

/// Suspend points reachable from one statement, in evaluation order,
/// deduplicated by identity.
fn collect_suspends_in_stmt(p: &Printer<'_, '_>, id: StmtId) -> Vec<ExprId> {
    let mut seen = FxHashSet::default();
    let mut ordered = Vec::new();
    let mut sink = |e: ExprId| {
        if seen.insert(e) {
            ordered.push(e);
        }
    };
    walk_stmt_exprs(p, id, &mut |p, e| collect_suspends_in_expr(p, e, &mut sink));
    ordered
}

fn collect_suspends(p: &Printer<'_, '_>, id: StmtId, seen: &mut FxHashSet<ExprId>) {
    walk_stmt_exprs_deep(p, id, &mut |p, e| {
        if matches!(p.arena().expr(e).kind, ExprKind::Suspend { .. }) {
            seen.insert(e);
        }
    });
}

fn collect_suspends_in_expr(p: &Printer<'_, '_>, id: ExprId, sink: &mut dyn FnMut(ExprId)) {
    let expr = p.arena().expr(id);
    if let ExprKind::Suspend { operand, .. } = expr.kind {
        sink(id);
        collect_suspends_in_expr(p, operand, sink);
        return;
    }
    for child in expr_children(p, id) {
        collect_suspends_in_expr(p, child, sink);
    }
}

/// Immediate expression children of a statement (not descending into
/// nested statements for control flow bodies - those are walked as
/// statements).
fn walk_stmt_exprs(
    p: &Printer<'_, '_>,
    id: StmtId,
    visit: &mut dyn FnMut(&Printer<'_, '_>, ExprId),
) {
    match p.arena().stmt(id).kind {
        StmtKind::Expr { expr } => visit(p, expr),
        StmtKind::Decl { decls } => {
            let ids: Vec<DeclId> = p.arena().decl_list(decls).to_vec();
            for decl in ids {
                if let DeclKind::Var(vd) = p.arena().decl(decl).kind {
                    if let Some(init) = vd.init {
                        visit(p, init);
                    }
                }
            }
        }
        StmtKind::Return { value } => {
            if let Some(value) = value {
                visit(p, value);
            }
        }
        StmtKind::CoReturn {
            value,
            promise_call,
        } => {
            if let Some(value) = value {
                visit(p, value);
            }
            if let Some(promise_call) = promise_call {
                visit(p, promise_call);
            }
        }
        StmtKind::If { cond, .. }
        | StmtKind::While { cond, .. }
        | StmtKind::DoWhile { cond, .. }
        | StmtKind::Switch { cond, .. } => visit(p, cond),
        StmtKind::For { cond, inc, .. } => {
            if let Some(cond) = cond {
                visit(p, cond);
            }
            if let Some(inc) = inc {
                visit(p, inc);
            }
        }
        _ => {}
    }
}

/// Recursive statement walk collecting frame-resident locals: every
/// declaration directly inside the body's statement tree (initializer
/// sub-expressions and nested functions are not entered).
fn collect_frame_locals(p: &Printer<'_, '_>, id: StmtId) -> Vec<(DeclId, String, TypeId)> {
    let mut out = Vec::new();
    collect_frame_locals_into(p, id, &mut out);
    out
}

fn collect_frame_locals_into(
    p: &Printer<'_, '_>,
    id: StmtId,
    out: &mut Vec<(DeclId, String, TypeId)>,
) {
    match p.arena().stmt(id).kind {
        StmtKind::Compound { stmts } => {
            let children: Vec<StmtId> = p.arena().stmt_list(stmts).to_vec();
            for child in children {
                collect_frame_locals_into(p, child, out);
            }
        }
        StmtKind::Decl { decls } => {
            let ids: Vec<DeclId> = p.arena().decl_list(decls).to_vec();
            for decl in ids {
                if let DeclKind::Var(vd) = p.arena().decl(decl).kind {
                    let name = p.name(vd.name).to_owned();
                    out.push((decl, name, vd.ty));
                }
            }
        }
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            collect_frame_locals_into(p, then_branch, out);
            if let Some(else_branch) = else_branch {
                collect_frame_locals_into(p, else_branch, out);
            }
        }
        StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. }
        | StmtKind::Switch { body, .. }
        | StmtKind::Case { body, .. }
        | StmtKind::Default { body } => collect_frame_locals_into(p, body, out),
        StmtKind::For { init, body, .. } => {
            if let Some(init) = init {
                collect_frame_locals_into(p, init, out);
            }
            collect_frame_locals_into(p, body, out);
        }
        StmtKind::Label { sub: Some(sub), .. } => collect_frame_locals_into(p, sub, out),
        StmtKind::Try { body, handler } => {
            collect_frame_locals_into(p, body, out);
            collect_frame_locals_into(p, handler, out);
        }
        StmtKind::Catch { body, .. } => collect_frame_locals_into(p, body, out),
        _ => {}
    }
}

fn stmt_mentions_this(p: &Printer<'_, '_>, id: StmtId) -> bool {
    let mut found = false;
    walk_stmt_exprs_deep(p, id, &mut |p, e| {
        if matches!(p.arena().expr(e).kind, ExprKind::This) {
            found = true;
        }
    });
    found
}

fn walk_stmt_exprs_deep(
    p: &Printer<'_, '_>,
    id: StmtId,
    visit: &mut dyn FnMut(&Printer<'_, '_>, ExprId),
) {
    walk_stmt_exprs(p, id, &mut |p, e| visit_expr_deep(p, e, visit));
    match p.arena().stmt(id).kind {
        StmtKind::Compound { stmts } => {
            let children: Vec<StmtId> = p.arena().stmt_list(stmts).to_vec();
            for child in children {
                walk_stmt_exprs_deep(p, child, visit);
            }
        }
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            walk_stmt_exprs_deep(p, then_branch, visit);
            if let Some(else_branch) = else_branch {
                walk_stmt_exprs_deep(p, else_branch, visit);
            }
        }
        StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. }
        | StmtKind::Switch { body, .. }
        | StmtKind::Case { body, .. }
        | StmtKind::Default { body } => walk_stmt_exprs_deep(p, body, visit),
        StmtKind::For { init, body, .. } => {
            if let Some(init) = init {
                walk_stmt_exprs_deep(p, init, visit);
            }
            walk_stmt_exprs_deep(p, body, visit);
        }
        StmtKind::Label { sub: Some(sub), .. } => walk_stmt_exprs_deep(p, sub, visit),
        StmtKind::Try { body, handler } => {
            walk_stmt_exprs_deep(p, body, visit);
            walk_stmt_exprs_deep(p, handler, visit);
        }
        StmtKind::Catch { body, .. } => walk_stmt_exprs_deep(p, body, visit),
        _ => {}
    }
}

fn visit_expr_deep(
    p: &Printer<'_, '_>,
    id: ExprId,
    visit: &mut dyn FnMut(&Printer<'_, '_>, ExprId),
) {
    visit(p, id);
    for child in expr_children(p, id) {
        visit_expr_deep(p, child, visit);
    }
}

/// Immediate children of an expression.
fn expr_children(p: &Printer<'_, '_>, id: ExprId) -> Vec<ExprId> {
    match p.arena().expr(id).kind {
        ExprKind::Member { base, .. } => vec![base],
        ExprKind::Call { callee, args } | ExprKind::MemberCall { callee, args } => {
            let mut out = vec![callee];
            out.extend_from_slice(p.arena().expr_list(args));
            out
        }
        ExprKind::Unary { operand, .. } => vec![operand],
        ExprKind::Binary { lhs, rhs, .. } => vec![lhs, rhs],
        ExprKind::Conditional {
            cond,
            then_branch,
            else_branch,
        } => vec![cond, then_branch, else_branch],
        ExprKind::Paren { sub }
        | ExprKind::ImplicitCast { sub, .. }
        | ExprKind::ExplicitCast { sub, .. } => vec![sub],
        ExprKind::Index { base, index } => vec![base, index],
        ExprKind::Construct { args, .. } => p.arena().expr_list(args).to_vec(),
        ExprKind::New { args, placement } => {
            let mut out: Vec<ExprId> = p.arena().expr_list(args).to_vec();
            if let Some(placement) = placement {
                out.push(placement);
            }
            out
        }
        ExprKind::Delete { operand, .. } => vec![operand],
        ExprKind::Fold { pack, init, .. } => {
            let mut out = vec![pack];
            if let Some(init) = init {
                out.push(init);
            }
            out
        }
        ExprKind::Suspend {
            operand,
            ready,
            suspend,
            resume,
            ..
        } => vec![operand, ready, suspend, resume],
        ExprKind::InitList { elems } => p.arena().expr_list(elems).to_vec(),
        _ => Vec::new(),
    }
}

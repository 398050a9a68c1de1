//! Virtual-dispatch lowering ("explicit dispatch tables").
//!
//! Rewrites member calls, object layout and construction/destruction into
//! C-flavoured output with no notion of `virtual` left:
//!
//! - every record becomes a flat `typedef struct` with base fields inlined
//!   and one dispatch-table pointer field per polymorphic base;
//! - per polymorphic base a `static struct __mptr` array is synthesized,
//!   slot-matched to the base's own table so an override occupies the slot
//!   of the function it overrides;
//! - constructors become free functions taking the object pointer first:
//!   bases, then table-pointer installation, then own fields;
//! - calls through a virtual function index the table, apply the stored
//!   this-delta and call through the raw function pointer.
//!
//! Deltas for secondary bases are best-effort under the declared layout
//! model and flagged inline.

use lucid_ir::{
    CastKind, CtorTarget, DeclId, DeclKind, ExprId, ExprKind, FnDecl, FnFlags, FnRole, Name,
    StmtKind, TypeId, TypeKind,
};

use crate::dispatch::{walk_stmt, Backend};
use crate::flags::FeatureFlags;
use crate::printer::Printer;
use crate::rules;
use crate::layout::{is_polymorphic, record_layout, slot_index, vtable_slots};
use crate::type_name::type_name_c;

/// The virtual-dispatch backend.
#[derive(Default)]
pub struct CfrontBackend;

impl CfrontBackend {
    pub fn new() -> Self {
        Self
    }

    /// Render an expression into a detached string.
    fn render_expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) -> String {
        let detached = lucid_emit::OutputBuf::with_indent_of(&p.out);
        let saved = std::mem::replace(&mut p.out, detached);
        self.expr(p, id);
        std::mem::replace(&mut p.out, saved).into_string()
    }
}

impl Backend for CfrontBackend {
    fn this_expr(&mut self, p: &mut Printer<'_, '_>) {
        p.out.append("__this");
    }

    fn nullptr_literal(&mut self, p: &mut Printer<'_, '_>) {
        p.sess.enable(FeatureFlags::STDDEF);
        p.out.append("NULL");
    }

    fn type_alias(&mut self, p: &mut Printer<'_, '_>, name: Name, ty: TypeId) {
        let name = p.name(name).to_owned();
        let target = type_name_c(p.sess, ty);
        p.out.append_line(&format!("typedef {target} {name};"));
    }

    fn static_assert(&mut self, p: &mut Printer<'_, '_>, cond: ExprId, message: Name) {
        p.sess.enable(FeatureFlags::ASSERT);
        p.out.append("_Static_assert(");
        self.expr(p, cond);
        if !message.is_empty() {
            let message = p.name(message);
            p.out.append(&format!(", \"{}\"", message.escape_default()));
        }
        p.out.append(")");
        p.out.append_semi_line();
    }

    fn record_decl(&mut self, p: &mut Printer<'_, '_>, id: DeclId) {
        let DeclKind::Record(rd) = p.arena().decl(id).kind else {
            return;
        };
        let record_name = p.name(rd.name).to_owned();

        if !rd.has_definition {
            p.out.append_line(&format!("struct {record_name};"));
            return;
        }

        let polymorphic = is_polymorphic(p, id);
        if polymorphic {
            p.sess.enable(FeatureFlags::VTABLE);
        }

        // The flat C struct: table pointers and base fields inlined.
        let mut fields = Vec::new();
        flatten_fields(p, id, "__vptr", &mut fields);
        if fields.is_empty() {
            // C requires at least one member.
            fields.push("char __dummy;".to_owned());
        }

        p.out.append_line(&format!("typedef struct {record_name}"));
        p.out.open_scope();
        for field in &fields {
            p.out.append_line(field);
        }
        p.out.close_scope(false);
        p.out.append_line(&format!(" {record_name};"));
        p.out.newline();

        // This-pointer offsets become visible to every later cast.
        populate_offsets(p, id, id, 0);

        // One dispatch table per polymorphic base, the record's own first.
        if polymorphic {
            self.emit_vtable(p, id, id, &record_name);
            let bases: Vec<lucid_ir::BaseSpecifier> = p.arena().base_list(rd.bases).to_vec();
            for base in bases {
                if is_polymorphic(p, base.record) {
                    self.emit_vtable(p, id, base.record, &record_name);
                }
            }
        }

        // Member functions become free functions; fields were flattened
        // above; nested declarations keep their ordinary lowering.
        let members: Vec<DeclId> = p.arena().decl_list(rd.members).to_vec();
        for member in members {
            match p.arena().decl(member).kind {
                DeclKind::Field { .. } => {}
                DeclKind::Function(fd) => {
                    if !fd.flags.contains(FnFlags::IMPLICIT) {
                        self.emit_method_as_function(p, id, member, fd, &record_name);
                    }
                }
                _ => self.decl(p, member),
            }
        }

        // A polymorphic record with no user constructor still needs one in
        // the output: something has to install the table pointer.
        if polymorphic && !record_has_user_ctor(p, id) {
            p.out.append_comment_line("synthesized: installs the dispatch table pointer");
            p.out.append_line(&format!(
                "struct {record_name} * __{record_name}_Ctor(struct {record_name} * __this)"
            ));
            p.out.open_scope();
            p.out.append_line(&format!(
                "__this->__vptr = __vtbl_{record_name}_{record_name};"
            ));
            p.out.append_line("return __this;");
            p.out.close_scope(false);
            p.out.newline();
            p.out.newline();
        }
    }

    fn function_decl(&mut self, p: &mut Printer<'_, '_>, id: DeclId) {
        let DeclKind::Function(fd) = p.arena().decl(id).kind else {
            return;
        };
        if fd.flags.contains(FnFlags::MAIN) {
            self.emit_main_trampoline(p, fd);
            return;
        }
        if let Some(parent) = fd.parent {
            // Methods are emitted from their record's lowering.
            let record_name = rules::decl_name(p, parent).to_owned();
            self.emit_method_as_function(p, parent, id, fd, &record_name);
            return;
        }
        rules::decl::function_decl(self, p, id);
    }

    fn var_decl(&mut self, p: &mut Printer<'_, '_>, id: DeclId) {
        let DeclKind::Var(vd) = p.arena().decl(id).kind else {
            return;
        };
        let ty = p.types().resolve_deduced(vd.ty);
        let name = p.name(vd.name).to_owned();

        // Arrays of class type construct through the vector helper.
        if let Some((elem, len)) = p.types().as_array(ty) {
            if let Some(record) = p.types().as_record_decl(elem) {
                if record_has_user_ctor(p, record) {
                    p.sess.enable(FeatureFlags::VEC_HELPERS);
                    let elem_text = type_name_c(p.sess, elem);
                    let ctor = special_member_name(p, record, None, FnRole::Constructor);
                    p.out
                        .append_line(&format!("{elem_text} {name}[{len}];"));
                    p.out.append_line(&format!(
                        "__vec_new({name}, sizeof({elem_text}), {len}, {ctor});"
                    ));
                    return;
                }
            }
        }

        // Class-type objects with a constructor: declare, then construct.
        if let Some(record) = p.types().as_record_decl(ty) {
            if !p.types().is_reference(ty) && !p.types().is_pointer(ty) {
                if let Some(ExprKind::Construct { args, .. }) =
                    vd.init.map(|init| p.arena().expr(init).kind)
                {
                    if record_has_user_ctor(p, record) || is_polymorphic(p, record) {
                        let ty_text = type_name_c(p.sess, ty);
                        let ctor = special_member_name(p, record, None, FnRole::Constructor);
                        p.out.append_line(&format!("{ty_text} {name};"));
                        p.out.append(&format!("{ctor}(&{name}"));
                        let arg_ids: Vec<ExprId> = p.arena().expr_list(args).to_vec();
                        for arg in arg_ids {
                            p.out.append(", ");
                            self.expr(p, arg);
                        }
                        p.out.append(")");
                        p.out.append_semi_line();
                        return;
                    }
                }
            }
        }

        let ty_text = type_name_c(p.sess, ty);
        p.out.append(&format!("{ty_text} {name}"));
        if let Some(init) = vd.init {
            p.out.append(" = ");
            self.expr(p, init);
        }
        p.out.append_semi_line();
    }

    fn member_call(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        let ExprKind::MemberCall { callee, args } = p.arena().expr(id).kind else {
            return;
        };
        let ExprKind::Member {
            base,
            member,
            arrow,
        } = p.arena().expr(strip_casts(p, callee)).kind
        else {
            rules::expr::member_call(self, p, id);
            return;
        };
        let DeclKind::Function(fd) = p.arena().decl(member).kind else {
            rules::expr::member_call(self, p, id);
            return;
        };

        let static_record = p
            .types()
            .as_record_decl(p.arena().expr(base).ty)
            .or(fd.parent);
        let Some(record) = static_record else {
            rules::expr::member_call(self, p, id);
            return;
        };

        let obj = self.render_expr(p, base);
        let obj = if arrow { obj } else { format!("&{obj}") };
        let arg_ids: Vec<ExprId> = p.arena().expr_list(args).to_vec();

        let dynamic = fd.flags.contains(FnFlags::VIRTUAL);
        if dynamic {
            // Table lookup, delta adjust, call through the raw pointer.
            let slot = slot_index(p, record, member).unwrap_or_default();
            let record_name = rules::decl_name(p, record).to_owned();
            let ret_text = type_name_c(p.sess, fd.ret);
            let mut param_texts = vec![format!("struct {record_name} *")];
            let params: Vec<DeclId> = p.arena().decl_list(fd.params).to_vec();
            for param in &params {
                if let DeclKind::Param { ty, .. } = p.arena().decl(*param).kind {
                    param_texts.push(type_name_c(p.sess, ty));
                }
            }
            p.out.append(&format!(
                "(*({ret_text} (*)({}))({obj})->__vptr[{slot}].__fn)((struct {record_name} *)((char *)({obj}) + ({obj})->__vptr[{slot}].__delta)",
                param_texts.join(", ")
            ));
            for arg in arg_ids {
                p.out.append(", ");
                self.expr(p, arg);
            }
            p.out.append_char(')');
        } else {
            let fn_name = special_member_name(p, record, Some(member), fd.role);
            p.out.append(&format!("{fn_name}({obj}"));
            for arg in arg_ids {
                p.out.append(", ");
                self.expr(p, arg);
            }
            p.out.append_char(')');
        }
    }

    fn construct_expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        // A construct expression outside a handled variable initializer
        // becomes a compound-literal-style default; constructor calls are
        // emitted at the declaration site.
        let expr = p.arena().expr(id);
        let ExprKind::Construct { args, .. } = expr.kind else {
            return;
        };
        let ty_text = type_name_c(p.sess, expr.ty);
        p.out.append(&format!("({ty_text}){{"));
        let arg_ids: Vec<ExprId> = p.arena().expr_list(args).to_vec();
        let mut needs_comma = false;
        for arg in arg_ids {
            if needs_comma {
                p.out.append(", ");
            }
            needs_comma = true;
            self.expr(p, arg);
        }
        p.out.append_char('}');
    }

    fn new_expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        let expr = p.arena().expr(id);
        let ExprKind::New { args, .. } = expr.kind else {
            return;
        };
        p.sess.enable(FeatureFlags::ALLOC);
        let pointee = match p.types().get(expr.ty).kind {
            TypeKind::Pointer(inner) => inner,
            _ => expr.ty,
        };
        let ty_text = type_name_c(p.sess, pointee);

        match p.types().as_record_decl(pointee) {
            Some(record) if record_has_user_ctor(p, record) || is_polymorphic(p, record) => {
                let ctor = special_member_name(p, record, None, FnRole::Constructor);
                p.out.append(&format!(
                    "{ctor}(({ty_text} *)malloc(sizeof({ty_text}))"
                ));
                let arg_ids: Vec<ExprId> = p.arena().expr_list(args).to_vec();
                for arg in arg_ids {
                    p.out.append(", ");
                    self.expr(p, arg);
                }
                p.out.append_char(')');
            }
            _ => {
                p.out
                    .append(&format!("({ty_text} *)malloc(sizeof({ty_text}))"));
            }
        }
    }

    fn delete_expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        let ExprKind::Delete { operand, is_array } = p.arena().expr(id).kind else {
            return;
        };
        p.sess.enable(FeatureFlags::ALLOC);
        let operand_ty = p.arena().expr(operand).ty;
        let record = p.types().as_record_decl(operand_ty);
        let obj = self.render_expr(p, operand);

        match record {
            Some(record) if record_needs_dtor_call(p, record) => {
                let dtor = special_member_name(p, record, None, FnRole::Destructor);
                if is_array {
                    p.sess.enable(FeatureFlags::VEC_HELPERS);
                    let pointee = p.types().non_reference(operand_ty);
                    let pointee = match p.types().get(pointee).kind {
                        TypeKind::Pointer(inner) => inner,
                        _ => pointee,
                    };
                    let elem_text = type_name_c(p.sess, pointee);
                    p.out.append(&format!(
                        "__vec_delete({obj}, sizeof({elem_text}), -1 /* count: approximate */, {dtor})"
                    ));
                } else {
                    p.out.append(&format!("({dtor}({obj}) , free({obj}))"));
                }
            }
            _ => p.out.append(&format!("free({obj})")),
        }
    }

    /// Derived-to-base casts become explicit pointer arithmetic through the
    /// offset map; value-category adjustments vanish; numeric conversions
    /// keep a C cast.
    fn implicit_cast(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        let expr = p.arena().expr(id);
        let ExprKind::ImplicitCast { kind, sub } = expr.kind else {
            return;
        };
        match kind {
            CastKind::DerivedToBase => {
                let derived = p.types().as_record_decl(p.arena().expr(sub).ty);
                let base = p.types().as_record_decl(expr.ty);
                let ty_text = type_name_c(p.sess, expr.ty);
                let offset = match (derived, base) {
                    (Some(derived), Some(base)) => p.sess.offsets.lookup(derived, base),
                    _ => None,
                };
                match offset {
                    Some(0) | None => {
                        p.out.append(&format!("({ty_text})"));
                        self.expr(p, sub);
                    }
                    Some(offset) => {
                        p.out
                            .append(&format!("({ty_text})((char *)"));
                        self.expr(p, sub);
                        p.out.append(&format!(" + {offset})"));
                    }
                }
            }
            CastKind::LValueToRValue
            | CastKind::NoOp
            | CastKind::ArrayToPointerDecay
            | CastKind::NullToPointer => self.expr(p, sub),
            CastKind::UserConversion => {
                // No member syntax in C; best effort is the conversion
                // source itself.
                self.expr(p, sub);
            }
            _ => {
                let ty_text = type_name_c(p.sess, expr.ty);
                p.out.append(&format!("({ty_text})"));
                self.expr(p, sub);
            }
        }
    }

    fn explicit_cast(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        let expr = p.arena().expr(id);
        let ExprKind::ExplicitCast { sub, .. } = expr.kind else {
            return;
        };
        // C has no rvalue notation; a cast to && vanishes.
        if p.types().is_rvalue_ref(expr.ty) {
            self.expr(p, sub);
            return;
        }
        let ty_text = type_name_c(p.sess, expr.ty);
        p.out.append(&format!("({ty_text})"));
        self.expr(p, sub);
    }

    fn suspend_expr(&mut self, p: &mut Printer<'_, '_>, id: ExprId) {
        // Coroutines are the other backend's job; keep the keyword form.
        rules::expr::suspend_expr(self, p, id);
    }
}

impl CfrontBackend {
    /// `static struct __mptr __vtbl_<Record>_<Base>[] = { ... };`
    fn emit_vtable(
        &mut self,
        p: &mut Printer<'_, '_>,
        record: DeclId,
        base: DeclId,
        record_name: &str,
    ) {
        let base_name = rules::decl_name(p, base).to_owned();
        let slots = vtable_slots(p, base);
        if slots.is_empty() {
            return;
        }

        let base_offset = p.sess.offsets.lookup(record, base).unwrap_or_default();
        p.out.append_line(&format!(
            "static struct __mptr __vtbl_{record_name}_{base_name}[] = "
        ));
        p.out.open_scope();
        let own_slots = vtable_slots(p, record);
        for (index, slot) in slots.iter().enumerate() {
            // The derived override occupies the slot of the entry it
            // overrides.
            let resolved = own_slots
                .iter()
                .copied()
                .find(|&own| same_slot(p, own, *slot))
                .unwrap_or(*slot);
            let target_record = match p.arena().decl(resolved).kind {
                DeclKind::Function(fd) => fd.parent.unwrap_or(record),
                _ => record,
            };
            let target_offset = p
                .sess
                .offsets
                .lookup(record, target_record)
                .unwrap_or_default();
            let delta = target_offset as i64 - base_offset as i64;
            let fn_name = match p.arena().decl(resolved).kind {
                DeclKind::Function(fd) => {
                    special_member_name(p, target_record, Some(resolved), fd.role)
                }
                _ => continue,
            };
            let marker = if delta != 0 {
                " /* delta: approximate */"
            } else {
                ""
            };
            p.out.append_line(&format!(
                "{{ {delta}{marker}, {index}, (void (*)()) {fn_name} }},"
            ));
        }
        p.out.close_scope(false);
        p.out.append_line(";");
        p.out.newline();
    }

    /// A member function as a free function taking `__this` first.
    fn emit_method_as_function(
        &mut self,
        p: &mut Printer<'_, '_>,
        record: DeclId,
        member: DeclId,
        fd: FnDecl,
        record_name: &str,
    ) {
        let fn_name = special_member_name(p, record, Some(member), fd.role);
        let ret_text = match fd.role {
            FnRole::Constructor => format!("struct {record_name} *"),
            FnRole::Destructor => "void".to_owned(),
            _ => type_name_c(p.sess, fd.ret),
        };

        let mut params = vec![format!("struct {record_name} * __this")];
        let param_ids: Vec<DeclId> = p.arena().decl_list(fd.params).to_vec();
        for param in &param_ids {
            if let DeclKind::Param { name, ty } = p.arena().decl(*param).kind {
                let name = p.name(name).to_owned();
                let ty_text = type_name_c(p.sess, ty);
                params.push(format!("{ty_text} {name}"));
            }
        }

        p.out
            .append_line(&format!("{ret_text} {fn_name}({})", params.join(", ")));
        p.out.open_scope();

        if fd.role == FnRole::Constructor {
            self.emit_ctor_body(p, record, fd, record_name);
        }

        if let Some(body) = fd.body {
            match p.arena().stmt(body).kind {
                StmtKind::Compound { stmts } => {
                    let children: Vec<lucid_ir::StmtId> = p.arena().stmt_list(stmts).to_vec();
                    for child in children {
                        self.stmt(p, child);
                    }
                }
                _ => walk_stmt(self, p, body),
            }
        }

        if fd.role == FnRole::Destructor {
            self.emit_dtor_epilogue(p, record);
        }
        if fd.role == FnRole::Constructor {
            p.out.append_line("return __this;");
        }

        p.out.close_scope(false);
        p.out.newline();
        p.out.newline();
    }

    /// Constructor prologue: bases, then dispatch-table pointers, then own
    /// fields - in that order.
    fn emit_ctor_body(
        &mut self,
        p: &mut Printer<'_, '_>,
        record: DeclId,
        fd: FnDecl,
        record_name: &str,
    ) {
        let DeclKind::Record(rd) = p.arena().decl(record).kind else {
            return;
        };
        let bases: Vec<lucid_ir::BaseSpecifier> = p.arena().base_list(rd.bases).to_vec();
        let inits: Vec<lucid_ir::CtorInit> = p.arena().ctor_init_list(fd.inits).to_vec();

        // Base subobjects first.
        for base in &bases {
            let base_name = rules::decl_name(p, base.record).to_owned();
            if !record_has_user_ctor(p, base.record) && !is_polymorphic(p, base.record) {
                continue;
            }
            let ctor = special_member_name(p, base.record, None, FnRole::Constructor);
            let offset = p
                .sess
                .offsets
                .lookup(record, base.record)
                .unwrap_or_default();
            let base_init = inits
                .iter()
                .find(|init| init.target == CtorTarget::Base(base.record))
                .map(|init| init.init);
            if offset == 0 {
                p.out
                    .append(&format!("{ctor}((struct {base_name} *)__this"));
            } else {
                p.out.append(&format!(
                    "{ctor}((struct {base_name} *)((char *)__this + {offset})"
                ));
            }
            if let Some(init) = base_init {
                if let ExprKind::Construct { args, .. } = p.arena().expr(init).kind {
                    let arg_ids: Vec<ExprId> = p.arena().expr_list(args).to_vec();
                    for arg in arg_ids {
                        p.out.append(", ");
                        self.expr(p, arg);
                    }
                }
            }
            p.out.append(")");
            p.out.append_semi_line();
        }

        // Install the dispatch-table pointers this record owns.
        if is_polymorphic(p, record) {
            p.out
                .append_line(&format!("__this->__vptr = __vtbl_{record_name}_{record_name};"));
            for (i, base) in bases.iter().enumerate() {
                if i == 0 || !is_polymorphic(p, base.record) {
                    continue;
                }
                let base_name = rules::decl_name(p, base.record).to_owned();
                p.out.append_line(&format!(
                    "__this->__vptr_{base_name} = __vtbl_{record_name}_{base_name}; /* secondary base: approximate */"
                ));
            }
        }

        // Own fields last.
        for init in &inits {
            let CtorTarget::Field(field) = init.target else {
                continue;
            };
            let field_name = rules::decl_name(p, field).to_owned();
            p.out.append(&format!("__this->{field_name} = "));
            self.expr(p, init.init);
            p.out.append_semi_line();
        }
    }

    /// Destructor epilogue: base destructors in reverse declaration order.
    fn emit_dtor_epilogue(&mut self, p: &mut Printer<'_, '_>, record: DeclId) {
        let DeclKind::Record(rd) = p.arena().decl(record).kind else {
            return;
        };
        let bases: Vec<lucid_ir::BaseSpecifier> = p.arena().base_list(rd.bases).to_vec();
        for base in bases.iter().rev() {
            if !record_needs_dtor_call(p, base.record) {
                continue;
            }
            let base_name = rules::decl_name(p, base.record).to_owned();
            let dtor = special_member_name(p, base.record, None, FnRole::Destructor);
            let offset = p
                .sess
                .offsets
                .lookup(record, base.record)
                .unwrap_or_default();
            if offset == 0 {
                p.out
                    .append_line(&format!("{dtor}((struct {base_name} *)__this);"));
            } else {
                p.out.append_line(&format!(
                    "{dtor}((struct {base_name} *)((char *)__this + {offset}));"
                ));
            }
        }
    }

    /// The startup shim: the user's `main` is renamed and a synthesized
    /// `main` calls it.
    fn emit_main_trampoline(&mut self, p: &mut Printer<'_, '_>, fd: FnDecl) {
        let ret_text = type_name_c(p.sess, fd.ret);
        let mut params = Vec::new();
        let mut args = Vec::new();
        let param_ids: Vec<DeclId> = p.arena().decl_list(fd.params).to_vec();
        for param in param_ids {
            if let DeclKind::Param { name, ty } = p.arena().decl(param).kind {
                let name = p.name(name).to_owned();
                let ty_text = type_name_c(p.sess, ty);
                params.push(format!("{ty_text} {name}"));
                args.push(name);
            }
        }

        p.out
            .append_line(&format!("{ret_text} __main({})", params.join(", ")));
        if let Some(body) = fd.body {
            walk_stmt(self, p, body);
        } else {
            p.out.append_semi_line();
        }

        p.out.newline();
        p.out
            .append_line(&format!("{ret_text} main({})", params.join(", ")));
        p.out.open_scope();
        p.out
            .append_line(&format!("int ret = __main({});", args.join(", ")));
        p.out.append_line("return ret;");
        p.out.close_scope(false);
        p.out.newline();
    }
}

// --- helpers ---

/// `__<Record>_Ctor`, `__<Record>_Dtor`, `__<Record>_<name>`.
fn special_member_name(
    p: &Printer<'_, '_>,
    record: DeclId,
    member: Option<DeclId>,
    role: FnRole,
) -> String {
    let record_name = rules::decl_name(p, record);
    match role {
        FnRole::Constructor => format!("__{record_name}_Ctor"),
        FnRole::Destructor => format!("__{record_name}_Dtor"),
        _ => {
            let fn_name = member.map(|m| rules::decl_name(p, m)).unwrap_or("");
            format!("__{record_name}_{}", c_mangle(fn_name))
        }
    }
}

/// C identifiers allow only alphanumerics and underscores.
fn c_mangle(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn strip_casts(p: &Printer<'_, '_>, id: ExprId) -> ExprId {
    match p.arena().expr(id).kind {
        ExprKind::Paren { sub } | ExprKind::ImplicitCast { sub, .. } => strip_casts(p, sub),
        _ => id,
    }
}

fn record_has_user_ctor(p: &Printer<'_, '_>, record: DeclId) -> bool {
    let DeclKind::Record(rd) = p.arena().decl(record).kind else {
        return false;
    };
    let members: Vec<DeclId> = p.arena().decl_list(rd.members).to_vec();
    members.iter().any(|&member| {
        matches!(
            p.arena().decl(member).kind,
            DeclKind::Function(fd)
                if fd.role == FnRole::Constructor && !fd.flags.contains(FnFlags::IMPLICIT)
        )
    })
}

fn record_needs_dtor_call(p: &Printer<'_, '_>, record: DeclId) -> bool {
    let DeclKind::Record(rd) = p.arena().decl(record).kind else {
        return false;
    };
    let members: Vec<DeclId> = p.arena().decl_list(rd.members).to_vec();
    members.iter().any(|&member| {
        matches!(
            p.arena().decl(member).kind,
            DeclKind::Function(fd)
                if fd.role == FnRole::Destructor && !fd.flags.contains(FnFlags::IMPLICIT)
        )
    })
}

fn same_slot(p: &Printer<'_, '_>, a: DeclId, b: DeclId) -> bool {
    let name_of = |id: DeclId| match p.arena().decl(id).kind {
        DeclKind::Function(fd) => Some((p.name(fd.name), fd.role == FnRole::Destructor)),
        _ => None,
    };
    name_of(a).is_some() && name_of(a) == name_of(b)
}

/// Flattened C fields of a record: the record's own dispatch-table pointer
/// (when it introduces one), base fields in declaration order - a secondary
/// polymorphic base gets a renamed table pointer - then own fields.
fn flatten_fields(p: &mut Printer<'_, '_>, record: DeclId, vptr_name: &str, out: &mut Vec<String>) {
    let DeclKind::Record(rd) = p.arena().decl(record).kind else {
        return;
    };
    let layout = record_layout(p, record);
    if layout.own_vptr {
        out.push(format!("struct __mptr *{vptr_name};"));
    }
    let bases: Vec<lucid_ir::BaseSpecifier> = p.arena().base_list(rd.bases).to_vec();
    for (i, base) in bases.iter().enumerate() {
        let nested_name = if i == 0 {
            vptr_name.to_owned()
        } else {
            format!("__vptr_{}", rules::decl_name(p, base.record))
        };
        flatten_fields(p, base.record, &nested_name, out);
    }
    let members: Vec<DeclId> = p.arena().decl_list(rd.members).to_vec();
    for member in members {
        if let DeclKind::Field { name, ty, .. } = p.arena().decl(member).kind {
            let name = p.name(name).to_owned();
            let ty_text = type_name_c(p.sess, ty);
            out.push(format!("{ty_text} {name};"));
        }
    }
}

/// Record this-pointer offsets for `record` and, transitively, the bases of
/// its bases, shifted by the enclosing offset.
fn populate_offsets(p: &mut Printer<'_, '_>, root: DeclId, record: DeclId, shift: u64) {
    let layout = record_layout(p, record);
    for (base, offset) in layout.base_offsets {
        p.sess.offsets.record(root, base, shift + offset);
        populate_offsets(p, root, base, shift + offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_mangle_strips_punctuation() {
        assert_eq!(c_mangle("operator()"), "operator__");
        assert_eq!(c_mangle("run"), "run");
    }
}

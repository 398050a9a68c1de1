//! Declaration rules.
//!
//! Inferred-type reveal, decomposition expansion and the
//! compiler-synthesized special-member reveal live here, next to the plain
//! printing of functions, records and namespaces.

use lucid_ir::{
    BindingAccess, DeclId, DeclKind, ExprId, ExprKind, FnDecl, FnFlags, FnRole, Name, RecordTag,
    StmtKind, StorageClass, TypeId,
};

use crate::dispatch::Backend;
use crate::hoist::HoistKind;
use crate::printer::Printer;
use crate::rules::decl_name;
use crate::rules::stmt::{compound_with_scope, flush_hoist};
use crate::type_name::{type_name, type_name_with_declarator};

/// A variable declaration with the deduced type revealed.
///
/// `with_semi` is false inside a for-init where the statement provides its
/// own punctuation.
pub fn var_decl<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: DeclId, with_semi: bool) {
    let DeclKind::Var(vd) = p.arena().decl(id).kind else {
        return;
    };

    p.hoist.push(HoistKind::VarDecl, &p.out);

    match vd.storage {
        StorageClass::Static => p.out.append("static "),
        StorageClass::Extern => p.out.append("extern "),
        StorageClass::None => {}
    }
    if vd.is_constexpr {
        p.out.append("constexpr ");
    }

    // Inferred-type reveal: the placeholder prints as what it deduced to.
    let ty = p.types().resolve_deduced(vd.ty);
    let name = p.name(vd.name).to_owned();
    let declarator = type_name_with_declarator(p.sess, ty, &name);
    p.out.append(&declarator);

    if let Some(init) = vd.init {
        p.out.append(" = ");
        b.expr(p, init);
    }
    if with_semi {
        p.out.append_semi_line();
    }

    flush_hoist(p);
}

/// Decomposition-binding expansion: one hidden backing declaration followed
/// by exactly one explicit declaration per binding.
pub fn decomposition<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: DeclId) {
    let decl = p.arena().decl(id);
    let DeclKind::Decomposition { ty, init, bindings } = decl.kind else {
        return;
    };

    // The backing object's name is derived from the initializer's referenced
    // declaration and the source position, so repeated lowering agrees.
    let base = find_decl_ref(p, init)
        .map(|d| decl_name(p, d).to_owned())
        .unwrap_or_default();
    let backing = p.sess.line_col_name(&base, decl.span);
    let is_ref = p.types().is_reference(ty);

    let declarator = type_name_with_declarator(p.sess, ty, &backing);
    p.out.append(&declarator);
    p.out.append(" = ");
    b.expr(p, init);
    p.out.append_semi_line();

    let binding_ids: Vec<DeclId> = p.arena().decl_list(bindings).to_vec();
    for binding in binding_ids {
        let DeclKind::Binding { name, ty, access } = p.arena().decl(binding).kind else {
            continue;
        };
        let name = p.name(name).to_owned();

        // Add a reference qualifier unless the accessor already returns one.
        let suffix = if p.types().is_reference(ty) {
            ""
        } else {
            match access {
                BindingAccess::Field { .. } => "&",
                BindingAccess::TupleGet { returns_ref, .. } => {
                    if returns_ref {
                        "&"
                    } else {
                        ""
                    }
                }
                BindingAccess::ArrayIndex { .. } => {
                    if is_ref {
                        "&"
                    } else {
                        ""
                    }
                }
            }
        };

        let type_text = type_name(p.sess, ty);
        p.out.append(&format!("{type_text}{suffix} {name} = "));
        match access {
            BindingAccess::Field { name: field } => {
                let field = p.name(field);
                p.out.append(&format!("{backing}.{field}"));
            }
            BindingAccess::TupleGet { index, .. } => {
                p.out.append(&format!("std::get<{index}>({backing})"));
            }
            BindingAccess::ArrayIndex { index } => {
                p.out.append(&format!("{backing}[{index}]"));
            }
        }
        p.out.append_semi_line();
    }
}

/// A function parameter in a parameter list: `type name`.
pub fn param_decl(p: &mut Printer<'_, '_>, id: DeclId) {
    let DeclKind::Param { name, ty } = p.arena().decl(id).kind else {
        return;
    };
    let name = p.name(name).to_owned();
    let text = if name.is_empty() {
        type_name(p.sess, ty)
    } else {
        type_name_with_declarator(p.sess, ty, &name)
    };
    p.out.append(&text);
}

/// A record field at class scope.
pub fn field_decl<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: DeclId) {
    let DeclKind::Field { name, ty, init } = p.arena().decl(id).kind else {
        return;
    };
    let name = p.name(name).to_owned();
    let declarator = type_name_with_declarator(p.sess, ty, &name);
    p.out.append(&declarator);
    if let Some(init) = init {
        p.out.append(" = ");
        b.expr(p, init);
    }
    p.out.append_semi_line();
}

/// Render a function signature. Used both for normal printing and for the
/// special-member reveal.
pub(crate) fn signature_text(p: &mut Printer<'_, '_>, id: DeclId, fd: FnDecl) -> String {
    let mut sig = String::new();
    if fd.flags.contains(FnFlags::STATIC) {
        sig.push_str("static ");
    }
    if fd.flags.contains(FnFlags::INLINE) || fd.flags.contains(FnFlags::IMPLICIT) {
        sig.push_str("inline ");
    }
    if fd.flags.contains(FnFlags::CONSTEXPR) {
        sig.push_str("constexpr ");
    }
    if fd.flags.contains(FnFlags::VIRTUAL) {
        sig.push_str("virtual ");
    }

    let fn_name = display_fn_name(p, id, fd);
    match fd.role {
        FnRole::Constructor | FnRole::Destructor => sig.push_str(&fn_name),
        _ => {
            let ret = type_name(p.sess, fd.ret);
            sig.push_str(&format!("{ret} {fn_name}"));
        }
    }

    sig.push('(');
    let params: Vec<DeclId> = p.arena().decl_list(fd.params).to_vec();
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            sig.push_str(", ");
        }
        if let DeclKind::Param { name, ty } = p.arena().decl(*param).kind {
            let name = p.name(name).to_owned();
            if name.is_empty() {
                sig.push_str(&type_name(p.sess, ty));
            } else {
                sig.push_str(&type_name_with_declarator(p.sess, ty, &name));
            }
        }
    }
    sig.push(')');

    if fd.flags.contains(FnFlags::CONST) {
        sig.push_str(" const");
    }
    if fd.flags.contains(FnFlags::NOEXCEPT) {
        sig.push_str(" noexcept");
    }
    if fd.flags.contains(FnFlags::OVERRIDE) {
        sig.push_str(" override");
    }
    sig
}

fn display_fn_name(p: &mut Printer<'_, '_>, _id: DeclId, fd: FnDecl) -> String {
    match fd.role {
        FnRole::Constructor => parent_name(p, fd),
        FnRole::Destructor => format!("~{}", parent_name(p, fd)),
        _ => p.name(fd.name).to_owned(),
    }
}

fn parent_name(p: &Printer<'_, '_>, fd: FnDecl) -> String {
    fd.parent
        .map(|parent| decl_name(p, parent).to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| p.name(fd.name).to_owned())
}

pub fn function_decl<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: DeclId) {
    let DeclKind::Function(fd) = p.arena().decl(id).kind else {
        return;
    };

    // A compiler-synthesized member reached outside its record still prints
    // only the reveal comment.
    if fd.flags.contains(FnFlags::IMPLICIT) {
        special_member_reveal(p, id, fd);
        return;
    }

    let sig = signature_text(p, id, fd);
    p.out.append(&sig);

    if fd.flags.contains(FnFlags::DELETED) {
        p.out.append_line(" = delete;");
        return;
    }
    if fd.flags.contains(FnFlags::DEFAULTED) {
        p.out.append_line(" = default;");
        return;
    }

    let Some(body) = fd.body else {
        p.out.append_semi_line();
        return;
    };

    // Constructor member initializers.
    if fd.role == FnRole::Constructor && !fd.inits.is_empty() {
        p.out.newline();
        p.out.append(": ");
        let inits: Vec<lucid_ir::CtorInit> = p.arena().ctor_init_list(fd.inits).to_vec();
        for (i, init) in inits.iter().enumerate() {
            if i > 0 {
                p.out.append(", ");
            }
            let target = match init.target {
                lucid_ir::CtorTarget::Field(field) => decl_name(p, field).to_owned(),
                lucid_ir::CtorTarget::Base(base) => decl_name(p, base).to_owned(),
            };
            p.out.append(&target);
            p.out.append_char('{');
            b.expr(p, init.init);
            p.out.append_char('}');
        }
    }

    p.out.newline();
    if matches!(p.arena().stmt(body).kind, StmtKind::CoroutineBody { .. }) {
        b.coroutine_body(p, id, body);
    } else {
        compound_with_scope(b, p, body, true);
    }
    p.out.newline();
}

/// The compiler provides this member; show what it would look like. A
/// special member is only implicitly *declared*, never implicitly defined,
/// until it is used.
pub(crate) fn special_member_reveal(p: &mut Printer<'_, '_>, id: DeclId, fd: FnDecl) {
    let sig = signature_text(p, id, fd);
    if fd.flags.contains(FnFlags::USED) {
        p.out.append_line(&format!("// {sig} = default;"));
    } else {
        p.out
            .append_line(&format!("// {sig} = default; (declared, not defined)"));
    }
}

pub fn record_decl<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: DeclId) {
    let DeclKind::Record(rd) = p.arena().decl(id).kind else {
        return;
    };

    p.out.append(match rd.tag {
        RecordTag::Struct => "struct ",
        RecordTag::Class => "class ",
    });
    p.out.append(p.sess.name(rd.name));

    if !rd.has_definition {
        p.out.append_semi_line();
        return;
    }

    let bases: Vec<lucid_ir::BaseSpecifier> = p.arena().base_list(rd.bases).to_vec();
    if !bases.is_empty() {
        p.out.append(" : ");
        for (i, base) in bases.iter().enumerate() {
            if i > 0 {
                p.out.append(", ");
            }
            let name = decl_name(p, base.record).to_owned();
            p.out.append(&format!("{} {name}", base.access.spelling()));
        }
    }

    p.out.newline();
    p.out.open_scope();
    let members: Vec<DeclId> = p.arena().decl_list(rd.members).to_vec();
    for member in members {
        match p.arena().decl(member).kind {
            DeclKind::Function(fd) if fd.flags.contains(FnFlags::IMPLICIT) => {
                special_member_reveal(p, member, fd);
            }
            _ => b.decl(p, member),
        }
    }
    p.out.close_scope(false);
    p.out.append_line(";");
    p.out.newline();
}

pub fn namespace_decl<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: DeclId) {
    let DeclKind::Namespace { name, decls } = p.arena().decl(id).kind else {
        return;
    };
    let name = p.name(name);
    p.out.append_line(&format!("namespace {name}"));
    p.out.open_scope();
    let ids: Vec<DeclId> = p.arena().decl_list(decls).to_vec();
    for decl in ids {
        b.decl(p, decl);
    }
    p.out.close_scope(false);
    p.out.append_line("");
}

pub fn type_alias(p: &mut Printer<'_, '_>, name: Name, ty: TypeId) {
    let name = p.name(name).to_owned();
    let target = type_name(p.sess, ty);
    p.out.append_line(&format!("using {name} = {target};"));
}

pub fn static_assert<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, cond: ExprId, message: Name) {
    p.out.append("static_assert(");
    b.expr(p, cond);
    if !message.is_empty() {
        let message = p.name(message);
        p.out.append(&format!(", \"{}\"", message.escape_default()));
    }
    p.out.append(")");
    p.out.append_semi_line();
}

/// The declaration a (possibly cast-wrapped) expression refers to.
pub(crate) fn find_decl_ref(p: &Printer<'_, '_>, expr: ExprId) -> Option<DeclId> {
    match p.arena().expr(expr).kind {
        ExprKind::DeclRef(decl) => Some(decl),
        ExprKind::ImplicitCast { sub, .. }
        | ExprKind::ExplicitCast { sub, .. }
        | ExprKind::Paren { sub } => find_decl_ref(p, sub),
        ExprKind::Unary { operand, .. } => find_decl_ref(p, operand),
        ExprKind::Member { base, .. } => find_decl_ref(p, base),
        _ => None,
    }
}

//! Closure-to-class lowering.
//!
//! A closure expression becomes a record with one field per capture, the
//! call operator holding the body, and a constructor initializing the
//! fields from the captured expressions. The record's definition travels
//! through the deferred-placement stack so it lands before the construct
//! that uses the closure; a construction expression replaces the closure at
//! the original use site.

use lucid_emit::OutputBuf;
use lucid_ir::{Capture, CaptureKind, DeclId, DeclKind, ExprId, ExprKind, FnFlags, TypeKind};

use crate::dispatch::Backend;
use crate::hoist::HoistKind;
use crate::printer::Printer;
use crate::rules::decl_name;
use crate::type_name::{closure_name, type_name};

pub fn lambda_expr<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, id: ExprId) {
    let ExprKind::Lambda { class, captures } = p.arena().expr(id).kind else {
        return;
    };
    let name = closure_name(p.sess, class);
    let captures: Vec<Capture> = p.arena().capture_list(captures).to_vec();

    // With no enclosing construct on the stack the closure carries its own
    // frame, which splices the class text directly before the use site.
    let own_frame = p.hoist.is_empty();
    if own_frame {
        p.hoist.push(HoistKind::LambdaExpr, &p.out);
    }

    // Build the class text against a detached buffer; the hoist frame
    // cannot be written through while the printer is borrowed.
    let detached = OutputBuf::with_indent_of(&p.out);
    let saved = std::mem::replace(&mut p.out, detached);
    emit_closure_class(b, p, class, &captures, &name);
    let class_text = std::mem::replace(&mut p.out, saved).into_string();

    match p.hoist.top_mut() {
        Some(frame) => frame.buf.append(&class_text),
        // Unreachable, but the policy is degrade-in-place, never fail.
        None => p.out.append(&class_text),
    }

    if own_frame {
        crate::rules::stmt::flush_hoist(p);
    }

    // The use site: construct the closure object.
    p.out.append(&name);
    emit_construction(b, p, &captures);
}

fn emit_closure_class<B: Backend>(
    b: &mut B,
    p: &mut Printer<'_, '_>,
    class: DeclId,
    captures: &[Capture],
    name: &str,
) {
    let DeclKind::Record(rd) = p.arena().decl(class).kind else {
        return;
    };

    p.out.append_line(&format!("class {name}"));
    p.out.open_scope();
    p.out.append_line("public: ");

    // The call operator (and any conversion operators the front end
    // recorded) hold the body.
    let captured_this = captures
        .iter()
        .any(|c| matches!(c.kind, CaptureKind::This | CaptureKind::StarThis));
    let members: Vec<DeclId> = p.arena().decl_list(rd.members).to_vec();
    let previous_this = p.closure_this;
    if captured_this {
        p.closure_this = Some("__this");
    }
    for member in &members {
        if let DeclKind::Function(fd) = p.arena().decl(*member).kind {
            if !fd.flags.contains(FnFlags::IMPLICIT) {
                crate::rules::decl::function_decl(b, p, *member);
            }
        }
    }
    p.closure_this = previous_this;

    if !captures.is_empty() {
        p.out.newline();
        p.out.append_line("private: ");
        for capture in captures {
            let field = capture_field_text(p, capture);
            p.out.append_line(&format!("{field};"));
        }
        p.out.newline();

        // Constructor: one parameter per capture, fields initialized in
        // capture order.
        let mut params = Vec::new();
        let mut inits = Vec::new();
        for capture in captures {
            let field_name = capture_name(p, capture);
            if is_array_capture(p, capture) {
                // Array captures cannot travel through a by-value
                // constructor parameter; the field alone documents the copy.
                continue;
            }
            params.push(capture_param_text(p, capture, &field_name));
            inits.push(format!("{field_name}{{_{field_name}}}"));
        }
        p.out.append_line(&format!("public: {name}({})", params.join(", ")));
        p.out.append_line(&format!(": {}", inits.join(", ")));
        p.out.append_line("{}");
    }

    p.out.close_scope(false);
    p.out.append_line(";");
}

fn emit_construction<B: Backend>(b: &mut B, p: &mut Printer<'_, '_>, captures: &[Capture]) {
    p.out.append_char('{');
    let mut needs_comma = false;
    for capture in captures {
        if is_array_capture(p, capture) {
            continue;
        }
        if needs_comma {
            p.out.append(", ");
        }
        needs_comma = true;
        match capture.kind {
            CaptureKind::StarThis => {
                p.out.append_char('*');
                b.expr(p, capture.init);
            }
            _ => b.expr(p, capture.init),
        }
    }
    p.out.append_char('}');
}

/// Name of the field a capture lands in.
fn capture_name(p: &Printer<'_, '_>, capture: &Capture) -> String {
    match capture.kind {
        CaptureKind::This | CaptureKind::StarThis => "__this".to_owned(),
        _ => capture
            .var
            .map(|var| decl_name(p, var).to_owned())
            .unwrap_or_default(),
    }
}

fn capture_ty(p: &Printer<'_, '_>, capture: &Capture) -> lucid_ir::TypeId {
    match capture.var {
        Some(var) => match p.arena().decl(var).kind {
            DeclKind::Var(vd) => vd.ty,
            DeclKind::Param { ty, .. } | DeclKind::Binding { ty, .. } => ty,
            _ => p.arena().expr(capture.init).ty,
        },
        None => p.arena().expr(capture.init).ty,
    }
}

fn is_array_capture(p: &Printer<'_, '_>, capture: &Capture) -> bool {
    let ty = capture_ty(p, capture);
    p.types().as_array(ty).is_some()
}

/// Field declarator for one capture.
fn capture_field_text(p: &mut Printer<'_, '_>, capture: &Capture) -> String {
    let name = capture_name(p, capture);
    let ty = capture_ty(p, capture);
    match capture.kind {
        CaptureKind::This => {
            // The captured `this` pointer keeps its pointer type.
            format!("{} {name}", type_name(p.sess, ty))
        }
        CaptureKind::StarThis => {
            let pointee = match p.types().get(ty).kind {
                TypeKind::Pointer(inner) => inner,
                _ => ty,
            };
            format!("{} {name}", type_name(p.sess, pointee))
        }
        CaptureKind::ByRef => {
            if let Some((elem, len)) = p.types().as_array(ty) {
                format!("{} (&{name})[{len}]", type_name(p.sess, elem))
            } else if p.types().is_reference(ty) {
                format!("{} {name}", type_name(p.sess, ty))
            } else {
                format!("{} & {name}", type_name(p.sess, ty))
            }
        }
        CaptureKind::ByValue => {
            crate::type_name::type_name_with_declarator(p.sess, ty, &name)
        }
    }
}

/// Constructor parameter declarator for one capture (`_<name>`).
fn capture_param_text(p: &mut Printer<'_, '_>, capture: &Capture, field_name: &str) -> String {
    let ty = capture_ty(p, capture);
    let param = format!("_{field_name}");
    match capture.kind {
        CaptureKind::This | CaptureKind::StarThis => {
            format!("{} {param}", type_name(p.sess, ty))
        }
        CaptureKind::ByRef if !p.types().is_reference(ty) => {
            format!("{} & {param}", type_name(p.sess, ty))
        }
        _ => crate::type_name::type_name_with_declarator(p.sess, ty, &param),
    }
}

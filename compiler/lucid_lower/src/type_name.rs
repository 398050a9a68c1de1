//! Type spelling.
//!
//! Turns interned types back into source text. Deduced placeholders print
//! what they deduced to; closure types print a made-up name derived from the
//! closure's source location, since the real type is unnameable.

use lucid_ir::{DeclId, DeclKind, Quals, TypeId, TypeKind};

use crate::session::LoweringSession;

/// The deterministic name of a closure class.
///
/// `__lambda_<line>_<col>` when the closure has a source anchor; a
/// session-scoped counter otherwise (synthesized closures). Cached so every
/// request within a session agrees.
pub fn closure_name(sess: &mut LoweringSession<'_>, class: DeclId) -> String {
    if let Some(cached) = sess.closure_names.get(&class) {
        return cached.clone();
    }
    let span = sess.module.arena.decl(class).span;
    let name = if span.is_dummy() {
        format!("__lambda_{}", sess.counters.next_closure())
    } else {
        sess.line_col_name("lambda_", span)
    };
    sess.closure_names.insert(class, name.clone());
    name
}

/// C++ spelling of a type.
pub fn type_name(sess: &mut LoweringSession<'_>, ty: TypeId) -> String {
    let t = sess.module.types.get(ty);
    let mut prefix = String::new();
    if t.quals.contains(Quals::CONST) {
        prefix.push_str("const ");
    }
    if t.quals.contains(Quals::VOLATILE) {
        prefix.push_str("volatile ");
    }

    let core = match t.kind {
        TypeKind::Builtin(kind) => kind.spelling().to_owned(),
        TypeKind::Pointer(inner) => format!("{} *", type_name(sess, inner)),
        TypeKind::LValueRef(inner) => format!("{} &", type_name(sess, inner)),
        TypeKind::RValueRef(inner) => format!("{} &&", type_name(sess, inner)),
        TypeKind::Array { elem, len } => format!("{}[{len}]", type_name(sess, elem)),
        TypeKind::Function { ret, params } => {
            let ret_name = type_name(sess, ret);
            let params: Vec<TypeId> = sess.module.types.param_types(params).to_vec();
            let rendered: Vec<String> = params.into_iter().map(|p| type_name(sess, p)).collect();
            format!("{ret_name} ({})", rendered.join(", "))
        }
        TypeKind::Record(decl) => record_name(sess, decl),
        TypeKind::Closure(class) => closure_name(sess, class),
        TypeKind::Deduced { deduced } => type_name(sess, deduced),
    };

    format!("{prefix}{core}")
}

/// Spelling of a type in a declarator position: `int x`, `int (&x)[3]`,
/// `void (*x)(int)`.
pub fn type_name_with_declarator(
    sess: &mut LoweringSession<'_>,
    ty: TypeId,
    name: &str,
) -> String {
    let t = sess.module.types.get(ty);
    match t.kind {
        TypeKind::Array { elem, len } => {
            format!("{} {name}[{len}]", type_name(sess, elem))
        }
        TypeKind::LValueRef(inner) => {
            if let Some((elem, len)) = sess.module.types.as_array(inner) {
                format!("{} (&{name})[{len}]", type_name(sess, elem))
            } else {
                format!("{} {name}", type_name(sess, ty))
            }
        }
        TypeKind::Pointer(inner) => {
            if let TypeKind::Function { ret, params } = sess.module.types.get(inner).kind {
                let ret_name = type_name(sess, ret);
                let param_ids: Vec<TypeId> = sess.module.types.param_types(params).to_vec();
                let rendered: Vec<String> =
                    param_ids.into_iter().map(|p| type_name(sess, p)).collect();
                format!("{ret_name} (*{name})({})", rendered.join(", "))
            } else {
                format!("{} {name}", type_name(sess, ty))
            }
        }
        _ => format!("{} {name}", type_name(sess, ty)),
    }
}

/// C spelling of a type, used by the dispatch-table backend: records carry
/// the `struct` keyword, references become pointers (C has no references).
pub fn type_name_c(sess: &mut LoweringSession<'_>, ty: TypeId) -> String {
    let t = sess.module.types.get(ty);
    let mut prefix = String::new();
    if t.quals.contains(Quals::CONST) {
        prefix.push_str("const ");
    }

    let core = match t.kind {
        TypeKind::Builtin(kind) => kind.spelling().to_owned(),
        TypeKind::Pointer(inner) | TypeKind::LValueRef(inner) | TypeKind::RValueRef(inner) => {
            format!("{} *", type_name_c(sess, inner))
        }
        TypeKind::Array { elem, len } => format!("{}[{len}]", type_name_c(sess, elem)),
        TypeKind::Function { ret, params } => {
            let ret_name = type_name_c(sess, ret);
            let param_ids: Vec<TypeId> = sess.module.types.param_types(params).to_vec();
            let rendered: Vec<String> =
                param_ids.into_iter().map(|p| type_name_c(sess, p)).collect();
            format!("{ret_name} ({})", rendered.join(", "))
        }
        TypeKind::Record(decl) => format!("struct {}", record_name(sess, decl)),
        TypeKind::Closure(class) => format!("struct {}", closure_name(sess, class)),
        TypeKind::Deduced { deduced } => type_name_c(sess, deduced),
    };

    format!("{prefix}{core}")
}

fn record_name(sess: &mut LoweringSession<'_>, decl: DeclId) -> String {
    match sess.module.arena.decl(decl).kind {
        DeclKind::Record(rd) => sess.name(rd.name).to_owned(),
        // A closure class reached through a record reference.
        _ => closure_name(sess, decl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucid_ir::{build, LineIndex, Module, Name, Quals, Span, TypeKind};
    use pretty_assertions::assert_eq;

    use crate::config::Config;

    #[test]
    fn builtin_and_pointer_spelling() {
        let mut module = Module::new();
        let mut sess = LoweringSession::new(&mut module, Config::default());
        let ptr = sess.module.types.pointer_to(TypeId::INT);
        assert_eq!(type_name(&mut sess, TypeId::INT), "int");
        assert_eq!(type_name(&mut sess, ptr), "int *");
    }

    #[test]
    fn deduced_reveals_resolved_type() {
        let mut module = Module::new();
        let mut sess = LoweringSession::new(&mut module, Config::default());
        let auto = sess
            .module
            .types
            .intern(TypeKind::Deduced { deduced: TypeId::INT }, Quals::empty());
        assert_eq!(type_name(&mut sess, auto), "int");
    }

    #[test]
    fn reference_to_array_declarator() {
        let mut module = Module::new();
        let mut sess = LoweringSession::new(&mut module, Config::default());
        let arr = sess.module.types.intern(
            TypeKind::Array {
                elem: TypeId::INT,
                len: 3,
            },
            Quals::empty(),
        );
        let arr_ref = sess.module.types.lvalue_ref_to(arr);
        assert_eq!(
            type_name_with_declarator(&mut sess, arr_ref, "v"),
            "int (&v)[3]"
        );
    }

    #[test]
    fn closure_names_come_from_location() {
        let mut module = Module::new();
        module.line_index = LineIndex::new("int a;\n  auto l = [] {};\n");
        // A closure class whose span is the lambda expression's `[`.
        let template = build::record(&mut module.arena, Name::EMPTY, &[]);
        let kind = module.arena.decl(template).kind;
        let class = module.arena.alloc_decl(kind, Span::new(17, 22));
        let mut sess = LoweringSession::new(&mut module, Config::default());
        let first = closure_name(&mut sess, class);
        let second = closure_name(&mut sess, class);
        assert_eq!(first, "__lambda_2_11");
        assert_eq!(first, second);
    }

    #[test]
    fn spanless_closures_use_the_session_counter() {
        let mut module = Module::new();
        let class = build::record(&mut module.arena, Name::EMPTY, &[]);
        let mut sess = LoweringSession::new(&mut module, Config::default());
        assert_eq!(closure_name(&mut sess, class), "__lambda_0");
        assert_eq!(closure_name(&mut sess, class), "__lambda_0");
    }

    #[test]
    fn c_spelling_uses_struct_and_pointers() {
        let mut module = Module::new();
        let record = build::record(&mut module.arena, module.interner.intern("Box"), &[]);
        let ty = module
            .types
            .intern(TypeKind::Record(record), Quals::empty());
        let r = module.types.lvalue_ref_to(ty);
        let mut sess = LoweringSession::new(&mut module, Config::default());
        assert_eq!(type_name_c(&mut sess, r), "struct Box *");
    }
}

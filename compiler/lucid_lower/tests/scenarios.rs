//! End-to-end lowering scenarios.
//!
//! Each test builds a small resolved tree through the synthesis builders,
//! runs a full lowering session and checks the emitted text.

use pretty_assertions::assert_eq;

use lucid_ir::{
    build, BaseSpecifier, BindingAccess, Capture, CaptureKind, CastKind, CtorInitRange, DeclId,
    DeclKind, ExprId, ExprKind, ExprRange, FnDecl, FnFlags, FnRole, Module, Name, Quals, Span,
    StmtKind, TypeId, TypeKind, UnaryOp,
};
use lucid_lower::{lower_module, Config, Mode};

fn lower(module: &mut Module, config: Config) -> lucid_lower::LoweredModule {
    match lower_module(module, config) {
        Ok(lowered) => lowered,
        Err(err) => panic!("config rejected: {err}"),
    }
}

fn name(m: &Module, text: &str) -> Name {
    m.interner.intern(text)
}

/// A bodiless free function usable as a call target.
fn stub_fn(m: &mut Module, fn_name: &str) -> DeclId {
    let fn_name = name(m, fn_name);
    build::function(&mut m.arena, fn_name, TypeId::VOID, &[], None)
}

fn call_stub(m: &mut Module, fn_name: &str) -> ExprId {
    let f = stub_fn(m, fn_name);
    let fn_ty = m.types.intern_function(TypeId::VOID, &[]);
    let callee = build::decl_ref(&mut m.arena, f, fn_ty);
    build::call(&mut m.arena, callee, &[], TypeId::VOID)
}

fn var(m: &mut Module, var_name: &str, ty: TypeId, init: Option<ExprId>) -> DeclId {
    let var_name = name(m, var_name);
    build::var(&mut m.arena, var_name, ty, init)
}

fn record(m: &mut Module, record_name: &str) -> DeclId {
    let record_name = name(m, record_name);
    build::record(&mut m.arena, record_name, &[])
}

fn method(
    m: &mut Module,
    parent: DeclId,
    fn_name: &str,
    role: FnRole,
    flags: FnFlags,
    body: Option<lucid_ir::StmtId>,
) -> DeclId {
    let fn_name = name(m, fn_name);
    let params = m.arena.alloc_decl_list(&[]);
    m.arena.alloc_decl(
        DeclKind::Function(FnDecl {
            name: fn_name,
            role,
            ret: TypeId::VOID,
            params,
            body,
            flags,
            parent: Some(parent),
            inits: CtorInitRange::EMPTY,
        }),
        Span::DUMMY,
    )
}

// --- Scenario A: inferred-type reveal ---

#[test]
fn auto_variable_reveals_int() {
    let mut m = Module::new();
    let auto_int = m.types.intern(
        TypeKind::Deduced {
            deduced: TypeId::INT,
        },
        Quals::empty(),
    );
    let five = build::int_lit(&mut m.arena, 5);
    let x = var(&mut m, "x", auto_int, Some(five));
    m.top_level.push(x);

    let lowered = lower(&mut m, Config::default());
    assert_eq!(lowered.chunks.len(), 1);
    assert_eq!(lowered.chunks[0].text, "int x = 5;\n");
}

// --- Scenario B: iterator-loop desugaring ---

#[test]
fn range_for_desugars_to_explicit_loop() {
    let mut m = Module::new();
    let int_arr = m.types.intern(
        TypeKind::Array {
            elem: TypeId::INT,
            len: 3,
        },
        Quals::empty(),
    );
    let arr_ref = m.types.lvalue_ref_to(int_arr);
    let int_ptr = m.types.pointer_to(TypeId::INT);
    let int_ref = m.types.lvalue_ref_to(TypeId::INT);
    let auto_int_ref = m.types.intern(TypeKind::Deduced { deduced: int_ref }, Quals::empty());

    let v = var(&mut m, "v", int_arr, None);

    // auto && __range1 = v;
    let v_ref = build::decl_ref(&mut m.arena, v, int_arr);
    let range_var = var(&mut m, "__range1", arr_ref, Some(v_ref));
    let range_stmt = build::decl_stmt(&mut m.arena, range_var);

    // auto __begin1 = __range1; (array-to-pointer decay)
    let range_ref = build::decl_ref(&mut m.arena, range_var, arr_ref);
    let decay = m.arena.alloc_expr(
        ExprKind::ImplicitCast {
            kind: CastKind::ArrayToPointerDecay,
            sub: range_ref,
        },
        int_ptr,
        Span::DUMMY,
    );
    let begin_var = var(&mut m, "__begin1", int_ptr, Some(decay));
    let begin_stmt = build::decl_stmt(&mut m.arena, begin_var);

    // auto __end1 = __range1 + 3;
    let range_ref2 = build::decl_ref(&mut m.arena, range_var, arr_ref);
    let decay2 = m.arena.alloc_expr(
        ExprKind::ImplicitCast {
            kind: CastKind::ArrayToPointerDecay,
            sub: range_ref2,
        },
        int_ptr,
        Span::DUMMY,
    );
    let three = build::int_lit(&mut m.arena, 3);
    let end_init = build::binary(
        &mut m.arena,
        lucid_ir::BinaryOp::Add,
        decay2,
        three,
        int_ptr,
    );
    let end_var = var(&mut m, "__end1", int_ptr, Some(end_init));
    let end_stmt = build::decl_stmt(&mut m.arena, end_var);

    // __begin1 != __end1
    let begin_ref = build::decl_ref(&mut m.arena, begin_var, int_ptr);
    let end_ref = build::decl_ref(&mut m.arena, end_var, int_ptr);
    let cond = build::binary(
        &mut m.arena,
        lucid_ir::BinaryOp::Ne,
        begin_ref,
        end_ref,
        TypeId::BOOL,
    );

    // ++__begin1
    let begin_ref2 = build::decl_ref(&mut m.arena, begin_var, int_ptr);
    let inc = build::unary(&mut m.arena, UnaryOp::PreInc, begin_ref2, int_ptr);

    // auto & e = *__begin1;
    let begin_ref3 = build::decl_ref(&mut m.arena, begin_var, int_ptr);
    let deref = build::deref(&mut m.arena, begin_ref3, TypeId::INT);
    let e = var(&mut m, "e", auto_int_ref, Some(deref));

    // { use(e); }
    let use_fn = stub_fn(&mut m, "use");
    let fn_ty = m.types.intern_function(TypeId::VOID, &[TypeId::INT]);
    let use_ref = build::decl_ref(&mut m.arena, use_fn, fn_ty);
    let e_ref = build::decl_ref(&mut m.arena, e, int_ref);
    let use_call = build::call(&mut m.arena, use_ref, &[e_ref], TypeId::VOID);
    let use_stmt = build::expr_stmt(&mut m.arena, use_call);
    let body = build::compound(&mut m.arena, &[use_stmt]);

    let range_for = m.arena.alloc_stmt(
        StmtKind::RangeFor {
            range_stmt,
            begin_stmt,
            end_stmt,
            cond,
            inc,
            loop_var: e,
            body,
        },
        Span::DUMMY,
    );
    let fn_body = build::compound(&mut m.arena, &[range_for]);
    let f_name = name(&m, "f");
    let f = build::function(&mut m.arena, f_name, TypeId::VOID, &[], Some(fn_body));
    m.top_level.push(f);

    let lowered = lower(&mut m, Config::default());
    let text = &lowered.chunks[0].text;

    assert!(text.contains("int (&__range1)[3] = v;"), "{text}");
    assert!(text.contains("int * __begin1 = __range1;"), "{text}");
    assert!(text.contains("int * __end1 = __range1 + 3;"), "{text}");
    assert!(text.contains("for(; __begin1 != __end1; ++__begin1)"), "{text}");
    assert!(text.contains("int & e = *__begin1;"), "{text}");
    assert!(text.contains("use(e);"), "{text}");
    // The element binding is declared before the body statement, inside the
    // loop block.
    let e_pos = text.find("int & e").unwrap_or(usize::MAX);
    let use_pos = text.find("use(e)").unwrap_or(0);
    assert!(e_pos < use_pos, "{text}");
}

// --- Scenario C: dispatch-table lowering ---

#[test]
fn virtual_call_goes_through_the_table() {
    let mut m = Module::new();

    // struct B { virtual void f(); };
    let b = record(&mut m, "B");
    let empty_body = build::compound(&mut m.arena, &[]);
    let b_f = method(&mut m, b, "f", FnRole::Method, FnFlags::VIRTUAL, Some(empty_body));
    build::set_record_members(&mut m.arena, b, &[b_f]);

    // struct D : B { D(); void f() override; };
    let d = record(&mut m, "D");
    let d_body = build::compound(&mut m.arena, &[]);
    let d_f = method(
        &mut m,
        d,
        "f",
        FnRole::Method,
        FnFlags::VIRTUAL | FnFlags::OVERRIDE,
        Some(d_body),
    );
    let ctor_body = build::compound(&mut m.arena, &[]);
    let d_ctor = method(&mut m, d, "D", FnRole::Constructor, FnFlags::empty(), Some(ctor_body));
    build::set_record_members(&mut m.arena, d, &[d_ctor, d_f]);
    let bases = m.arena.alloc_bases(&[BaseSpecifier {
        record: b,
        access: lucid_ir::Access::Public,
    }]);
    if let DeclKind::Record(mut rd) = m.arena.decl(d).kind {
        rd.bases = bases;
        m.arena.replace_decl(d, DeclKind::Record(rd));
    }

    // void g(B * p) { p->f(); }
    let b_ty = m.types.intern(TypeKind::Record(b), Quals::empty());
    let b_ptr = m.types.pointer_to(b_ty);
    let p_name = name(&m, "p");
    let p_param = build::param(&mut m.arena, p_name, b_ptr);
    let p_ref = build::decl_ref(&mut m.arena, p_param, b_ptr);
    let callee = build::member(&mut m.arena, p_ref, b_f, true, TypeId::VOID);
    let args = m.arena.alloc_expr_list(&[]);
    let call = m.arena.alloc_expr(
        ExprKind::MemberCall { callee, args },
        TypeId::VOID,
        Span::DUMMY,
    );
    let call_stmt = build::expr_stmt(&mut m.arena, call);
    let g_body = build::compound(&mut m.arena, &[call_stmt]);
    let g_name = name(&m, "g");
    let g_params = m.arena.alloc_decl_list(&[p_param]);
    let g = m.arena.alloc_decl(
        DeclKind::Function(FnDecl {
            name: g_name,
            role: FnRole::Free,
            ret: TypeId::VOID,
            params: g_params,
            body: Some(g_body),
            flags: FnFlags::empty(),
            parent: None,
            inits: CtorInitRange::EMPTY,
        }),
        Span::DUMMY,
    );

    m.top_level.push(b);
    m.top_level.push(d);
    m.top_level.push(g);

    let lowered = lower(&mut m, Config::new(Mode::Cfront));
    let b_text = &lowered.chunks[0].text;
    let d_text = &lowered.chunks[1].text;
    let g_text = &lowered.chunks[2].text;

    // The flattened structs carry the table pointer.
    assert!(b_text.contains("struct __mptr *__vptr;"), "{b_text}");
    assert!(d_text.contains("struct __mptr *__vptr;"), "{d_text}");

    // The derived override occupies the base entry's slot in D's tables.
    assert!(d_text.contains("static struct __mptr __vtbl_D_D[]"), "{d_text}");
    assert!(d_text.contains("static struct __mptr __vtbl_D_B[]"), "{d_text}");
    assert!(d_text.contains("(void (*)()) __D_f"), "{d_text}");

    // The constructor installs the table pointer before touching fields.
    assert!(d_text.contains("__this->__vptr = __vtbl_D_D;"), "{d_text}");

    // A polymorphic record without a user constructor gets a synthesized
    // one that installs its table pointer.
    assert!(b_text.contains("__B_Ctor"), "{b_text}");
    assert!(b_text.contains("__this->__vptr = __vtbl_B_B;"), "{b_text}");

    // The call resolves through the synthesized table, not by name.
    assert!(g_text.contains("->__vptr[0]"), "{g_text}");
    assert!(g_text.contains(".__fn)"), "{g_text}");
    assert!(g_text.contains(".__delta"), "{g_text}");
    assert!(!g_text.contains("__B_f(p)"), "{g_text}");

    // The entry type rides in on the feature flags.
    assert!(lowered.preamble.iter().any(|l| l.contains("struct __mptr")));
}

// --- Scenario D: coroutine state machine ---

#[test]
fn single_suspend_coroutine_yields_two_cases_one_label() {
    let mut m = Module::new();

    let promise_rec = record(&mut m, "promise_type");
    let promise_ty = m.types.intern(TypeKind::Record(promise_rec), Quals::empty());
    let promise = var(&mut m, "__promise", promise_ty, None);

    fn make_suspend(m: &mut Module) -> ExprId {
        let operand = call_stub(m, "awaitable");
        let ready = build::bool_lit(&mut m.arena, false);
        let suspend = call_stub(m, "await_suspend_stub");
        let resume = call_stub(m, "await_resume_stub");
        m.arena.alloc_expr(
            ExprKind::Suspend {
                kind: lucid_ir::SuspendKind::Await,
                operand,
                ready,
                suspend,
                resume,
            },
            TypeId::VOID,
            Span::DUMMY,
        )
    }

    let init_suspend = make_suspend(&mut m);
    let final_suspend = make_suspend(&mut m);
    let body_suspend = make_suspend(&mut m);
    let suspend_stmt = build::expr_stmt(&mut m.arena, body_suspend);
    let inner_body = build::compound(&mut m.arena, &[suspend_stmt]);

    let promise_ptr = m.types.pointer_to(promise_ty);
    let allocate = m.arena.alloc_expr(
        ExprKind::New {
            args: ExprRange::EMPTY,
            placement: None,
        },
        promise_ptr,
        Span::DUMMY,
    );
    let deallocate = call_stub(&mut m, "free_frame");
    let return_stmt = build::return_stmt(&mut m.arena, None);
    let param_moves = m.arena.alloc_decl_list(&[]);

    let coro_body = m.arena.alloc_stmt(
        StmtKind::CoroutineBody {
            body: inner_body,
            promise,
            init_suspend,
            final_suspend,
            return_stmt: Some(return_stmt),
            allocate,
            deallocate,
            param_moves,
            exception_handler: None,
            return_on_alloc_failure: None,
        },
        Span::DUMMY,
    );

    let gen_name = name(&m, "gen");
    let gen_params = m.arena.alloc_decl_list(&[]);
    let gen = m.arena.alloc_decl(
        DeclKind::Function(FnDecl {
            name: gen_name,
            role: FnRole::Free,
            ret: TypeId::VOID,
            params: gen_params,
            body: Some(coro_body),
            flags: FnFlags::COROUTINE,
            parent: None,
            inits: CtorInitRange::EMPTY,
        }),
        Span::DUMMY,
    );
    m.top_level.push(gen);

    let lowered = lower(&mut m, Config::new(Mode::Coroutine));
    let text = &lowered.chunks[0].text;

    // Cases {0, 1} and exactly one numbered resume label.
    assert!(text.contains("case 0: break;"), "{text}");
    assert!(text.contains("case 1: goto __resume_gen_1;"), "{text}");
    assert!(!text.contains("case 2:"), "{text}");
    assert_eq!(text.matches("__resume_gen_1:;").count(), 1, "{text}");

    // The frame record precedes the ramp and carries the two function
    // pointers plus the bookkeeping fields.
    assert!(text.contains("struct __genFrame"), "{text}");
    assert!(text.contains("void (*__resume_fn)(__genFrame *);"), "{text}");
    assert!(text.contains("void (*__destroy_fn)(__genFrame *);"), "{text}");
    assert!(text.contains("int __suspend_index;"), "{text}");
    assert!(text.contains("bool __initial_await_resume_called;"), "{text}");
    let frame_pos = text.find("struct __genFrame").unwrap_or(usize::MAX);
    let resume_pos = text.find("void __genResume").unwrap_or(0);
    assert!(frame_pos < resume_pos, "{text}");

    // Ramp wiring.
    assert!(text.contains("__f->__suspend_index = 0;"), "{text}");
    assert!(text.contains("__f->__resume_fn = &__genResume;"), "{text}");
    assert!(text.contains("__f->__destroy_fn = &__genDestroy;"), "{text}");

    // The body suspend assigns its index; the final suspend destroys.
    assert!(text.contains("__f->__suspend_index = 1;"), "{text}");
    assert!(text.contains("__f->__destroy_fn(__f);"), "{text}");

    // Allocation support was flagged.
    assert!(lowered
        .preamble
        .iter()
        .any(|line| line.contains("stdlib.h")));
}

// --- closures ---

fn closure_module() -> Module {
    let mut m = Module::new();
    let x = var(&mut m, "x", TypeId::INT, None);

    let class = record(&mut m, "");
    let x_ref = build::decl_ref(&mut m.arena, x, TypeId::INT);
    let ret = build::return_stmt(&mut m.arena, Some(x_ref));
    let op_body = build::compound(&mut m.arena, &[ret]);
    let op_name = name(&m, "operator()");
    let op_params = m.arena.alloc_decl_list(&[]);
    let op = m.arena.alloc_decl(
        DeclKind::Function(FnDecl {
            name: op_name,
            role: FnRole::Method,
            ret: TypeId::INT,
            params: op_params,
            body: Some(op_body),
            flags: FnFlags::INLINE | FnFlags::CONST,
            parent: Some(class),
            inits: CtorInitRange::EMPTY,
        }),
        Span::DUMMY,
    );
    build::set_record_members(&mut m.arena, class, &[op]);

    let x_init = build::decl_ref(&mut m.arena, x, TypeId::INT);
    let captures = m.arena.alloc_captures(&[Capture {
        kind: CaptureKind::ByValue,
        var: Some(x),
        init: x_init,
    }]);
    let closure_ty = m.types.intern(TypeKind::Closure(class), Quals::empty());
    let lambda = m.arena.alloc_expr(
        ExprKind::Lambda { class, captures },
        closure_ty,
        Span::DUMMY,
    );

    let auto_closure = m
        .types
        .intern(TypeKind::Deduced { deduced: closure_ty }, Quals::empty());
    let l = var(&mut m, "l", auto_closure, Some(lambda));
    let l_stmt = build::decl_stmt(&mut m.arena, l);
    let body = build::compound(&mut m.arena, &[l_stmt]);
    let host_name = name(&m, "host");
    let host = build::function(&mut m.arena, host_name, TypeId::VOID, &[], Some(body));
    m.top_level.push(host);
    m
}

#[test]
fn closure_lowers_to_class_before_use_site() {
    let mut m = closure_module();
    let lowered = lower(&mut m, Config::default());
    let text = &lowered.chunks[0].text;

    assert!(text.contains("class __lambda_0"), "{text}");
    assert!(text.contains("inline int operator()() const"), "{text}");
    assert!(text.contains("int x;"), "{text}");
    assert!(text.contains("__lambda_0(int _x)"), "{text}");
    assert!(text.contains(": x{_x}"), "{text}");
    assert!(text.contains("__lambda_0 l = __lambda_0{x};"), "{text}");

    // The class definition is physically placed before the declaration
    // that uses it.
    let class_pos = text.find("class __lambda_0").unwrap_or(usize::MAX);
    let use_pos = text.find("__lambda_0 l =").unwrap_or(0);
    assert!(class_pos < use_pos, "{text}");
}

#[test]
fn closure_lowering_is_idempotent_across_sessions() {
    let mut m1 = closure_module();
    let mut m2 = closure_module();
    let first = lower(&mut m1, Config::default());
    let second = lower(&mut m2, Config::default());
    assert_eq!(first.chunks[0].text, second.chunks[0].text);
}

// --- decomposition ---

#[test]
fn decomposition_emits_exactly_one_binding_per_name() {
    let mut m = Module::new();
    let point = record(&mut m, "Point");
    let x_name = name(&m, "x");
    let y_name = name(&m, "y");
    let fx = build::field(&mut m.arena, x_name, TypeId::INT);
    let fy = build::field(&mut m.arena, y_name, TypeId::INT);
    build::set_record_members(&mut m.arena, point, &[fx, fy]);
    let point_ty = m.types.intern(TypeKind::Record(point), Quals::empty());

    let p = var(&mut m, "p", point_ty, None);

    let a_name = name(&m, "a");
    let b_name = name(&m, "b");
    let a = m.arena.alloc_decl(
        DeclKind::Binding {
            name: a_name,
            ty: TypeId::INT,
            access: BindingAccess::Field { name: x_name },
        },
        Span::DUMMY,
    );
    let b = m.arena.alloc_decl(
        DeclKind::Binding {
            name: b_name,
            ty: TypeId::INT,
            access: BindingAccess::Field { name: y_name },
        },
        Span::DUMMY,
    );
    let bindings = m.arena.alloc_decl_list(&[a, b]);
    let init = build::decl_ref(&mut m.arena, p, point_ty);
    let decomp = m.arena.alloc_decl(
        DeclKind::Decomposition {
            ty: point_ty,
            init,
            bindings,
        },
        Span::DUMMY,
    );
    m.top_level.push(decomp);

    let lowered = lower(&mut m, Config::default());
    let text = &lowered.chunks[0].text;

    assert!(text.contains("Point __p1_1 = p;"), "{text}");
    assert!(text.contains("int& a = __p1_1.x;"), "{text}");
    assert!(text.contains("int& b = __p1_1.y;"), "{text}");
    assert_eq!(text.matches(" = __p1_1.").count(), 2, "{text}");
}

// --- lifetime overlay ---

#[test]
fn lifetime_overlay_inserts_destructor_calls_on_return() {
    let mut m = Module::new();
    let widget = record(&mut m, "Widget");
    let dtor_body = build::compound(&mut m.arena, &[]);
    let dtor = method(
        &mut m,
        widget,
        "~Widget",
        FnRole::Destructor,
        FnFlags::empty(),
        Some(dtor_body),
    );
    build::set_record_members(&mut m.arena, widget, &[dtor]);
    let widget_ty = m.types.intern(TypeKind::Record(widget), Quals::empty());

    let w = var(&mut m, "w", widget_ty, None);
    let w_stmt = build::decl_stmt(&mut m.arena, w);
    let i = var(&mut m, "i", TypeId::INT, None);
    let i_stmt = build::decl_stmt(&mut m.arena, i);
    let ret = build::return_stmt(&mut m.arena, None);
    let body = build::compound(&mut m.arena, &[w_stmt, i_stmt, ret]);
    let f_name = name(&m, "f");
    let f = build::function(&mut m.arena, f_name, TypeId::VOID, &[], Some(body));
    m.top_level.push(f);

    let lowered = lower(&mut m, Config::default().with_lifetime());
    let text = &lowered.chunks[0].text;

    // Reverse declaration order: the trivially destructible local gets a
    // comment, the class object a destructor call, both before the return.
    assert!(text.contains("/* i // lifetime ends here */"), "{text}");
    assert!(text.contains("w.~Widget();"), "{text}");
    let dtor_pos = text.find("w.~Widget()").unwrap_or(usize::MAX);
    let ret_pos = text.find("return;").unwrap_or(0);
    assert!(dtor_pos < ret_pos, "{text}");
}

// --- soft-fail policy ---

#[test]
fn unsupported_construct_becomes_placeholder_comment() {
    let mut m = Module::new();
    let asm_text = name(&m, "nop");
    let asm = m.arena.alloc_stmt(StmtKind::Asm { text: asm_text }, Span::DUMMY);
    let body = build::compound(&mut m.arena, &[asm]);
    let f_name = name(&m, "f");
    let f = build::function(&mut m.arena, f_name, TypeId::VOID, &[], Some(body));
    m.top_level.push(f);

    let lowered = lower(&mut m, Config::default());
    let text = &lowered.chunks[0].text;
    assert!(text.contains("UNSUPPORTED"), "{text}");
    assert!(text.contains("AsmStmt"), "{text}");
}

// --- special-member reveal ---

#[test]
fn implicit_members_print_as_commented_signatures() {
    let mut m = Module::new();
    let foo = record(&mut m, "Foo");
    let ctor = method(
        &mut m,
        foo,
        "Foo",
        FnRole::Constructor,
        FnFlags::IMPLICIT | FnFlags::NOEXCEPT,
        None,
    );
    build::set_record_members(&mut m.arena, foo, &[ctor]);
    m.top_level.push(foo);

    let lowered = lower(&mut m, Config::default());
    let text = &lowered.chunks[0].text;
    assert!(text.contains("// inline Foo() noexcept = default;"), "{text}");
}

// --- feature flags ---

#[test]
fn cfront_nullptr_pulls_in_stddef() {
    let mut m = Module::new();
    let np = build::nullptr_lit(&mut m.arena);
    let void_ptr = m.types.pointer_to(TypeId::VOID);
    let v = var(&mut m, "p", void_ptr, Some(np));
    m.top_level.push(v);

    let lowered = lower(&mut m, Config::new(Mode::Cfront));
    assert!(lowered.chunks[0].text.contains("NULL"));
    assert_eq!(lowered.preamble, vec!["#include <stddef.h>".to_owned()]);
}

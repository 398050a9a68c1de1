//! Tree node kinds.
//!
//! Declarations, statements and expressions are closed sums with `Copy`
//! payloads; child lists are ranges into the arena's side tables. The front
//! end resolves everything before hand-over: references point at
//! declarations, expressions carry their resolved type, deduced placeholders
//! carry what they deduced to.

use bitflags::bitflags;

use crate::{
    BaseRange, CaptureRange, CtorInitRange, DeclId, DeclRange, ExprId, ExprRange, Name, Span,
    StmtId, StmtRange, TypeId,
};

/// Storage class of a variable or function.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum StorageClass {
    #[default]
    None,
    Static,
    Extern,
}

/// Tag keyword of a record.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RecordTag {
    Struct,
    Class,
}

/// Member/base access.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    pub const fn spelling(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

bitflags! {
    /// Function modifiers and provenance.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FnFlags: u16 {
        const VIRTUAL = 1 << 0;
        const OVERRIDE = 1 << 1;
        const STATIC = 1 << 2;
        const CONST = 1 << 3;
        const CONSTEXPR = 1 << 4;
        const INLINE = 1 << 5;
        const NOEXCEPT = 1 << 6;
        /// `= default`, written by the user.
        const DEFAULTED = 1 << 7;
        const DELETED = 1 << 8;
        /// Declared by the compiler, not the user.
        const IMPLICIT = 1 << 9;
        /// An implicitly declared member that was actually used (and is
        /// therefore defined).
        const USED = 1 << 10;
        /// Body is a coroutine.
        const COROUTINE = 1 << 11;
        /// The program entry point.
        const MAIN = 1 << 12;
    }
}

/// What kind of function a declaration is.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FnRole {
    Free,
    Method,
    Constructor,
    Destructor,
}

/// How a decomposition binding reaches its value in the backing object.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BindingAccess {
    /// Plain member access on the backing variable.
    Field { name: Name },
    /// `get<index>(backing)` accessor call.
    TupleGet { index: u32, returns_ref: bool },
    /// Array element access.
    ArrayIndex { index: u32 },
}

/// Declaration node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
}

/// Variable declaration payload.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct VarDecl {
    pub name: Name,
    /// The written type; a deduced placeholder if the source said `auto`.
    pub ty: TypeId,
    pub init: Option<ExprId>,
    pub storage: StorageClass,
    pub is_constexpr: bool,
}

/// Function declaration payload.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FnDecl {
    pub name: Name,
    pub role: FnRole,
    pub ret: TypeId,
    /// `Param` declarations.
    pub params: DeclRange,
    pub body: Option<StmtId>,
    pub flags: FnFlags,
    /// Enclosing record for methods.
    pub parent: Option<DeclId>,
    /// Member initializers; empty unless this is a constructor.
    pub inits: CtorInitRange,
}

/// Record declaration payload.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RecordDecl {
    pub name: Name,
    pub tag: RecordTag,
    pub bases: BaseRange,
    pub members: DeclRange,
    pub has_definition: bool,
}

/// Declaration variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    Var(VarDecl),

    /// Decomposition declaration: one hidden backing object plus N named
    /// bindings.
    Decomposition {
        /// Type of the backing object (a reference if the source bound one).
        ty: TypeId,
        init: ExprId,
        /// `Binding` declarations, in source order.
        bindings: DeclRange,
    },

    /// One named binding of a decomposition.
    Binding {
        name: Name,
        ty: TypeId,
        access: BindingAccess,
    },

    /// Function parameter.
    Param { name: Name, ty: TypeId },

    /// Record field.
    Field {
        name: Name,
        ty: TypeId,
        init: Option<ExprId>,
    },

    Function(FnDecl),

    Record(RecordDecl),

    Namespace { name: Name, decls: DeclRange },

    TypeAlias { name: Name, ty: TypeId },

    StaticAssert {
        cond: ExprId,
        /// `Name::EMPTY` when no message was written.
        message: Name,
    },
}

impl DeclKind {
    /// Diagnostic name of the kind.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            DeclKind::Var(_) => "VarDecl",
            DeclKind::Decomposition { .. } => "DecompositionDecl",
            DeclKind::Binding { .. } => "BindingDecl",
            DeclKind::Param { .. } => "ParamDecl",
            DeclKind::Field { .. } => "FieldDecl",
            DeclKind::Function(_) => "FunctionDecl",
            DeclKind::Record(_) => "RecordDecl",
            DeclKind::Namespace { .. } => "NamespaceDecl",
            DeclKind::TypeAlias { .. } => "TypeAliasDecl",
            DeclKind::StaticAssert { .. } => "StaticAssertDecl",
        }
    }
}

/// Statement node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    Compound { stmts: StmtRange },

    Expr { expr: ExprId },

    /// Declaration statement; one or more declarations.
    Decl { decls: DeclRange },

    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },

    While { cond: ExprId, body: StmtId },

    DoWhile { body: StmtId, cond: ExprId },

    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        inc: Option<ExprId>,
        body: StmtId,
    },

    /// Range-based loop, already decomposed by the front end into the
    /// hidden range/begin/end declarations, condition, increment and
    /// per-iteration loop variable.
    RangeFor {
        range_stmt: StmtId,
        begin_stmt: StmtId,
        end_stmt: StmtId,
        cond: ExprId,
        inc: ExprId,
        loop_var: DeclId,
        body: StmtId,
    },

    Return { value: Option<ExprId> },

    Break,
    Continue,

    Switch { cond: ExprId, body: StmtId },

    Case { value: ExprId, body: StmtId },

    Default { body: StmtId },

    Goto { label: Name },

    Label { name: Name, sub: Option<StmtId> },

    /// Empty statement (`;`).
    Null,

    /// Synthetic explanatory comment.
    Comment { text: Name },

    Try { body: StmtId, handler: StmtId },

    Catch {
        /// `None` for `catch(...)`.
        param: Option<DeclId>,
        body: StmtId,
    },

    /// A coroutine function body with its compiler-resolved scaffolding.
    CoroutineBody {
        body: StmtId,
        promise: DeclId,
        init_suspend: ExprId,
        final_suspend: ExprId,
        return_stmt: Option<StmtId>,
        allocate: ExprId,
        deallocate: ExprId,
        /// Parameters copied into the frame.
        param_moves: DeclRange,
        exception_handler: Option<StmtId>,
        return_on_alloc_failure: Option<StmtId>,
    },

    CoReturn {
        value: Option<ExprId>,
        promise_call: Option<ExprId>,
    },

    /// Inline assembly; carried through as an opaque blob.
    Asm { text: Name },
}

impl StmtKind {
    /// Diagnostic name of the kind.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            StmtKind::Compound { .. } => "CompoundStmt",
            StmtKind::Expr { .. } => "ExprStmt",
            StmtKind::Decl { .. } => "DeclStmt",
            StmtKind::If { .. } => "IfStmt",
            StmtKind::While { .. } => "WhileStmt",
            StmtKind::DoWhile { .. } => "DoStmt",
            StmtKind::For { .. } => "ForStmt",
            StmtKind::RangeFor { .. } => "RangeForStmt",
            StmtKind::Return { .. } => "ReturnStmt",
            StmtKind::Break => "BreakStmt",
            StmtKind::Continue => "ContinueStmt",
            StmtKind::Switch { .. } => "SwitchStmt",
            StmtKind::Case { .. } => "CaseStmt",
            StmtKind::Default { .. } => "DefaultStmt",
            StmtKind::Goto { .. } => "GotoStmt",
            StmtKind::Label { .. } => "LabelStmt",
            StmtKind::Null => "NullStmt",
            StmtKind::Comment { .. } => "CommentStmt",
            StmtKind::Try { .. } => "TryStmt",
            StmtKind::Catch { .. } => "CatchStmt",
            StmtKind::CoroutineBody { .. } => "CoroutineBodyStmt",
            StmtKind::CoReturn { .. } => "CoReturnStmt",
            StmtKind::Asm { .. } => "AsmStmt",
        }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Minus,
    Not,
    BitNot,
    Deref,
    AddrOf,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub const fn spelling(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Deref => "*",
            UnaryOp::AddrOf => "&",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    pub const fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }
}

/// Binary operators, assignment included.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    LogicalAnd,
    LogicalOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,
    Comma,
}

impl BinaryOp {
    pub const fn spelling(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Assign => "=",
            BinaryOp::Comma => ",",
        }
    }
}

/// Implicit conversion kinds the front end records.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CastKind {
    LValueToRValue,
    IntegralCast,
    FloatingCast,
    IntegralToFloating,
    FloatingToIntegral,
    IntegralToBoolean,
    ArrayToPointerDecay,
    DerivedToBase,
    NullToPointer,
    /// A user-written conversion operator.
    UserConversion,
    NoOp,
}

/// Explicit cast notations.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CastStyle {
    Static,
    Const,
    Reinterpret,
    CStyle,
    Functional,
}

/// How a closure captures one variable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CaptureKind {
    ByValue,
    ByRef,
    This,
    StarThis,
}

/// One closure capture; `var` is `None` for `this` captures.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Capture {
    pub kind: CaptureKind,
    pub var: Option<DeclId>,
    /// The captured expression (what initializes the closure field).
    pub init: ExprId,
}

/// One base-class specifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BaseSpecifier {
    pub record: DeclId,
    pub access: Access,
}

/// Target of one constructor member initializer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CtorTarget {
    Field(DeclId),
    Base(DeclId),
}

/// One constructor member initializer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CtorInit {
    pub target: CtorTarget,
    pub init: ExprId,
}

/// Fold direction of a pack operation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FoldDirection {
    Left,
    Right,
}

/// Suspend flavour.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SuspendKind {
    Await,
    Yield,
}

impl SuspendKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            SuspendKind::Await => "co_await",
            SuspendKind::Yield => "co_yield",
        }
    }
}

/// Expression node.
///
/// Every expression carries its resolved type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TypeId,
    pub span: Span,
}

/// Expression variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    IntLit(i64),
    /// Stored as bits for Hash.
    FloatLit(u64),
    BoolLit(bool),
    CharLit(char),
    StringLit(Name),
    NullptrLit,

    /// Resolved reference to a declaration.
    DeclRef(DeclId),

    This,

    Member {
        base: ExprId,
        member: DeclId,
        arrow: bool,
    },

    Call { callee: ExprId, args: ExprRange },

    /// Method call; `callee` is a `Member` expression.
    MemberCall { callee: ExprId, args: ExprRange },

    Unary { op: UnaryOp, operand: ExprId },

    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },

    Conditional {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },

    Paren { sub: ExprId },

    Index { base: ExprId, index: ExprId },

    /// An implicit conversion inserted by the front end; the destination
    /// type is this expression's type.
    ImplicitCast { kind: CastKind, sub: ExprId },

    /// A cast the user wrote; the destination type is this expression's
    /// type.
    ExplicitCast { style: CastStyle, sub: ExprId },

    /// Construction of a class-type object.
    Construct {
        /// `None` for trivial value initialization.
        ctor: Option<DeclId>,
        args: ExprRange,
    },

    New {
        args: ExprRange,
        placement: Option<ExprId>,
    },

    Delete { operand: ExprId, is_array: bool },

    /// A closure expression; `class` is the synthesizable closure class the
    /// front end described.
    Lambda {
        class: DeclId,
        captures: CaptureRange,
    },

    Fold {
        op: BinaryOp,
        pack: ExprId,
        init: Option<ExprId>,
        direction: FoldDirection,
    },

    /// A suspend point (`co_await`/`co_yield`) with its resolved
    /// ready/suspend/resume sub-expressions.
    Suspend {
        kind: SuspendKind,
        operand: ExprId,
        ready: ExprId,
        suspend: ExprId,
        resume: ExprId,
    },

    InitList { elems: ExprRange },

    SizeOf { ty: TypeId },
}

impl ExprKind {
    /// Diagnostic name of the kind.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            ExprKind::IntLit(_) => "IntegerLiteral",
            ExprKind::FloatLit(_) => "FloatingLiteral",
            ExprKind::BoolLit(_) => "BoolLiteral",
            ExprKind::CharLit(_) => "CharacterLiteral",
            ExprKind::StringLit(_) => "StringLiteral",
            ExprKind::NullptrLit => "NullptrLiteral",
            ExprKind::DeclRef(_) => "DeclRefExpr",
            ExprKind::This => "ThisExpr",
            ExprKind::Member { .. } => "MemberExpr",
            ExprKind::Call { .. } => "CallExpr",
            ExprKind::MemberCall { .. } => "MemberCallExpr",
            ExprKind::Unary { .. } => "UnaryOperator",
            ExprKind::Binary { .. } => "BinaryOperator",
            ExprKind::Conditional { .. } => "ConditionalOperator",
            ExprKind::Paren { .. } => "ParenExpr",
            ExprKind::Index { .. } => "SubscriptExpr",
            ExprKind::ImplicitCast { .. } => "ImplicitCastExpr",
            ExprKind::ExplicitCast { .. } => "ExplicitCastExpr",
            ExprKind::Construct { .. } => "ConstructExpr",
            ExprKind::New { .. } => "NewExpr",
            ExprKind::Delete { .. } => "DeleteExpr",
            ExprKind::Lambda { .. } => "LambdaExpr",
            ExprKind::Fold { .. } => "FoldExpr",
            ExprKind::Suspend { .. } => "SuspendExpr",
            ExprKind::InitList { .. } => "InitListExpr",
            ExprKind::SizeOf { .. } => "SizeOfExpr",
        }
    }
}

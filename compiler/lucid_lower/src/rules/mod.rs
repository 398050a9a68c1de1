//! General lowering rules.
//!
//! Every rule has the same shape: recognize a pattern on the input node,
//! synthesize replacement text (and fragments where needed), and never touch
//! unrelated output. Rules fail soft: a missing sub-node skips the affected
//! sub-lowering or leaves a comment, never the whole run.

pub mod decl;
pub mod expr;
pub mod lambda;
pub mod stmt;

use lucid_ir::{DeclId, DeclKind};

use crate::printer::Printer;

/// Source name of a declaration, empty for unnamed ones.
pub(crate) fn decl_name(p: &Printer<'_, '_>, id: DeclId) -> &'static str {
    let name = match p.arena().decl(id).kind {
        DeclKind::Var(vd) => vd.name,
        DeclKind::Binding { name, .. }
        | DeclKind::Param { name, .. }
        | DeclKind::Field { name, .. }
        | DeclKind::Namespace { name, .. }
        | DeclKind::TypeAlias { name, .. } => name,
        DeclKind::Function(fd) => fd.name,
        DeclKind::Record(rd) => rd.name,
        DeclKind::Decomposition { .. } | DeclKind::StaticAssert { .. } => {
            return "";
        }
    };
    p.name(name)
}

//! Interned type table.
//!
//! Types are immutable values deduplicated by an interner; `TypeId` equality
//! is type equality. The front end resolves everything before hand-over, so
//! a deduced placeholder always carries the type it deduced to.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::{DeclId, TypeId, TypeRange};

bitflags! {
    /// cv-qualifiers attached to an interned type.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Quals: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
    }
}

/// Builtin scalar types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BuiltinKind {
    Void,
    Bool,
    Char,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    Float,
    Double,
    NullptrT,
}

impl BuiltinKind {
    /// Source spelling of the builtin.
    pub const fn spelling(self) -> &'static str {
        match self {
            BuiltinKind::Void => "void",
            BuiltinKind::Bool => "bool",
            BuiltinKind::Char => "char",
            BuiltinKind::Int => "int",
            BuiltinKind::UInt => "unsigned int",
            BuiltinKind::Long => "long",
            BuiltinKind::ULong => "unsigned long",
            BuiltinKind::LongLong => "long long",
            BuiltinKind::Float => "float",
            BuiltinKind::Double => "double",
            BuiltinKind::NullptrT => "std::nullptr_t",
        }
    }
}

/// Type variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Builtin(BuiltinKind),

    /// `T *`
    Pointer(TypeId),

    /// `T &`
    LValueRef(TypeId),

    /// `T &&`
    RValueRef(TypeId),

    /// `T [len]`
    Array { elem: TypeId, len: u32 },

    /// Function type; parameters live in the interner's param table.
    Function { ret: TypeId, params: TypeRange },

    /// A named record declared in the tree.
    Record(DeclId),

    /// The anonymous class of a closure expression. Printed under a
    /// deterministic made-up name derived from the closure's location.
    Closure(DeclId),

    /// A deduced placeholder (`auto` in the source). The front end has
    /// already resolved it; `deduced` is what it resolved to.
    Deduced { deduced: TypeId },
}

/// An interned type: a kind plus cv-qualifiers.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Type {
    pub kind: TypeKind,
    pub quals: Quals,
}

/// Type interner with pre-interned builtins.
pub struct TypeInterner {
    types: Vec<Type>,
    dedup: FxHashMap<Type, TypeId>,
    /// Parameter lists for function types.
    params: Vec<TypeId>,
}

impl TypeId {
    pub const VOID: TypeId = TypeId::new(0);
    pub const BOOL: TypeId = TypeId::new(1);
    pub const CHAR: TypeId = TypeId::new(2);
    pub const INT: TypeId = TypeId::new(3);
    pub const UINT: TypeId = TypeId::new(4);
    pub const LONG: TypeId = TypeId::new(5);
    pub const ULONG: TypeId = TypeId::new(6);
    pub const LONG_LONG: TypeId = TypeId::new(7);
    pub const FLOAT: TypeId = TypeId::new(8);
    pub const DOUBLE: TypeId = TypeId::new(9);
    pub const NULLPTR_T: TypeId = TypeId::new(10);
}

const PREINTERNED: [BuiltinKind; 11] = [
    BuiltinKind::Void,
    BuiltinKind::Bool,
    BuiltinKind::Char,
    BuiltinKind::Int,
    BuiltinKind::UInt,
    BuiltinKind::Long,
    BuiltinKind::ULong,
    BuiltinKind::LongLong,
    BuiltinKind::Float,
    BuiltinKind::Double,
    BuiltinKind::NullptrT,
];

impl TypeInterner {
    pub fn new() -> Self {
        let mut interner = TypeInterner {
            types: Vec::with_capacity(64),
            dedup: FxHashMap::default(),
            params: Vec::new(),
        };
        for kind in PREINTERNED {
            interner.intern(TypeKind::Builtin(kind), Quals::empty());
        }
        interner
    }

    /// Intern a type, returning its id.
    pub fn intern(&mut self, kind: TypeKind, quals: Quals) -> TypeId {
        let ty = Type { kind, quals };
        if let Some(&id) = self.dedup.get(&ty) {
            return id;
        }
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(ty);
        self.dedup.insert(ty, id);
        id
    }

    /// Intern a function type with the given parameter list.
    pub fn intern_function(&mut self, ret: TypeId, param_types: &[TypeId]) -> TypeId {
        let start = self.params.len() as u32;
        self.params.extend_from_slice(param_types);
        let end = self.params.len() as u32;
        self.intern(
            TypeKind::Function {
                ret,
                params: TypeRange::new(start, end),
            },
            Quals::empty(),
        )
    }

    /// Shorthand: `T *`.
    pub fn pointer_to(&mut self, pointee: TypeId) -> TypeId {
        self.intern(TypeKind::Pointer(pointee), Quals::empty())
    }

    /// Shorthand: `T &`.
    pub fn lvalue_ref_to(&mut self, referee: TypeId) -> TypeId {
        self.intern(TypeKind::LValueRef(referee), Quals::empty())
    }

    /// Shorthand: `const T`.
    pub fn with_const(&mut self, id: TypeId) -> TypeId {
        let ty = self.get(id);
        self.intern(ty.kind, ty.quals | Quals::CONST)
    }

    /// Look up an interned type.
    #[inline]
    pub fn get(&self, id: TypeId) -> Type {
        self.types
            .get(id.index())
            .copied()
            .unwrap_or(Type {
                kind: TypeKind::Builtin(BuiltinKind::Void),
                quals: Quals::empty(),
            })
    }

    /// Parameter types of a function type range.
    #[inline]
    pub fn param_types(&self, range: TypeRange) -> &[TypeId] {
        &self.params[range.start as usize..range.end as usize]
    }

    /// Is this a (lvalue or rvalue) reference type?
    pub fn is_reference(&self, id: TypeId) -> bool {
        matches!(
            self.get(id).kind,
            TypeKind::LValueRef(_) | TypeKind::RValueRef(_)
        )
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.get(id).kind, TypeKind::Pointer(_))
    }

    pub fn is_rvalue_ref(&self, id: TypeId) -> bool {
        matches!(self.get(id).kind, TypeKind::RValueRef(_))
    }

    pub fn is_void(&self, id: TypeId) -> bool {
        matches!(self.get(id).kind, TypeKind::Builtin(BuiltinKind::Void))
    }

    /// Strip one level of reference, if any.
    pub fn non_reference(&self, id: TypeId) -> TypeId {
        match self.get(id).kind {
            TypeKind::LValueRef(inner) | TypeKind::RValueRef(inner) => inner,
            _ => id,
        }
    }

    /// Resolve a deduced placeholder; other types pass through.
    pub fn resolve_deduced(&self, id: TypeId) -> TypeId {
        match self.get(id).kind {
            TypeKind::Deduced { deduced } => deduced,
            _ => id,
        }
    }

    /// The record declaration behind a (possibly qualified, referenced or
    /// pointed-to) record or closure type.
    pub fn as_record_decl(&self, id: TypeId) -> Option<DeclId> {
        match self.get(id).kind {
            TypeKind::Record(decl) | TypeKind::Closure(decl) => Some(decl),
            TypeKind::Pointer(inner)
            | TypeKind::LValueRef(inner)
            | TypeKind::RValueRef(inner) => self.as_record_decl(inner),
            TypeKind::Array { elem, .. } => self.as_record_decl(elem),
            TypeKind::Deduced { deduced } => self.as_record_decl(deduced),
            _ => None,
        }
    }

    /// Array element type and length, if `id` is an array.
    pub fn as_array(&self, id: TypeId) -> Option<(TypeId, u32)> {
        match self.get(id).kind {
            TypeKind::Array { elem, len } => Some((elem, len)),
            _ => None,
        }
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtins_are_preinterned() {
        let types = TypeInterner::new();
        assert_eq!(
            types.get(TypeId::INT).kind,
            TypeKind::Builtin(BuiltinKind::Int)
        );
        assert_eq!(
            types.get(TypeId::VOID).kind,
            TypeKind::Builtin(BuiltinKind::Void)
        );
    }

    #[test]
    fn interning_deduplicates() {
        let mut types = TypeInterner::new();
        let a = types.pointer_to(TypeId::INT);
        let b = types.pointer_to(TypeId::INT);
        assert_eq!(a, b);
    }

    #[test]
    fn quals_distinguish_types() {
        let mut types = TypeInterner::new();
        let plain = types.pointer_to(TypeId::INT);
        let constant = types.with_const(plain);
        assert_ne!(plain, constant);
        assert!(types.get(constant).quals.contains(Quals::CONST));
    }

    #[test]
    fn non_reference_strips_one_level() {
        let mut types = TypeInterner::new();
        let r = types.lvalue_ref_to(TypeId::INT);
        assert_eq!(types.non_reference(r), TypeId::INT);
        assert_eq!(types.non_reference(TypeId::INT), TypeId::INT);
    }

    #[test]
    fn deduced_resolves() {
        let mut types = TypeInterner::new();
        let auto = types.intern(
            TypeKind::Deduced {
                deduced: TypeId::INT,
            },
            Quals::empty(),
        );
        assert_eq!(types.resolve_deduced(auto), TypeId::INT);
    }
}

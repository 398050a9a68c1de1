//! Declared layout algorithm for the virtual-dispatch backend.
//!
//! Offsets are computed from a simple, documented model rather than a real
//! ABI: pointers and the dispatch-table pointer are 8 bytes, base subobjects
//! are laid out in declaration order before own fields, and each field is
//! aligned to `min(size, 8)`. The numbers exist so casts and table deltas
//! are concrete and self-consistent; they are illustrative, not binding.

use lucid_ir::{BuiltinKind, DeclId, DeclKind, FnFlags, FnRole, TypeId, TypeKind};

use crate::printer::Printer;

/// Size of a pointer (and of the dispatch-table pointer field).
pub const PTR_SIZE: u64 = 8;

/// One record's computed layout.
#[derive(Debug, Default, Clone)]
pub struct RecordLayout {
    pub size: u64,
    /// `(base record, byte offset)` in declaration order.
    pub base_offsets: Vec<(DeclId, u64)>,
    /// The record carries a dispatch-table pointer of its own (not
    /// inherited from its primary base).
    pub own_vptr: bool,
}

/// Whether a record declares or inherits a virtual function.
pub fn is_polymorphic(p: &Printer<'_, '_>, record: DeclId) -> bool {
    let DeclKind::Record(rd) = p.arena().decl(record).kind else {
        return false;
    };
    let members: Vec<DeclId> = p.arena().decl_list(rd.members).to_vec();
    for member in members {
        if let DeclKind::Function(fd) = p.arena().decl(member).kind {
            if fd.flags.contains(FnFlags::VIRTUAL) {
                return true;
            }
        }
    }
    let bases: Vec<lucid_ir::BaseSpecifier> = p.arena().base_list(rd.bases).to_vec();
    bases.iter().any(|base| is_polymorphic(p, base.record))
}

/// Size of a type under the declared layout model.
pub fn type_size(p: &Printer<'_, '_>, ty: TypeId) -> u64 {
    match p.types().get(ty).kind {
        TypeKind::Builtin(kind) => match kind {
            BuiltinKind::Void => 0,
            BuiltinKind::Bool | BuiltinKind::Char => 1,
            BuiltinKind::Int | BuiltinKind::UInt | BuiltinKind::Float => 4,
            BuiltinKind::Long
            | BuiltinKind::ULong
            | BuiltinKind::LongLong
            | BuiltinKind::Double
            | BuiltinKind::NullptrT => 8,
        },
        TypeKind::Pointer(_) | TypeKind::LValueRef(_) | TypeKind::RValueRef(_) => PTR_SIZE,
        TypeKind::Array { elem, len } => type_size(p, elem) * u64::from(len),
        TypeKind::Function { .. } => PTR_SIZE,
        TypeKind::Record(decl) | TypeKind::Closure(decl) => record_layout(p, decl).size,
        TypeKind::Deduced { deduced } => type_size(p, deduced),
    }
}

fn align_to(offset: u64, align: u64) -> u64 {
    if align == 0 {
        return offset;
    }
    offset.div_ceil(align) * align
}

/// Layout of a record: dispatch-table pointer first when the record itself
/// introduces one, then base subobjects in declaration order, then own
/// fields aligned to `min(size, 8)`.
pub fn record_layout(p: &Printer<'_, '_>, record: DeclId) -> RecordLayout {
    let DeclKind::Record(rd) = p.arena().decl(record).kind else {
        return RecordLayout::default();
    };

    let mut layout = RecordLayout::default();
    let mut cursor = 0u64;

    let bases: Vec<lucid_ir::BaseSpecifier> = p.arena().base_list(rd.bases).to_vec();
    let primary_base_polymorphic = bases
        .first()
        .is_some_and(|base| is_polymorphic(p, base.record));

    if is_polymorphic(p, record) && !primary_base_polymorphic {
        // The record introduces the table pointer itself.
        layout.own_vptr = true;
        cursor += PTR_SIZE;
    }

    for base in &bases {
        let base_layout = record_layout(p, base.record);
        let offset = align_to(cursor, PTR_SIZE.min(base_layout.size.max(1)));
        layout.base_offsets.push((base.record, offset));
        cursor = offset + base_layout.size.max(1);
    }

    let members: Vec<DeclId> = p.arena().decl_list(rd.members).to_vec();
    for member in members {
        if let DeclKind::Field { ty, .. } = p.arena().decl(member).kind {
            let size = type_size(p, ty).max(1);
            let align = size.min(PTR_SIZE);
            cursor = align_to(cursor, align) + size;
        }
    }

    layout.size = cursor.max(1);
    layout
}

/// Ordered virtual-function slots of a record's dispatch table.
///
/// Slots inherited from the primary base keep their index; an override in
/// the derived record occupies the slot of the function it overrides; new
/// virtual functions are appended.
pub fn vtable_slots(p: &Printer<'_, '_>, record: DeclId) -> Vec<DeclId> {
    let DeclKind::Record(rd) = p.arena().decl(record).kind else {
        return Vec::new();
    };

    let bases: Vec<lucid_ir::BaseSpecifier> = p.arena().base_list(rd.bases).to_vec();
    let mut slots: Vec<DeclId> = bases
        .first()
        .map(|base| vtable_slots(p, base.record))
        .unwrap_or_default();

    let members: Vec<DeclId> = p.arena().decl_list(rd.members).to_vec();
    for member in members {
        let DeclKind::Function(fd) = p.arena().decl(member).kind else {
            continue;
        };
        if !fd.flags.contains(FnFlags::VIRTUAL) {
            continue;
        }
        // An override replaces the overridden entry; same name, same slot.
        let name = fn_slot_key(p, member, fd);
        let existing = slots
            .iter()
            .position(|&slot| fn_slot_key_of(p, slot) == name);
        match existing {
            Some(index) => slots[index] = member,
            None => slots.push(member),
        }
    }
    slots
}

/// Slot index of a virtual function within `record`'s table.
pub fn slot_index(p: &Printer<'_, '_>, record: DeclId, function: DeclId) -> Option<usize> {
    let key = fn_slot_key_of(p, function);
    vtable_slots(p, record)
        .iter()
        .position(|&slot| fn_slot_key_of(p, slot) == key)
}

fn fn_slot_key(p: &Printer<'_, '_>, _id: DeclId, fd: lucid_ir::FnDecl) -> (&'static str, bool) {
    (p.name(fd.name), fd.role == FnRole::Destructor)
}

fn fn_slot_key_of(p: &Printer<'_, '_>, id: DeclId) -> (&'static str, bool) {
    match p.arena().decl(id).kind {
        DeclKind::Function(fd) => fn_slot_key(p, id, fd),
        _ => ("", false),
    }
}

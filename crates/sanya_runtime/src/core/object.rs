//! Heap object layout.
//!
//! Every object occupies one cell of a semispace: a header followed by the
//! kind-specific payload. Sizes are accounted in bytes as if the object were
//! laid out contiguously, so arena usage behaves like a bump allocator.

use crate::types::dict::Dict;
use crate::types::growable::GrowableVector;
use crate::types::symbol::Symbol;
use sanya_core::{ObjectId, ObjectType, Value};
use std::slice;

/// Allocation granularity in bytes.
pub const ALIGNMENT: usize = 16;

/// Size, type and forwarding field.
pub const HEADER_SIZE: usize = 16;

const WORD: usize = std::mem::size_of::<u64>();

#[inline]
pub const fn align(size: usize) -> usize {
    size.saturating_add(ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Header {
    /// Aligned object size in bytes, header included.
    pub size: usize,
    /// Equals the object's own slot until the object is relocated.
    pub forward: ObjectId,
}

#[derive(Clone, Debug)]
pub(crate) enum ManagedObject {
    Pair([Value; 2]),
    Symbol(Symbol),
    Vector(Box<[Value]>),
    GrowableVector(GrowableVector),
    Dict(Dict),
}

#[derive(Clone, Debug)]
pub(crate) struct HeapCell {
    pub header: Header,
    pub object: ManagedObject,
}

impl ManagedObject {
    pub const PAIR_SIZE: usize = align(HEADER_SIZE + 2 * WORD);
    pub const GROWABLE_VECTOR_SIZE: usize = align(HEADER_SIZE + 2 * WORD);
    pub const DICT_SIZE: usize = align(HEADER_SIZE + 3 * WORD);

    /// Length word plus one word per slot.
    pub const fn vector_size(len: usize) -> usize {
        align((HEADER_SIZE + WORD).saturating_add(len.saturating_mul(WORD)))
    }

    /// Length, hash and flag words plus the NUL-terminated spelling.
    pub const fn symbol_size(len: usize) -> usize {
        align((HEADER_SIZE + 3 * WORD + 1).saturating_add(len))
    }

    pub fn size(&self) -> usize {
        match self {
            ManagedObject::Pair(_) => Self::PAIR_SIZE,
            ManagedObject::Symbol(s) => Self::symbol_size(s.len()),
            ManagedObject::Vector(v) => Self::vector_size(v.len()),
            ManagedObject::GrowableVector(_) => Self::GROWABLE_VECTOR_SIZE,
            ManagedObject::Dict(_) => Self::DICT_SIZE,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            ManagedObject::Pair(_) => ObjectType::Pair,
            ManagedObject::Symbol(_) => ObjectType::Symbol,
            ManagedObject::Vector(_) => ObjectType::Vector,
            ManagedObject::GrowableVector(_) => ObjectType::GrowableVector,
            ManagedObject::Dict(_) => ObjectType::Dict,
        }
    }

    /// Interior references the collector must relocate.
    pub fn refs(&self) -> &[Value] {
        match self {
            ManagedObject::Pair(cell) => cell,
            ManagedObject::Symbol(_) => &[],
            ManagedObject::Vector(slots) => slots,
            ManagedObject::GrowableVector(g) => slice::from_ref(&g.vector),
            ManagedObject::Dict(d) => slice::from_ref(&d.buckets),
        }
    }

    pub fn refs_mut(&mut self) -> &mut [Value] {
        match self {
            ManagedObject::Pair(cell) => cell,
            ManagedObject::Symbol(_) => &mut [],
            ManagedObject::Vector(slots) => slots,
            ManagedObject::GrowableVector(g) => slice::from_mut(&mut g.vector),
            ManagedObject::Dict(d) => slice::from_mut(&mut d.buckets),
        }
    }
}

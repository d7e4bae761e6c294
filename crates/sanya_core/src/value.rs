//! Runtime value representation.
//!
//! A `Value` is a single tagged word. The low `TAG_SHIFT` bits select the
//! kind of an immediate value; a word whose tag bits are all zero (and which
//! is not null) refers to a heap object by slot index.

use crate::gc::ObjectId;
use std::fmt;

// Tagging constants
pub const TAG_SHIFT: u32 = 4;
pub const TAG_MASK: u64 = (1 << TAG_SHIFT) - 1;

pub const TAG_FIXNUM: u64 = 0x1;
pub const TAG_NIL: u64 = 0x2;
pub const TAG_BOOL: u64 = 0x3;
pub const TAG_TAG: u64 = 0x4;

/// Width of a fixnum payload in bits.
pub const FIXNUM_BITS: u32 = u64::BITS - TAG_SHIFT;
pub const FIXNUM_MAX: i64 = (1 << (FIXNUM_BITS - 1)) - 1;
pub const FIXNUM_MIN: i64 = -(1 << (FIXNUM_BITS - 1));

/// Closed set of value kinds.
///
/// Immediate kinds reuse their tag as discriminant; heap kinds start past the
/// last representable tag so the two ranges never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjectType {
    Fixnum = TAG_FIXNUM as u8,
    Nil = TAG_NIL as u8,
    Boolean = TAG_BOOL as u8,
    Tag = TAG_TAG as u8,
    Symbol = TAG_MASK as u8 + 1,
    Pair,
    Vector,
    GrowableVector,
    Dict,
}

impl ObjectType {
    pub fn name(self) -> &'static str {
        match self {
            ObjectType::Fixnum => "fixnum",
            ObjectType::Nil => "nil",
            ObjectType::Boolean => "boolean",
            ObjectType::Tag => "tag",
            ObjectType::Symbol => "symbol",
            ObjectType::Pair => "pair",
            ObjectType::Vector => "vector",
            ObjectType::GrowableVector => "growable-vector",
            ObjectType::Dict => "dict",
        }
    }

    /// Whether values of this kind live in the managed heap.
    pub fn is_heap(self) -> bool {
        self as u8 > TAG_MASK as u8
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Value(u64);

impl Default for Value {
    fn default() -> Self {
        Self::NIL
    }
}

impl Value {
    pub const NIL: Value = Value(TAG_NIL);
    pub const TRUE: Value = Value((1 << TAG_SHIFT) | TAG_BOOL);
    pub const FALSE: Value = Value(TAG_BOOL);

    /// Wrap an integer as a fixnum.
    ///
    /// Integers outside `FIXNUM_MIN..=FIXNUM_MAX` wrap around modulo
    /// 2^`FIXNUM_BITS` (two's complement), exactly as the shift discards
    /// the top bits. Use [`Value::checked_fixnum`] to reject them instead.
    #[inline(always)]
    pub fn fixnum(i: i64) -> Self {
        Self(((i as u64) << TAG_SHIFT) | TAG_FIXNUM)
    }

    #[inline]
    pub fn checked_fixnum(i: i64) -> Option<Self> {
        (FIXNUM_MIN..=FIXNUM_MAX)
            .contains(&i)
            .then(|| Self::fixnum(i))
    }

    #[inline(always)]
    pub fn boolean(b: bool) -> Self {
        if b { Self::TRUE } else { Self::FALSE }
    }

    /// A generic non-heap marker carrying a 32-bit payload.
    #[inline(always)]
    pub fn tag(t: u32) -> Self {
        Self(((t as u64) << TAG_SHIFT) | TAG_TAG)
    }

    /// Reference to the heap object at `id`.
    ///
    /// Slot 0 is encoded as 1 so that no heap reference is the null word.
    #[inline(always)]
    pub fn object(id: ObjectId) -> Self {
        Self(((id.0 as u64) + 1) << TAG_SHIFT)
    }

    #[inline(always)]
    fn tag_bits(self) -> u64 {
        self.0 & TAG_MASK
    }

    #[inline(always)]
    pub fn is_heap_allocated(self) -> bool {
        self.0 != 0 && self.tag_bits() == 0
    }
    #[inline(always)]
    pub fn is_fixnum(self) -> bool {
        self.tag_bits() == TAG_FIXNUM
    }
    #[inline(always)]
    pub fn is_nil(self) -> bool {
        self.0 == TAG_NIL
    }
    #[inline(always)]
    pub fn is_bool(self) -> bool {
        self.tag_bits() == TAG_BOOL
    }
    #[inline(always)]
    pub fn is_tag(self) -> bool {
        self.tag_bits() == TAG_TAG
    }

    /// Only `#f` is false.
    #[inline(always)]
    pub fn is_true(self) -> bool {
        self != Self::FALSE
    }

    #[inline(always)]
    pub fn as_i64(self) -> i64 {
        (self.0 as i64) >> TAG_SHIFT
    }

    #[inline(always)]
    pub fn as_bool(self) -> bool {
        (self.0 >> TAG_SHIFT) & 1 != 0
    }

    #[inline(always)]
    pub fn as_tag(self) -> u32 {
        (self.0 >> TAG_SHIFT) as u32
    }

    #[inline(always)]
    pub fn as_obj_id(self) -> ObjectId {
        debug_assert!(self.is_heap_allocated());
        ObjectId(((self.0 >> TAG_SHIFT) - 1) as usize)
    }

    /// The raw word. Used as the identity hash of immediates.
    #[inline(always)]
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Kind of an immediate, answered from the tag bits alone.
    ///
    /// Returns `None` for heap references, whose kind lives in the object
    /// header.
    pub fn immediate_type(self) -> Option<ObjectType> {
        match self.tag_bits() {
            0 => None,
            TAG_FIXNUM => Some(ObjectType::Fixnum),
            TAG_NIL => Some(ObjectType::Nil),
            TAG_BOOL => Some(ObjectType::Boolean),
            TAG_TAG => Some(ObjectType::Tag),
            other => unreachable!("reserved tag {other:#x} in value word"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_heap_allocated() {
            return write!(f, "Object(id={:?})", self.as_obj_id());
        }
        match self.immediate_type() {
            Some(ObjectType::Fixnum) => write!(f, "Fixnum({})", self.as_i64()),
            Some(ObjectType::Nil) => write!(f, "Nil"),
            Some(ObjectType::Boolean) => write!(f, "Bool({})", self.as_bool()),
            Some(ObjectType::Tag) => write!(f, "Tag({})", self.as_tag()),
            _ => write!(f, "Unknown({:#x})", self.0),
        }
    }
}

//! Symbols: immutable byte strings with a cached hash.

use super::expect_type;
use crate::core::object::ManagedObject;
use crate::core::{Handle, Heap};
use crate::errors::{Result, fatal};
use sanya_core::{ObjectType, Value, hash_bytes};

#[derive(Clone, Debug)]
pub(crate) struct Symbol {
    pub bytes: Box<[u8]>,
    pub hash: u64,
    pub interned: bool,
}

impl Symbol {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.into(),
            hash: hash_bytes(bytes),
            interned: false,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

#[track_caller]
pub(crate) fn with_symbol<R>(heap: &Heap, value: Value, f: impl FnOnce(&Symbol) -> R) -> R {
    match &*heap.object(value) {
        ManagedObject::Symbol(sym) => f(sym),
        _ => fatal("expected a symbol"),
    }
}

pub(crate) fn symbol_hash(heap: &Heap, value: Value) -> u64 {
    with_symbol(heap, value, |sym| sym.hash)
}

pub(crate) fn set_interned(heap: &Heap, value: Value) {
    match &mut *heap.object_mut(value) {
        ManagedObject::Symbol(sym) => sym.interned = true,
        _ => fatal("expected a symbol"),
    }
}

/// Symbol equality: identity, or equal content unless both are interned.
///
/// Two distinct interned symbols are never equal, so the content comparison
/// is skipped for them.
pub(crate) fn symbol_eq(heap: &Heap, a: Value, b: Value) -> bool {
    if a == b {
        return true;
    }
    let (a, b) = (heap.object(a), heap.object(b));
    match (&*a, &*b) {
        (ManagedObject::Symbol(x), ManagedObject::Symbol(y)) => {
            if x.interned && y.interned {
                return false;
            }
            x.hash == y.hash && x.len() == y.len() && x.bytes == y.bytes
        }
        _ => fatal("expected a symbol"),
    }
}

impl Heap {
    /// Allocate a fresh, un-interned symbol.
    pub fn symbol(&self, bytes: impl AsRef<[u8]>) -> Result<Handle<'_>> {
        let bytes = bytes.as_ref();
        let value = self.alloc_with(ManagedObject::symbol_size(bytes.len()), || {
            ManagedObject::Symbol(Symbol::new(bytes))
        })?;
        Ok(Handle::new(self, value))
    }
}

/// Read-only view of a symbol held by a handle.
#[derive(Clone, Copy)]
pub struct SymbolRef<'a, 'h> {
    handle: &'a Handle<'h>,
}

impl<'h> Handle<'h> {
    pub fn as_symbol(&self) -> Result<SymbolRef<'_, 'h>> {
        expect_type(self, ObjectType::Symbol)?;
        Ok(SymbolRef { handle: self })
    }
}

impl SymbolRef<'_, '_> {
    fn with<R>(&self, f: impl FnOnce(&Symbol) -> R) -> R {
        with_symbol(self.handle.heap(), self.handle.get(), f)
    }

    pub fn len(&self) -> usize {
        self.with(Symbol::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hash(&self) -> u64 {
        self.with(|sym| sym.hash)
    }

    pub fn is_interned(&self) -> bool {
        self.with(|sym| sym.interned)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.with(|sym| sym.bytes.to_vec())
    }

    pub fn to_string_lossy(&self) -> String {
        self.with(|sym| String::from_utf8_lossy(&sym.bytes).into_owned())
    }
}

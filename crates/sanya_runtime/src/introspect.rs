//! Type queries, equality and hashing.

use crate::core::{Handle, Heap};
use crate::errors::{HeapError, Result};
use crate::types::symbol::{symbol_eq, symbol_hash};
use sanya_core::{ObjectType, Value};

impl Heap {
    /// Kind of `value`. Immediates answer from their tag bits.
    pub fn type_of(&self, value: Value) -> ObjectType {
        match value.immediate_type() {
            Some(ty) => ty,
            None => self.object(value).object_type(),
        }
    }

    pub fn is_symbol(&self, value: Value) -> bool {
        value.is_heap_allocated() && self.type_of(value) == ObjectType::Symbol
    }

    pub fn is_pair(&self, value: Value) -> bool {
        value.is_heap_allocated() && self.type_of(value) == ObjectType::Pair
    }

    pub fn is_vector(&self, value: Value) -> bool {
        value.is_heap_allocated() && self.type_of(value) == ObjectType::Vector
    }

    pub fn is_growable_vector(&self, value: Value) -> bool {
        value.is_heap_allocated() && self.type_of(value) == ObjectType::GrowableVector
    }

    pub fn is_dict(&self, value: Value) -> bool {
        value.is_heap_allocated() && self.type_of(value) == ObjectType::Dict
    }

    /// Identity, except that symbols compare by content.
    pub fn same_as(&self, a: Value, b: Value) -> bool {
        if a == b {
            return true;
        }
        self.is_symbol(a) && self.is_symbol(b) && symbol_eq(self, a, b)
    }

    /// Hash consistent with [`Heap::same_as`].
    ///
    /// Immediates hash to their word, symbols to their cached content hash.
    /// Objects with mutable content cannot be hashed.
    pub fn content_hash(&self, value: Value) -> Result<u64> {
        match self.type_of(value) {
            ObjectType::Fixnum | ObjectType::Nil | ObjectType::Boolean | ObjectType::Tag => {
                Ok(value.bits())
            }
            ObjectType::Symbol => Ok(symbol_hash(self, value)),
            ty @ (ObjectType::Pair
            | ObjectType::Vector
            | ObjectType::GrowableVector
            | ObjectType::Dict) => Err(HeapError::Unhashable(ty)),
        }
    }
}

impl Handle<'_> {
    pub fn type_of(&self) -> ObjectType {
        self.heap().type_of(self.get())
    }

    pub fn is_nil(&self) -> bool {
        self.get().is_nil()
    }

    pub fn is_fixnum(&self) -> bool {
        self.get().is_fixnum()
    }

    pub fn is_boolean(&self) -> bool {
        self.get().is_bool()
    }

    pub fn is_tag(&self) -> bool {
        self.get().is_tag()
    }

    pub fn is_symbol(&self) -> bool {
        self.heap().is_symbol(self.get())
    }

    pub fn is_pair(&self) -> bool {
        self.heap().is_pair(self.get())
    }

    pub fn is_vector(&self) -> bool {
        self.heap().is_vector(self.get())
    }

    pub fn is_growable_vector(&self) -> bool {
        self.heap().is_growable_vector(self.get())
    }

    pub fn is_dict(&self) -> bool {
        self.heap().is_dict(self.get())
    }

    pub fn same_as(&self, other: &Handle<'_>) -> bool {
        self.heap().same_as(self.get(), other.get())
    }

    pub fn content_hash(&self) -> Result<u64> {
        self.heap().content_hash(self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_types() {
        let heap = Heap::new();
        assert_eq!(heap.type_of(Value::NIL), ObjectType::Nil);
        assert_eq!(heap.type_of(Value::fixnum(3)), ObjectType::Fixnum);
        assert_eq!(heap.type_of(Value::FALSE), ObjectType::Boolean);
        assert_eq!(heap.type_of(Value::tag(1)), ObjectType::Tag);
        assert!(!heap.is_pair(Value::NIL));
    }

    #[test]
    fn heap_types() {
        let heap = Heap::new();
        let nil = Handle::nil(&heap);
        assert_eq!(heap.pair(&nil, &nil).unwrap().type_of(), ObjectType::Pair);
        assert_eq!(heap.symbol("s").unwrap().type_of(), ObjectType::Symbol);
        assert_eq!(heap.vector(1, &nil).unwrap().type_of(), ObjectType::Vector);
        assert!(heap.growable_vector().unwrap().is_growable_vector());
        assert!(heap.dict().unwrap().is_dict());
    }

    #[test]
    fn equality_and_hash_agree_for_symbols() {
        let heap = Heap::new();
        let a = heap.symbol("same").unwrap();
        let b = heap.symbol("same").unwrap();
        assert!(a.same_as(&b));
        assert_eq!(a.content_hash().unwrap(), b.content_hash().unwrap());
    }

    #[test]
    fn pairs_compare_by_identity() {
        let heap = Heap::new();
        let nil = Handle::nil(&heap);
        let a = heap.pair(&nil, &nil).unwrap();
        let b = heap.pair(&nil, &nil).unwrap();
        assert!(a.same_as(&a));
        assert!(!a.same_as(&b));
    }

    #[test]
    fn mutable_containers_are_unhashable() {
        let heap = Heap::new();
        let nil = Handle::nil(&heap);
        let pair = heap.pair(&nil, &nil).unwrap();
        assert_eq!(pair.content_hash(), Err(HeapError::Unhashable(ObjectType::Pair)));
        let dict = heap.dict().unwrap();
        assert_eq!(dict.content_hash(), Err(HeapError::Unhashable(ObjectType::Dict)));
        assert_eq!(Handle::new(&heap, Value::fixnum(5)).content_hash(), Ok(Value::fixnum(5).bits()));
    }
}

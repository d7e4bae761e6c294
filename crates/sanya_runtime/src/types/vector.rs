//! Fixed-length vectors.

use super::expect_type;
use crate::core::object::ManagedObject;
use crate::core::{Handle, Heap};
use crate::errors::{HeapError, Result, fatal};
use sanya_core::{ObjectType, Value};

#[track_caller]
pub(crate) fn with_slots<R>(heap: &Heap, vector: Value, f: impl FnOnce(&[Value]) -> R) -> R {
    match &*heap.object(vector) {
        ManagedObject::Vector(slots) => f(slots),
        _ => fatal("expected a vector"),
    }
}

#[track_caller]
pub(crate) fn with_slots_mut<R>(
    heap: &Heap,
    vector: Value,
    f: impl FnOnce(&mut [Value]) -> R,
) -> R {
    match &mut *heap.object_mut(vector) {
        ManagedObject::Vector(slots) => f(slots),
        _ => fatal("expected a vector"),
    }
}

pub(crate) fn vector_len(heap: &Heap, vector: Value) -> usize {
    with_slots(heap, vector, <[Value]>::len)
}

pub(crate) fn out_of_range(index: usize, len: usize) -> HeapError {
    HeapError::IndexOutOfRange {
        index: isize::try_from(index).unwrap_or(isize::MAX),
        len,
    }
}

impl Heap {
    /// Allocate a vector of `len` slots, each set to `fill`.
    pub fn vector(&self, len: usize, fill: &Handle<'_>) -> Result<Handle<'_>> {
        let value = self.alloc_with(ManagedObject::vector_size(len), || {
            ManagedObject::Vector(vec![fill.get(); len].into_boxed_slice())
        })?;
        Ok(Handle::new(self, value))
    }
}

#[derive(Clone, Copy)]
pub struct VectorRef<'a, 'h> {
    handle: &'a Handle<'h>,
}

impl<'h> Handle<'h> {
    pub fn as_vector(&self) -> Result<VectorRef<'_, 'h>> {
        expect_type(self, ObjectType::Vector)?;
        Ok(VectorRef { handle: self })
    }
}

impl<'h> VectorRef<'_, 'h> {
    pub fn len(&self) -> usize {
        vector_len(self.handle.heap(), self.handle.get())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Result<Handle<'h>> {
        let heap = self.handle.heap();
        let value = with_slots(heap, self.handle.get(), |slots| {
            slots
                .get(index)
                .copied()
                .ok_or_else(|| out_of_range(index, slots.len()))
        })?;
        Ok(Handle::new(heap, value))
    }

    pub fn set(&self, index: usize, value: &Handle<'_>) -> Result<()> {
        let value = value.get();
        with_slots_mut(self.handle.heap(), self.handle.get(), |slots| -> Result<()> {
            let len = slots.len();
            let slot = slots.get_mut(index).ok_or_else(|| out_of_range(index, len))?;
            *slot = value;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_on_creation() {
        let heap = Heap::new();
        let zero = Handle::new(&heap, Value::fixnum(0));
        let v = heap.vector(3, &zero).unwrap();
        let view = v.as_vector().unwrap();
        assert_eq!(view.len(), 3);
        for i in 0..3 {
            assert_eq!(view.get(i).unwrap().get(), Value::fixnum(0));
        }
    }

    #[test]
    fn access_is_bounds_checked() {
        let heap = Heap::new();
        let nil = Handle::nil(&heap);
        let v = heap.vector(2, &nil).unwrap();
        let view = v.as_vector().unwrap();
        assert_eq!(
            view.get(2).unwrap_err(),
            HeapError::IndexOutOfRange { index: 2, len: 2 }
        );
        assert!(view.set(5, &nil).is_err());
        view.set(1, &Handle::new(&heap, Value::TRUE)).unwrap();
        assert_eq!(view.get(1).unwrap().get(), Value::TRUE);
    }

    #[test]
    fn empty_vector() {
        let heap = Heap::new();
        let nil = Handle::nil(&heap);
        let v = heap.vector(0, &nil).unwrap();
        assert!(v.as_vector().unwrap().is_empty());
        assert_eq!(heap.bytes_used(), ManagedObject::vector_size(0));
    }

    #[test]
    fn slots_hold_heap_references_across_collection() {
        let heap = Heap::new();
        let nil = Handle::nil(&heap);
        let v = heap.vector(2, &nil).unwrap();
        let sym = heap.symbol("x").unwrap();
        v.as_vector().unwrap().set(0, &sym).unwrap();
        drop(sym);
        heap.collect();
        let slot = v.as_vector().unwrap().get(0).unwrap();
        assert_eq!(slot.as_symbol().unwrap().to_string_lossy(), "x");
    }
}

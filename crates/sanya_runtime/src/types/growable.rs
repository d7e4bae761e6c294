//! Growable vectors.
//!
//! A growable vector owns a fixed vector as backing store plus a usage count.
//! Capacity doubles when an append finds the store full and halves once
//! usage drops under a quarter of capacity, never below
//! [`MIN_CAPACITY`]. The gap between the two thresholds keeps an
//! append/pop sequence at the boundary from resizing on every call.
//!
//! Resizing allocates, and allocation may collect and move the vector being
//! resized. The container is therefore only ever reached through its
//! handle, and the new backing store is filled after the reservation.

use super::expect_type;
use super::vector::{with_slots, with_slots_mut};
use crate::core::object::ManagedObject;
use crate::core::{Handle, Heap};
use crate::errors::{HeapError, Result, fatal};
use sanya_core::{ObjectType, Value};
use tracing::trace;

pub const MIN_CAPACITY: usize = 8;

#[derive(Clone, Copy, Debug)]
pub(crate) struct GrowableVector {
    pub vector: Value,
    pub len: usize,
}

#[track_caller]
pub(crate) fn growable(heap: &Heap, value: Value) -> GrowableVector {
    match &*heap.object(value) {
        ManagedObject::GrowableVector(g) => *g,
        _ => fatal("expected a growable vector"),
    }
}

#[track_caller]
fn update(heap: &Heap, value: Value, f: impl FnOnce(&mut GrowableVector)) {
    match &mut *heap.object_mut(value) {
        ManagedObject::GrowableVector(g) => f(g),
        _ => fatal("expected a growable vector"),
    }
}

/// Resolve a possibly negative index against `len`.
///
/// Negative indices count from the end; underflow clamps to the first
/// element.
fn resolve(index: isize, len: usize) -> Result<usize> {
    let resolved = if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        index.unsigned_abs()
    };
    if resolved < len {
        Ok(resolved)
    } else {
        Err(HeapError::IndexOutOfRange { index, len })
    }
}

impl Heap {
    /// Allocate an empty growable vector with the minimum capacity.
    pub fn growable_vector(&self) -> Result<Handle<'_>> {
        let backing = self.vector(MIN_CAPACITY, &Handle::nil(self))?;
        let value = self.alloc_with(ManagedObject::GROWABLE_VECTOR_SIZE, || {
            ManagedObject::GrowableVector(GrowableVector {
                vector: backing.get(),
                len: 0,
            })
        })?;
        Ok(Handle::new(self, value))
    }
}

#[derive(Clone, Copy)]
pub struct GrowableVectorRef<'a, 'h> {
    handle: &'a Handle<'h>,
}

impl<'h> Handle<'h> {
    pub fn as_growable_vector(&self) -> Result<GrowableVectorRef<'_, 'h>> {
        expect_type(self, ObjectType::GrowableVector)?;
        Ok(GrowableVectorRef { handle: self })
    }
}

impl<'h> GrowableVectorRef<'_, 'h> {
    fn heap(&self) -> &'h Heap {
        self.handle.heap()
    }

    fn state(&self) -> GrowableVector {
        growable(self.heap(), self.handle.get())
    }

    pub fn len(&self) -> usize {
        self.state().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        super::vector::vector_len(self.heap(), self.state().vector)
    }

    pub fn get(&self, index: isize) -> Result<Handle<'h>> {
        let state = self.state();
        let at = resolve(index, state.len)?;
        let value = with_slots(self.heap(), state.vector, |slots| slots[at]);
        Ok(Handle::new(self.heap(), value))
    }

    pub fn set(&self, index: isize, value: &Handle<'_>) -> Result<()> {
        let state = self.state();
        let at = resolve(index, state.len)?;
        let value = value.get();
        with_slots_mut(self.heap(), state.vector, |slots| slots[at] = value);
        Ok(())
    }

    pub fn append(&self, value: &Handle<'_>) -> Result<()> {
        let state = self.state();
        let capacity = self.capacity();
        if state.len == capacity {
            self.resize(capacity.saturating_mul(2))?;
        }

        // Re-read: the resize above may have moved everything.
        let state = self.state();
        let value = value.get();
        with_slots_mut(self.heap(), state.vector, |slots| slots[state.len] = value);
        update(self.heap(), self.handle.get(), |g| g.len += 1);
        Ok(())
    }

    /// Remove and return the last element, or `None` when empty.
    pub fn pop(&self) -> Result<Option<Handle<'h>>> {
        let state = self.state();
        let Some(last) = state.len.checked_sub(1) else {
            return Ok(None);
        };
        let value = with_slots_mut(self.heap(), state.vector, |slots| {
            std::mem::replace(&mut slots[last], Value::NIL)
        });
        update(self.heap(), self.handle.get(), |g| g.len = last);
        let popped = Handle::new(self.heap(), value);

        let capacity = self.capacity();
        if last < capacity / 4 && capacity > MIN_CAPACITY {
            self.resize((capacity / 2).max(MIN_CAPACITY))?;
        }
        Ok(Some(popped))
    }

    /// Move the live elements into a fresh backing vector of `capacity`.
    fn resize(&self, capacity: usize) -> Result<()> {
        let heap = self.heap();
        let fresh = heap.alloc_with(ManagedObject::vector_size(capacity), || {
            let state = self.state();
            let mut slots = vec![Value::NIL; capacity].into_boxed_slice();
            with_slots(heap, state.vector, |old| {
                slots[..state.len].copy_from_slice(&old[..state.len]);
            });
            ManagedObject::Vector(slots)
        })?;
        update(heap, self.handle.get(), |g| g.vector = fresh);
        trace!(capacity, len = self.len(), "growable vector resized");
        Ok(())
    }
}

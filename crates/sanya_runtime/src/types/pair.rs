//! Pairs: mutable two-field cells.

use super::expect_type;
use crate::core::object::ManagedObject;
use crate::core::{Handle, Heap};
use crate::errors::{Result, fatal};
use sanya_core::{ObjectType, Value};

#[track_caller]
pub(crate) fn car(heap: &Heap, pair: Value) -> Value {
    match &*heap.object(pair) {
        ManagedObject::Pair([car, _]) => *car,
        _ => fatal("expected a pair"),
    }
}

#[track_caller]
pub(crate) fn cdr(heap: &Heap, pair: Value) -> Value {
    match &*heap.object(pair) {
        ManagedObject::Pair([_, cdr]) => *cdr,
        _ => fatal("expected a pair"),
    }
}

#[track_caller]
pub(crate) fn set_car(heap: &Heap, pair: Value, value: Value) {
    match &mut *heap.object_mut(pair) {
        ManagedObject::Pair([car, _]) => *car = value,
        _ => fatal("expected a pair"),
    }
}

#[track_caller]
pub(crate) fn set_cdr(heap: &Heap, pair: Value, value: Value) {
    match &mut *heap.object_mut(pair) {
        ManagedObject::Pair([_, cdr]) => *cdr = value,
        _ => fatal("expected a pair"),
    }
}

impl Heap {
    pub fn pair(&self, car: &Handle<'_>, cdr: &Handle<'_>) -> Result<Handle<'_>> {
        let value = self.alloc_with(ManagedObject::PAIR_SIZE, || {
            ManagedObject::Pair([car.get(), cdr.get()])
        })?;
        Ok(Handle::new(self, value))
    }
}

#[derive(Clone, Copy)]
pub struct PairRef<'a, 'h> {
    handle: &'a Handle<'h>,
}

impl<'h> Handle<'h> {
    pub fn as_pair(&self) -> Result<PairRef<'_, 'h>> {
        expect_type(self, ObjectType::Pair)?;
        Ok(PairRef { handle: self })
    }
}

impl<'h> PairRef<'_, 'h> {
    pub fn car(&self) -> Handle<'h> {
        let heap = self.handle.heap();
        Handle::new(heap, car(heap, self.handle.get()))
    }

    pub fn cdr(&self) -> Handle<'h> {
        let heap = self.handle.heap();
        Handle::new(heap, cdr(heap, self.handle.get()))
    }

    pub fn set_car(&self, value: &Handle<'_>) {
        set_car(self.handle.heap(), self.handle.get(), value.get());
    }

    pub fn set_cdr(&self, value: &Handle<'_>) {
        set_cdr(self.handle.heap(), self.handle.get(), value.get());
    }
}

//! Handles: relocation-safe external references.
//!
//! A handle is registered in the heap's root set exactly while it holds a
//! heap reference. Immediates need no registration, so a handle holding a
//! fixnum costs nothing at collection time. While registered, the
//! authoritative value lives in the root node, where the collector rewrites
//! it.

use super::heap::Heap;
use super::roots::RootId;
use sanya_core::Value;
use std::fmt;

pub struct Handle<'h> {
    heap: &'h Heap,
    /// Value of an unregistered handle; stale once `root` is set.
    raw: Value,
    root: Option<RootId>,
}

impl<'h> Handle<'h> {
    pub fn new(heap: &'h Heap, value: Value) -> Self {
        let mut handle = Handle {
            heap,
            raw: Value::NIL,
            root: None,
        };
        handle.set(value);
        handle
    }

    pub fn nil(heap: &'h Heap) -> Self {
        Self::new(heap, Value::NIL)
    }

    pub fn heap(&self) -> &'h Heap {
        self.heap
    }

    /// Current value.
    ///
    /// A heap reference read here is only valid until the next allocation;
    /// keep it in a handle to carry it further.
    #[inline]
    pub fn get(&self) -> Value {
        match self.root {
            Some(id) => self.heap.roots.borrow().get(id),
            None => self.raw,
        }
    }

    /// Reassign, registering or unregistering as the new value requires.
    pub fn set(&mut self, value: Value) {
        match (value.is_heap_allocated(), self.root) {
            (true, None) => {
                self.root = Some(self.heap.roots.borrow_mut().put(value));
            }
            (true, Some(id)) => self.heap.roots.borrow_mut().set(id, value),
            (false, Some(id)) => {
                self.heap.roots.borrow_mut().unlink(id);
                self.root = None;
                self.raw = value;
            }
            (false, None) => self.raw = value,
        }
    }

    pub fn assign(&mut self, other: &Handle<'_>) {
        self.set(other.get());
    }

    /// Whether this handle is currently part of the root set.
    pub fn is_rooted(&self) -> bool {
        self.root.is_some()
    }
}

impl Clone for Handle<'_> {
    fn clone(&self) -> Self {
        Handle::new(self.heap, self.get())
    }
}

impl Drop for Handle<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.root.take() {
            self.heap.roots.borrow_mut().unlink(id);
        }
    }
}

impl fmt::Debug for Handle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("value", &self.get())
            .field("rooted", &self.is_rooted())
            .finish()
    }
}

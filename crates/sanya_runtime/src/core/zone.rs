//! Arena-owned handles.
//!
//! Producers such as the parser build trees whose intermediate nodes have no
//! natural stack owner. A zone keeps every handle it hands out alive (and
//! rooted) until the zone itself is dropped.

use super::handle::Handle;
use super::heap::Heap;
use sanya_core::Value;
use typed_arena::Arena;

pub struct HandleZone<'h> {
    heap: &'h Heap,
    handles: Arena<Handle<'h>>,
}

impl<'h> HandleZone<'h> {
    pub fn new(heap: &'h Heap) -> Self {
        Self {
            heap,
            handles: Arena::new(),
        }
    }

    pub fn heap(&self) -> &'h Heap {
        self.heap
    }

    pub fn alloc(&self, value: Value) -> &mut Handle<'h> {
        self.handles.alloc(Handle::new(self.heap, value))
    }

    /// Move an existing handle into the zone.
    pub fn adopt(&self, handle: Handle<'h>) -> &mut Handle<'h> {
        self.handles.alloc(handle)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

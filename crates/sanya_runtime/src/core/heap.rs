//! Semispace copying heap.
//!
//! Two equal-size spaces. Allocation bumps the usage counter of the active
//! space; objects are addressed by their slot in it. When a request does not
//! fit, every object reachable from the root set is copied into the other
//! space (Cheney's algorithm), the spaces swap roles and the old one is
//! cleared. If the request still does not fit, allocation fails: the heap
//! never grows.
//!
//! Copying leaves a forwarding slot in each evacuated object's header, so a
//! second visit in the same cycle is O(1). That is what keeps shared and
//! cyclic structures from being copied twice or looping forever.

use super::object::{HeapCell, Header, ManagedObject, align};
use super::roots::{RootId, RootSet};
use crate::config::HeapConfig;
use crate::errors::{HeapError, Result, fatal};
use sanya_core::{ObjectId, Value};
use smallvec::SmallVec;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::mem;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GcStats {
    pub collections: usize,
    pub bytes_allocated: usize,
    pub bytes_copied: usize,
    pub objects_copied: usize,
    /// Bytes in use right after the last collection.
    pub live_bytes: usize,
}

#[derive(Default)]
struct Semispace {
    cells: Vec<HeapCell>,
    usage: usize,
}

impl Semispace {
    fn clear(&mut self) {
        self.cells.clear();
        self.usage = 0;
    }
}

struct Spaces {
    active: Semispace,
    other: Semispace,
    capacity: usize,
    stats: GcStats,
}

impl Spaces {
    fn fits(&self, size: usize) -> bool {
        self.active
            .usage
            .checked_add(size)
            .is_some_and(|after| after <= self.capacity)
    }
}

/// The managed heap together with its root set.
///
/// A `Heap` is an explicit context: handles borrow it, constructors live on
/// it, and independent heaps never share objects. It is single-threaded by
/// construction (`!Sync`).
pub struct Heap {
    config: HeapConfig,
    spaces: RefCell<Spaces>,
    pub(crate) roots: RefCell<RootSet>,
    /// Permanent root of the interning table, created on first use.
    pub(crate) symbol_table: Cell<Option<RootId>>,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    pub fn from_env() -> Self {
        Self::with_config(HeapConfig::from_env())
    }

    pub fn with_config(config: HeapConfig) -> Self {
        let capacity = config.effective_semispace_size();
        debug!(capacity, stress = config.stress, "heap created");
        Self {
            config,
            spaces: RefCell::new(Spaces {
                active: Semispace::default(),
                other: Semispace::default(),
                capacity,
                stats: GcStats::default(),
            }),
            roots: RefCell::new(RootSet::new()),
            symbol_table: Cell::new(None),
        }
    }

    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Capacity of one semispace in bytes.
    pub fn capacity(&self) -> usize {
        self.spaces.borrow().capacity
    }

    /// Bytes allocated in the active space.
    pub fn bytes_used(&self) -> usize {
        self.spaces.borrow().active.usage
    }

    /// Objects in the active space, live or not.
    pub fn object_count(&self) -> usize {
        self.spaces.borrow().active.cells.len()
    }

    /// Registered roots, including the interning table once created.
    pub fn root_count(&self) -> usize {
        self.roots.borrow().len()
    }

    pub fn stats(&self) -> GcStats {
        self.spaces.borrow().stats
    }

    // -----------------------------------------------------------------------
    // Allocation
    // -----------------------------------------------------------------------

    /// Make room for `size` bytes, collecting once if needed.
    ///
    /// Any raw heap `Value` not held by a handle is invalid after this call.
    pub(crate) fn reserve(&self, size: usize) -> Result<()> {
        let size = align(size);
        if !self.config.stress && self.spaces.borrow().fits(size) {
            return Ok(());
        }

        self.collect();

        let spaces = self.spaces.borrow();
        if spaces.fits(size) {
            Ok(())
        } else {
            warn!(
                requested = size,
                used = spaces.active.usage,
                capacity = spaces.capacity,
                "allocation does not fit after collection"
            );
            Err(HeapError::OutOfMemory {
                requested: size,
                capacity: spaces.capacity,
            })
        }
    }

    /// Place an object in space previously secured by [`Heap::reserve`].
    pub(crate) fn push(&self, object: ManagedObject) -> Value {
        let size = object.size();
        let mut spaces = self.spaces.borrow_mut();
        if !spaces.fits(size) {
            fatal("object pushed without a reservation");
        }
        let id = ObjectId(spaces.active.cells.len());
        spaces.active.cells.push(HeapCell {
            header: Header { size, forward: id },
            object,
        });
        spaces.active.usage += size;
        spaces.stats.bytes_allocated += size;
        Value::object(id)
    }

    /// Reserve `size` bytes, then build the object.
    ///
    /// `build` runs after any collection the reservation triggered, so it
    /// must read its inputs from handles, never from values captured earlier.
    pub(crate) fn alloc_with(
        &self,
        size: usize,
        build: impl FnOnce() -> ManagedObject,
    ) -> Result<Value> {
        self.reserve(size)?;
        let object = build();
        debug_assert_eq!(object.size(), align(size));
        Ok(self.push(object))
    }

    // -----------------------------------------------------------------------
    // Object access
    // -----------------------------------------------------------------------

    #[track_caller]
    pub(crate) fn object(&self, value: Value) -> Ref<'_, ManagedObject> {
        let id = checked_id(value);
        Ref::map(self.spaces.borrow(), |spaces| match spaces.active.cells.get(id.0) {
            Some(cell) => &cell.object,
            None => fatal("dangling object reference"),
        })
    }

    #[track_caller]
    pub(crate) fn object_mut(&self, value: Value) -> RefMut<'_, ManagedObject> {
        let id = checked_id(value);
        RefMut::map(self.spaces.borrow_mut(), |spaces| {
            match spaces.active.cells.get_mut(id.0) {
                Some(cell) => &mut cell.object,
                None => fatal("dangling object reference"),
            }
        })
    }

    // -----------------------------------------------------------------------
    // Collection
    // -----------------------------------------------------------------------

    /// Run a full stop-the-world collection.
    ///
    /// Every registered handle is updated to its object's new location.
    pub fn collect(&self) {
        let mut spaces = self.spaces.borrow_mut();
        let mut roots = self.roots.borrow_mut();
        let Spaces {
            active,
            other,
            stats,
            ..
        } = &mut *spaces;

        let before = active.usage;
        let mut collector = Collector {
            from: &mut *active,
            to: &mut *other,
            copied: 0,
        };
        roots.for_each_mut(|root| *root = collector.relocate(*root));
        collector.scan();
        let copied = collector.copied;

        mem::swap(active, other);
        other.clear();

        stats.collections += 1;
        stats.bytes_copied += active.usage;
        stats.objects_copied += copied;
        stats.live_bytes = active.usage;

        debug!(
            target: "sanya::heap",
            before,
            after = active.usage,
            objects = copied,
            roots = roots.len(),
            ":heap-collect"
        );
    }
}

#[track_caller]
fn checked_id(value: Value) -> ObjectId {
    if !value.is_heap_allocated() {
        fatal("object access through an immediate value");
    }
    value.as_obj_id()
}

/// One collection cycle: evacuates from `from` into `to`.
struct Collector<'a> {
    from: &'a mut Semispace,
    to: &'a mut Semispace,
    copied: usize,
}

impl Collector<'_> {
    /// Return the post-collection location of `value`, copying on first visit.
    fn relocate(&mut self, value: Value) -> Value {
        if !value.is_heap_allocated() {
            return value;
        }
        let id = value.as_obj_id();
        let Some(cell) = self.from.cells.get_mut(id.0) else {
            fatal("root or field refers outside the active space");
        };
        if cell.header.forward != id {
            return Value::object(cell.header.forward);
        }
        if cell.header.size != cell.object.size() {
            fatal("corrupted object header size");
        }

        // Forwarded cells are never read again.
        let new_id = ObjectId(self.to.cells.len());
        let object = mem::replace(&mut cell.object, ManagedObject::Pair([Value::NIL; 2]));
        self.to.cells.push(HeapCell {
            header: Header {
                size: cell.header.size,
                forward: new_id,
            },
            object,
        });
        self.to.usage += cell.header.size;
        cell.header.forward = new_id;
        self.copied += 1;
        Value::object(new_id)
    }

    /// Fix up interior references of every copied object, breadth first.
    ///
    /// Objects copied while scanning are appended behind the scan cursor, so
    /// the loop ends once everything reachable has been fixed up.
    fn scan(&mut self) {
        let mut cursor = 0;
        while cursor < self.to.cells.len() {
            let refs: SmallVec<[Value; 4]> = self.to.cells[cursor]
                .object
                .refs()
                .iter()
                .copied()
                .collect();
            if !refs.is_empty() {
                let moved: SmallVec<[Value; 4]> =
                    refs.into_iter().map(|v| self.relocate(v)).collect();
                self.to.cells[cursor]
                    .object
                    .refs_mut()
                    .copy_from_slice(&moved);
            }
            cursor += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(heap: &Heap, car: Value, cdr: Value) -> Value {
        heap.alloc_with(ManagedObject::PAIR_SIZE, || ManagedObject::Pair([car, cdr]))
            .unwrap()
    }

    #[test]
    fn alloc_bumps_usage() {
        let heap = Heap::new();
        assert_eq!(heap.bytes_used(), 0);
        pair(&heap, Value::NIL, Value::NIL);
        assert_eq!(heap.bytes_used(), ManagedObject::PAIR_SIZE);
        assert_eq!(heap.stats().bytes_allocated, ManagedObject::PAIR_SIZE);
    }

    #[test]
    fn unrooted_objects_are_discarded() {
        let heap = Heap::new();
        for _ in 0..10 {
            pair(&heap, Value::NIL, Value::NIL);
        }
        heap.collect();
        assert_eq!(heap.bytes_used(), 0);
        assert_eq!(heap.object_count(), 0);
        assert_eq!(heap.stats().collections, 1);
    }

    #[test]
    fn rooted_chain_survives() {
        let heap = Heap::new();
        let _garbage = pair(&heap, Value::NIL, Value::NIL);
        let tail = pair(&heap, Value::fixnum(2), Value::NIL);
        let head = pair(&heap, Value::fixnum(1), tail);
        let root = heap.roots.borrow_mut().put(head);

        heap.collect();

        let head = heap.roots.borrow().get(root);
        assert_eq!(head.as_obj_id(), ObjectId(0));
        let ManagedObject::Pair([car, cdr]) = *heap.object(head) else {
            panic!("expected pair");
        };
        assert_eq!(car, Value::fixnum(1));
        assert!(matches!(*heap.object(cdr), ManagedObject::Pair([v, _]) if v == Value::fixnum(2)));
        assert_eq!(heap.stats().objects_copied, 2);
        assert_eq!(heap.bytes_used(), 2 * ManagedObject::PAIR_SIZE);
    }

    #[test]
    fn shared_objects_are_copied_once() {
        let heap = Heap::new();
        let shared = pair(&heap, Value::NIL, Value::NIL);
        let a = pair(&heap, shared, shared);
        heap.roots.borrow_mut().put(a);
        heap.roots.borrow_mut().put(shared);

        heap.collect();
        assert_eq!(heap.object_count(), 2);
    }

    #[test]
    fn exhaustion_after_collection_is_reported() {
        let heap = Heap::with_config(HeapConfig::with_semispace_size(4096));
        let mut last = Value::NIL;
        let err = loop {
            match heap.reserve(ManagedObject::PAIR_SIZE) {
                Ok(()) => {
                    last = heap.push(ManagedObject::Pair([Value::NIL, last]));
                    heap.roots.borrow_mut().put(last);
                }
                Err(e) => break e,
            }
        };
        assert_eq!(
            err,
            HeapError::OutOfMemory {
                requested: ManagedObject::PAIR_SIZE,
                capacity: 4096
            }
        );
        assert_eq!(heap.bytes_used(), 4096);
    }

    #[test]
    fn stress_mode_collects_every_allocation() {
        let mut config = HeapConfig::default();
        config.stress = true;
        let heap = Heap::with_config(config);
        pair(&heap, Value::NIL, Value::NIL);
        pair(&heap, Value::NIL, Value::NIL);
        assert_eq!(heap.stats().collections, 2);
        assert_eq!(heap.object_count(), 1);
    }
}

//! Symbol-keyed chained hash dictionary.
//!
//! Buckets live in a vector whose length is a power of two. Each bucket is a
//! chain of link pairs `(entry . next)`, where `entry` is the pair
//! `(key . value)` handed out by lookups. The table grows to twice its size
//! when the live count exceeds 150% of the bucket count, and shrinks to half
//! when it falls under 25%, never below [`MIN_CAPACITY`] buckets.
//!
//! Rehashing reuses the existing link pairs, so the only allocation a resize
//! makes is the new bucket vector.

use super::expect_type;
use super::pair::{car, cdr, set_cdr};
use super::symbol::{symbol_eq, symbol_hash};
use super::vector::{vector_len, with_slots, with_slots_mut};
use crate::core::object::ManagedObject;
use crate::core::{Handle, Heap};
use crate::errors::{Result, fatal};
use sanya_core::{ObjectType, Value};
use tracing::trace;

pub const MIN_CAPACITY: usize = 8;

/// Load factor thresholds, in percent of the bucket count.
const GROW_LOAD: usize = 150;
const SHRINK_LOAD: usize = 25;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Dict {
    pub buckets: Value,
    pub len: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupMode {
    /// Find an existing entry.
    Plain,
    /// Find an entry, inserting `(key . nil)` if there is none.
    CreateOnAbsent,
    /// Find an entry and unlink it from the table.
    DeleteOnFound,
}

#[track_caller]
pub(crate) fn dict(heap: &Heap, value: Value) -> Dict {
    match &*heap.object(value) {
        ManagedObject::Dict(d) => *d,
        _ => fatal("expected a dict"),
    }
}

#[track_caller]
fn update(heap: &Heap, value: Value, f: impl FnOnce(&mut Dict)) {
    match &mut *heap.object_mut(value) {
        ManagedObject::Dict(d) => f(d),
        _ => fatal("expected a dict"),
    }
}

#[inline]
fn bucket_of(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (hash as usize) & (capacity - 1)
}

/// Where a key sits in its chain.
struct ChainPosition {
    bucket: usize,
    prev: Option<Value>,
    link: Option<Value>,
}

fn find_in_chain(heap: &Heap, table: Dict, key: Value) -> ChainPosition {
    let capacity = vector_len(heap, table.buckets);
    let bucket = bucket_of(symbol_hash(heap, key), capacity);
    let mut prev = None;
    let mut link = with_slots(heap, table.buckets, |slots| slots[bucket]);
    while !link.is_nil() {
        let entry = car(heap, link);
        if symbol_eq(heap, car(heap, entry), key) {
            return ChainPosition {
                bucket,
                prev,
                link: Some(link),
            };
        }
        prev = Some(link);
        link = cdr(heap, link);
    }
    ChainPosition {
        bucket,
        prev,
        link: None,
    }
}

/// Call `f` with every entry pair, bucket by bucket.
pub(crate) fn for_each_entry(heap: &Heap, value: Value, mut f: impl FnMut(Value)) {
    let table = dict(heap, value);
    let capacity = vector_len(heap, table.buckets);
    for bucket in 0..capacity {
        let mut link = with_slots(heap, table.buckets, |slots| slots[bucket]);
        while !link.is_nil() {
            f(car(heap, link));
            link = cdr(heap, link);
        }
    }
}

impl Heap {
    /// Allocate an empty dictionary with the minimum bucket count.
    pub fn dict(&self) -> Result<Handle<'_>> {
        let buckets = self.vector(MIN_CAPACITY, &Handle::nil(self))?;
        let value = self.alloc_with(ManagedObject::DICT_SIZE, || {
            ManagedObject::Dict(Dict {
                buckets: buckets.get(),
                len: 0,
            })
        })?;
        Ok(Handle::new(self, value))
    }
}

#[derive(Clone, Copy)]
pub struct DictRef<'a, 'h> {
    handle: &'a Handle<'h>,
}

impl<'h> Handle<'h> {
    pub fn as_dict(&self) -> Result<DictRef<'_, 'h>> {
        expect_type(self, ObjectType::Dict)?;
        Ok(DictRef { handle: self })
    }
}

impl<'h> DictRef<'_, 'h> {
    fn heap(&self) -> &'h Heap {
        self.handle.heap()
    }

    fn table(&self) -> Dict {
        dict(self.heap(), self.handle.get())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.table().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        vector_len(self.heap(), self.table().buckets)
    }

    /// Look up `key`, returning its `(key . value)` entry pair.
    ///
    /// Under [`LookupMode::CreateOnAbsent`] the result is always `Some`.
    /// Under [`LookupMode::DeleteOnFound`] the returned entry is no longer
    /// in the table.
    pub fn lookup(&self, key: &Handle<'_>, mode: LookupMode) -> Result<Option<Handle<'h>>> {
        expect_type(key, ObjectType::Symbol)?;
        let heap = self.heap();
        let table = self.table();
        let found = find_in_chain(heap, table, key.get());

        match (mode, found.link) {
            (LookupMode::Plain, link) | (LookupMode::CreateOnAbsent, link @ Some(_)) => {
                Ok(link.map(|link| Handle::new(heap, car(heap, link))))
            }
            (LookupMode::DeleteOnFound, None) => Ok(None),
            (LookupMode::DeleteOnFound, Some(link)) => {
                let next = cdr(heap, link);
                match found.prev {
                    Some(prev) => set_cdr(heap, prev, next),
                    None => with_slots_mut(heap, table.buckets, |slots| {
                        slots[found.bucket] = next;
                    }),
                }
                update(heap, self.handle.get(), |d| d.len -= 1);
                let entry = Handle::new(heap, car(heap, link));

                let (len, capacity) = (self.len(), self.capacity());
                if len * 100 < capacity * SHRINK_LOAD && capacity > MIN_CAPACITY {
                    self.rehash(capacity / 2)?;
                }
                Ok(Some(entry))
            }
            (LookupMode::CreateOnAbsent, None) => {
                let nil = Handle::nil(heap);
                let entry = heap.pair(key, &nil)?;
                let link = heap.pair(&entry, &nil)?;

                // Both allocations may have collected: re-read the table.
                let table = self.table();
                let bucket = bucket_of(symbol_hash(heap, key.get()), self.capacity());
                let head = with_slots(heap, table.buckets, |slots| slots[bucket]);
                set_cdr(heap, link.get(), head);
                with_slots_mut(heap, table.buckets, |slots| slots[bucket] = link.get());
                update(heap, self.handle.get(), |d| d.len += 1);

                let (len, capacity) = (self.len(), self.capacity());
                if len * 100 > capacity * GROW_LOAD {
                    self.rehash(capacity * 2)?;
                }
                Ok(Some(entry))
            }
        }
    }

    /// Create-on-absent lookup; the entry always exists afterwards.
    pub fn entry(&self, key: &Handle<'_>) -> Result<Handle<'h>> {
        match self.lookup(key, LookupMode::CreateOnAbsent)? {
            Some(entry) => Ok(entry),
            None => fatal("create-on-absent lookup produced no entry"),
        }
    }

    pub fn get(&self, key: &Handle<'_>) -> Result<Option<Handle<'h>>> {
        let entry = self.lookup(key, LookupMode::Plain)?;
        Ok(entry.map(|e| Handle::new(self.heap(), cdr(self.heap(), e.get()))))
    }

    pub fn contains(&self, key: &Handle<'_>) -> Result<bool> {
        Ok(self.lookup(key, LookupMode::Plain)?.is_some())
    }

    pub fn insert(&self, key: &Handle<'_>, value: &Handle<'_>) -> Result<()> {
        let entry = self.entry(key)?;
        set_cdr(self.heap(), entry.get(), value.get());
        Ok(())
    }

    /// Remove `key`, returning the value it was bound to.
    pub fn remove(&self, key: &Handle<'_>) -> Result<Option<Handle<'h>>> {
        let entry = self.lookup(key, LookupMode::DeleteOnFound)?;
        Ok(entry.map(|e| Handle::new(self.heap(), cdr(self.heap(), e.get()))))
    }

    /// Relink every chain into a fresh bucket vector of `capacity` buckets.
    fn rehash(&self, capacity: usize) -> Result<()> {
        let heap = self.heap();
        let fresh = heap.vector(capacity, &Handle::nil(heap))?;

        // No allocation from here on: raw values stay valid.
        let old = self.table().buckets;
        let fresh_value = fresh.get();
        let heads: Vec<Value> = with_slots(heap, old, |slots| slots.to_vec());
        for head in heads {
            let mut link = head;
            while !link.is_nil() {
                let next = cdr(heap, link);
                let bucket = bucket_of(symbol_hash(heap, car(heap, car(heap, link))), capacity);
                let chain = with_slots(heap, fresh_value, |slots| slots[bucket]);
                set_cdr(heap, link, chain);
                with_slots_mut(heap, fresh_value, |slots| slots[bucket] = link);
                link = next;
            }
        }
        update(heap, self.handle.get(), |d| d.buckets = fresh_value);
        trace!(capacity, len = self.len(), "dict rehashed");
        Ok(())
    }
}

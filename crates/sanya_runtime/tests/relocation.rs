mod common;

use common::{fixnum_list, garbage, init_tracing, small_heap};
use sanya_runtime::{Handle, Heap, HeapError, ObjectType, Value};

#[test]
fn long_chain_survives_relocation() {
    init_tracing();
    let heap = Heap::new();
    garbage(&heap, 10);
    let list = fixnum_list(&heap, 0..100);
    let printed = list.to_string();
    let before = list.get();

    heap.collect();

    assert_ne!(list.get(), before);
    assert_eq!(list.to_string(), printed);
    assert!(printed.starts_with("(0 1 2 "));
    assert!(printed.ends_with(" 98 99)"));
    assert_eq!(heap.object_count(), 100);
    assert_eq!(heap.stats().objects_copied, 100);
}

#[test]
fn self_referential_pair_survives() {
    init_tracing();
    let heap = Heap::new();
    garbage(&heap, 1);
    let nil = Handle::nil(&heap);
    let p = heap.pair(&nil, &nil).unwrap();
    p.as_pair().unwrap().set_car(&p);

    heap.collect();

    assert_eq!(heap.object_count(), 1);
    assert_eq!(p.as_pair().unwrap().car().get(), p.get());
    assert!(p.as_pair().unwrap().cdr().is_nil());
}

#[test]
fn mutual_cycle_survives() {
    init_tracing();
    let heap = Heap::new();
    let nil = Handle::nil(&heap);
    let a = heap.pair(&Handle::new(&heap, Value::fixnum(1)), &nil).unwrap();
    let b = heap.pair(&Handle::new(&heap, Value::fixnum(2)), &a).unwrap();
    a.as_pair().unwrap().set_cdr(&b);
    drop(b);

    heap.collect();
    heap.collect();

    let b = a.as_pair().unwrap().cdr();
    assert_eq!(b.as_pair().unwrap().car().get(), Value::fixnum(2));
    assert_eq!(b.as_pair().unwrap().cdr().get(), a.get());
    assert_eq!(heap.object_count(), 2);
}

#[test]
fn root_set_tracks_heap_references_only() {
    init_tracing();
    let heap = Heap::new();
    let mut h = Handle::new(&heap, Value::fixnum(3));
    assert!(!h.is_rooted());
    assert_eq!(heap.root_count(), 0);

    let nil = Handle::nil(&heap);
    let pair = heap.pair(&nil, &nil).unwrap();
    h.assign(&pair);
    drop(pair);
    assert!(h.is_rooted());
    assert_eq!(heap.root_count(), 1);

    h.set(Value::NIL);
    assert!(!h.is_rooted());
    assert_eq!(heap.root_count(), 0);

    heap.collect();
    assert_eq!(heap.object_count(), 0);
}

#[test]
fn end_to_end_printing_is_stable_across_collection() {
    init_tracing();
    let heap = Heap::new();
    let a = heap.symbol("a").unwrap();
    let list = heap.pair(&a, &Handle::nil(&heap)).unwrap();
    let zero = Handle::new(&heap, Value::fixnum(0));
    let vector = heap.vector(3, &zero).unwrap();
    drop(a);

    assert_eq!(list.to_string(), "(a)");
    assert_eq!(vector.to_string(), "#(0 0 0)");

    heap.collect();

    assert_eq!(list.to_string(), "(a)");
    assert_eq!(vector.to_string(), "#(0 0 0)");
    assert_eq!(list.type_of(), ObjectType::Pair);
}

#[test]
fn shared_structure_stays_shared() {
    init_tracing();
    let heap = Heap::new();
    let shared = heap.symbol("s").unwrap();
    let left = heap.pair(&shared, &Handle::nil(&heap)).unwrap();
    let right = heap.pair(&shared, &Handle::nil(&heap)).unwrap();
    drop(shared);

    heap.collect();

    let l = left.as_pair().unwrap().car();
    let r = right.as_pair().unwrap().car();
    assert_eq!(l.get(), r.get());
    assert_eq!(heap.object_count(), 3);
}

#[test]
fn live_bytes_match_usage_after_collection() {
    init_tracing();
    let heap = Heap::new();
    garbage(&heap, 50);
    let _keep = fixnum_list(&heap, 0..5);
    let allocated = heap.bytes_used();

    heap.collect();

    let stats = heap.stats();
    assert_eq!(stats.collections, 1);
    assert_eq!(stats.live_bytes, heap.bytes_used());
    assert_eq!(stats.bytes_allocated, allocated);
    assert!(heap.bytes_used() < allocated);
}

#[test]
fn exhaustion_is_recoverable() {
    let heap = small_heap(4096);
    let nil = Handle::nil(&heap);
    let mut kept = Vec::new();
    let err = loop {
        match heap.pair(&nil, &nil) {
            Ok(p) => kept.push(p),
            Err(e) => break e,
        }
    };
    assert!(matches!(err, HeapError::OutOfMemory { capacity: 4096, .. }));
    assert_eq!(kept.len(), 4096 / 32);

    kept.truncate(10);
    assert!(heap.pair(&nil, &nil).is_ok());
}

#[test]
fn oversized_requests_fail_without_growing() {
    let heap = small_heap(4096);
    let nil = Handle::nil(&heap);
    assert!(matches!(
        heap.vector(1 << 20, &nil),
        Err(HeapError::OutOfMemory { .. })
    ));
    assert_eq!(heap.capacity(), 4096);
}

#[test]
fn heaps_are_independent() {
    init_tracing();
    let first = Heap::new();
    let second = Heap::new();
    let _x = first.symbol("x").unwrap();
    second.collect();
    assert_eq!(first.object_count(), 1);
    assert_eq!(second.object_count(), 0);
    assert_eq!(second.root_count(), 0);
}

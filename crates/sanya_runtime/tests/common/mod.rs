#![allow(dead_code)]

use sanya_runtime::{Handle, Heap, HeapConfig, Value};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness; `RUST_LOG` filters it.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn stress_heap() -> Heap {
    init_tracing();
    Heap::with_config(HeapConfig {
        stress: true,
        ..HeapConfig::default()
    })
}

pub fn small_heap(bytes: usize) -> Heap {
    init_tracing();
    Heap::with_config(HeapConfig::with_semispace_size(bytes))
}

/// Build a proper list of fixnums.
pub fn fixnum_list<'h>(heap: &'h Heap, items: impl DoubleEndedIterator<Item = i64>) -> Handle<'h> {
    let mut list = Handle::nil(heap);
    for i in items.rev() {
        let item = Handle::new(heap, Value::fixnum(i));
        let cell = heap.pair(&item, &list).unwrap();
        list.assign(&cell);
    }
    list
}

/// Allocate `n` unreachable pairs.
pub fn garbage(heap: &Heap, n: usize) {
    let nil = Handle::nil(heap);
    for _ in 0..n {
        heap.pair(&nil, &nil).unwrap();
    }
}

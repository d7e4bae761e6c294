mod common;

use common::{init_tracing, stress_heap};
use sanya_runtime::{Builder, Heap, HeapError};

#[test]
fn reader_style_construction() {
    init_tracing();
    let heap = Heap::new();
    let b = Builder::new(&heap);

    // (define x '(1 #t . #f))
    let tail = b.pair(b.boolean(true), b.boolean(false)).unwrap();
    let data = b.pair(b.fixnum("1").unwrap(), tail).unwrap();
    let quoted = b.quoted(data).unwrap();
    let rest = b.pair(quoted, b.nil()).unwrap();
    let rest = b.pair(b.symbol("x").unwrap(), rest).unwrap();
    let form = b.pair(b.symbol("define").unwrap(), rest).unwrap();

    assert_eq!(form.to_string(), "(define x (quote (1 #t . #f)))");
    heap.collect();
    assert_eq!(form.to_string(), "(define x (quote (1 #t . #f)))");
}

#[test]
fn builder_symbols_are_interned() {
    init_tracing();
    let heap = Heap::new();
    let b = Builder::new(&heap);
    let a = b.symbol("a").unwrap();
    let again = b.symbol("a").unwrap();
    assert_eq!(a.get(), again.get());
    assert!(a.as_symbol().unwrap().is_interned());
}

#[test]
fn vector_literal_under_stress() {
    let heap = stress_heap();
    let b = Builder::new(&heap);
    let mut list = b.nil();
    for i in (0..20).rev() {
        list = b.pair(b.fixnum(&i.to_string()).unwrap(), list).unwrap();
    }
    let vector = b.vector_from_list(list).unwrap();
    let expected: Vec<String> = (0..20).map(|i| i.to_string()).collect();
    assert_eq!(vector.to_string(), format!("#({})", expected.join(" ")));
}

#[test]
fn errors_surface_as_values() {
    init_tracing();
    let heap = Heap::new();
    let b = Builder::new(&heap);
    assert!(matches!(b.fixnum(""), Err(HeapError::InvalidFixnum(_))));
    assert!(matches!(b.flonum("3.14"), Err(HeapError::NotImplemented(_))));
    let improper = b.pair(b.nil(), b.fixnum("1").unwrap()).unwrap();
    assert_eq!(b.vector_from_list(improper).unwrap_err(), HeapError::ImproperList);
}

//! Construction interface for reader front ends.
//!
//! Every value a builder returns lives in its handle zone, so a reader can
//! hold on to intermediate nodes without managing handles itself. Dropping
//! the builder releases them all.

use crate::core::{Handle, HandleZone, Heap};
use crate::errors::{HeapError, Result};
use crate::types::pair::{car, cdr};
use crate::types::vector::with_slots_mut;
use sanya_core::Value;
use std::num::IntErrorKind;

pub struct Builder<'h> {
    heap: &'h Heap,
    zone: HandleZone<'h>,
}

impl<'h> Builder<'h> {
    pub fn new(heap: &'h Heap) -> Self {
        Self {
            heap,
            zone: HandleZone::new(heap),
        }
    }

    pub fn heap(&self) -> &'h Heap {
        self.heap
    }

    pub fn zone(&self) -> &HandleZone<'h> {
        &self.zone
    }

    fn keep(&self, handle: Handle<'h>) -> &Handle<'h> {
        self.zone.adopt(handle)
    }

    pub fn nil(&self) -> &Handle<'h> {
        self.zone.alloc(Value::NIL)
    }

    pub fn boolean(&self, value: bool) -> &Handle<'h> {
        self.zone.alloc(Value::boolean(value))
    }

    /// Parse a base-10 integer literal.
    pub fn fixnum(&self, text: &str) -> Result<&Handle<'h>> {
        let n: i64 = text.parse().map_err(|e: std::num::ParseIntError| match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                HeapError::FixnumOverflow(text.to_owned())
            }
            _ => HeapError::InvalidFixnum(text.to_owned()),
        })?;
        let value =
            Value::checked_fixnum(n).ok_or_else(|| HeapError::FixnumOverflow(text.to_owned()))?;
        Ok(self.zone.alloc(value))
    }

    pub fn flonum(&self, _text: &str) -> Result<&Handle<'h>> {
        Err(HeapError::NotImplemented("flonum literals"))
    }

    pub fn string(&self, _text: &str) -> Result<&Handle<'h>> {
        Err(HeapError::NotImplemented("string literals"))
    }

    /// The interned symbol named `name`.
    pub fn symbol(&self, name: &str) -> Result<&Handle<'h>> {
        Ok(self.keep(self.heap.intern_str(name)?))
    }

    pub fn pair(&self, car: &Handle<'_>, cdr: &Handle<'_>) -> Result<&Handle<'h>> {
        Ok(self.keep(self.heap.pair(car, cdr)?))
    }

    /// Build a vector holding the elements of a proper list.
    pub fn vector_from_list(&self, list: &Handle<'_>) -> Result<&Handle<'h>> {
        let heap = self.heap;
        let len = proper_length(heap, list.get())?;
        let vector = heap.vector(len, &Handle::nil(heap))?;

        // The allocation may have moved the list; walk it from the handle.
        let mut items = Vec::with_capacity(len);
        let mut rest = list.get();
        for _ in 0..len {
            items.push(car(heap, rest));
            rest = cdr(heap, rest);
        }
        with_slots_mut(heap, vector.get(), |slots| slots.copy_from_slice(&items));
        Ok(self.keep(vector))
    }

    pub fn quoted(&self, content: &Handle<'_>) -> Result<&Handle<'h>> {
        self.wrap("quote", content)
    }

    pub fn quasiquoted(&self, content: &Handle<'_>) -> Result<&Handle<'h>> {
        self.wrap("quasiquote", content)
    }

    pub fn unquoted(&self, content: &Handle<'_>) -> Result<&Handle<'h>> {
        self.wrap("unquote", content)
    }

    pub fn splicing(&self, content: &Handle<'_>) -> Result<&Handle<'h>> {
        self.wrap("unquote-splicing", content)
    }

    /// `(head content)`
    fn wrap(&self, head: &str, content: &Handle<'_>) -> Result<&Handle<'h>> {
        let head = self.heap.intern_str(head)?;
        let tail = self.heap.pair(content, &Handle::nil(self.heap))?;
        self.pair(&head, &tail)
    }
}

/// Length of a proper list, or `ImproperList`.
///
/// A proper list cannot have more cells than the heap has objects, which
/// bounds the walk on cyclic input.
fn proper_length(heap: &Heap, list: Value) -> Result<usize> {
    let limit = heap.object_count();
    let mut len = 0;
    let mut rest = list;
    while !rest.is_nil() {
        if !heap.is_pair(rest) || len >= limit {
            return Err(HeapError::ImproperList);
        }
        len += 1;
        rest = cdr(heap, rest);
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals() {
        let heap = Heap::new();
        let b = Builder::new(&heap);
        assert_eq!(b.fixnum("-17").unwrap().get(), Value::fixnum(-17));
        assert_eq!(b.boolean(true).get(), Value::TRUE);
        assert!(b.nil().is_nil());
        assert!(matches!(b.fixnum("12x"), Err(HeapError::InvalidFixnum(s)) if s == "12x"));
    }

    #[test]
    fn fixnum_range_is_enforced() {
        let heap = Heap::new();
        let b = Builder::new(&heap);
        let max = sanya_core::value::FIXNUM_MAX.to_string();
        assert_eq!(b.fixnum(&max).unwrap().get().as_i64(), sanya_core::value::FIXNUM_MAX);
        let too_big = (sanya_core::value::FIXNUM_MAX as i128 + 1).to_string();
        assert!(matches!(b.fixnum(&too_big), Err(HeapError::FixnumOverflow(_))));
        assert!(matches!(
            b.fixnum("99999999999999999999999"),
            Err(HeapError::FixnumOverflow(_))
        ));
    }

    #[test]
    fn unsupported_literals() {
        let heap = Heap::new();
        let b = Builder::new(&heap);
        assert!(matches!(b.flonum("1.5"), Err(HeapError::NotImplemented(_))));
        assert!(matches!(b.string("hi"), Err(HeapError::NotImplemented(_))));
    }

    #[test]
    fn quote_forms() {
        let heap = Heap::new();
        let b = Builder::new(&heap);
        let x = b.symbol("x").unwrap();
        assert_eq!(b.quoted(x).unwrap().to_string(), "(quote x)");
        assert_eq!(b.quasiquoted(x).unwrap().to_string(), "(quasiquote x)");
        assert_eq!(b.unquoted(x).unwrap().to_string(), "(unquote x)");
        assert_eq!(b.splicing(x).unwrap().to_string(), "(unquote-splicing x)");
    }

    #[test]
    fn vector_from_proper_list() {
        let heap = Heap::new();
        let b = Builder::new(&heap);
        let tail = b.pair(b.fixnum("2").unwrap(), b.nil()).unwrap();
        let list = b.pair(b.fixnum("1").unwrap(), tail).unwrap();
        assert_eq!(b.vector_from_list(list).unwrap().to_string(), "#(1 2)");
        assert_eq!(b.vector_from_list(b.nil()).unwrap().to_string(), "#()");
    }

    #[test]
    fn vector_from_improper_list() {
        let heap = Heap::new();
        let b = Builder::new(&heap);
        let dotted = b.pair(b.fixnum("1").unwrap(), b.fixnum("2").unwrap()).unwrap();
        assert_eq!(b.vector_from_list(dotted).unwrap_err(), HeapError::ImproperList);

        let cyclic = b.pair(b.nil(), b.nil()).unwrap();
        cyclic.as_pair().unwrap().set_cdr(cyclic);
        assert_eq!(b.vector_from_list(cyclic).unwrap_err(), HeapError::ImproperList);
    }

    #[test]
    fn builder_releases_roots() {
        let heap = Heap::new();
        {
            let b = Builder::new(&heap);
            let x = b.symbol("x").unwrap();
            b.quoted(x).unwrap();
            assert!(heap.root_count() > 1);
        }
        // Only the symbol table remains.
        assert_eq!(heap.root_count(), 1);
    }
}

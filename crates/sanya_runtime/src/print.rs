//! Textual debug writer.
//!
//! Output follows the usual Lisp conventions: `()` for nil, `#t`/`#f`,
//! dotted tails for improper lists and `#(...)` for vectors. Printing visits
//! at most a fixed number of nodes; past that it writes `...` and stops, so
//! cyclic structures print in bounded time.

use crate::core::{Handle, Heap};
use crate::types::dict::{dict, for_each_entry};
use crate::types::growable::growable;
use crate::types::pair::{car, cdr};
use crate::types::symbol::with_symbol;
use crate::types::vector::with_slots;
use sanya_core::{ObjectType, Value};
use std::fmt::{self, Write};

/// Nodes visited before printing gives up.
pub const DEFAULT_NODE_BUDGET: usize = 10_000;

pub struct Printer<'h> {
    heap: &'h Heap,
    budget: usize,
}

impl<'h> Printer<'h> {
    pub fn new(heap: &'h Heap) -> Self {
        Self::with_budget(heap, DEFAULT_NODE_BUDGET)
    }

    pub fn with_budget(heap: &'h Heap, budget: usize) -> Self {
        Self { heap, budget }
    }

    pub fn print(mut self, value: Value) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write(&mut out, value);
        out
    }

    /// Spend one node; false once the budget is gone.
    fn spend(&mut self) -> bool {
        match self.budget.checked_sub(1) {
            Some(rest) => {
                self.budget = rest;
                true
            }
            None => false,
        }
    }

    /// Write `value`, walking nested structure with an explicit work stack
    /// so that nesting depth is bounded by memory, not by the call stack.
    pub fn write(&mut self, out: &mut impl Write, value: Value) -> fmt::Result {
        let heap = self.heap;
        let mut stack = vec![Task::Value(value)];
        while let Some(task) = stack.pop() {
            match task {
                Task::Text(text) => out.write_str(text)?,
                Task::Value(value) => {
                    if !self.spend() {
                        out.write_str("...")?;
                        continue;
                    }
                    match heap.type_of(value) {
                        ObjectType::Nil => out.write_str("()")?,
                        ObjectType::Fixnum => {
                            out.write_str(itoa::Buffer::new().format(value.as_i64()))?
                        }
                        ObjectType::Boolean => {
                            out.write_str(if value.as_bool() { "#t" } else { "#f" })?
                        }
                        ObjectType::Tag => write!(out, "#<tag {}>", value.as_tag())?,
                        ObjectType::Symbol => with_symbol(heap, value, |sym| {
                            out.write_str(&String::from_utf8_lossy(&sym.bytes))
                        })?,
                        ObjectType::Pair => {
                            out.write_char('(')?;
                            stack.push(Task::ListRest(cdr(heap, value)));
                            stack.push(Task::Value(car(heap, value)));
                        }
                        ObjectType::Vector => {
                            let slots = with_slots(heap, value, <[Value]>::to_vec);
                            push_seq(&mut stack, out, "#(", &slots, ")")?;
                        }
                        ObjectType::GrowableVector => {
                            let state = growable(heap, value);
                            let live =
                                with_slots(heap, state.vector, |slots| slots[..state.len].to_vec());
                            push_seq(&mut stack, out, "#g(", &live, ")")?;
                        }
                        ObjectType::Dict => {
                            let mut entries = Vec::with_capacity(dict(heap, value).len);
                            for_each_entry(heap, value, |entry| entries.push(entry));
                            out.write_str("#<dict")?;
                            stack.push(Task::Text(">"));
                            for entry in entries.into_iter().rev() {
                                stack.push(Task::Value(entry));
                                stack.push(Task::Text(" "));
                            }
                        }
                    }
                }
                Task::ListRest(rest) => {
                    if rest.is_nil() {
                        out.write_char(')')?;
                    } else if !heap.is_pair(rest) {
                        out.write_str(" . ")?;
                        stack.push(Task::Text(")"));
                        stack.push(Task::Value(rest));
                    } else if !self.spend() {
                        out.write_str(" ...)")?;
                    } else {
                        out.write_char(' ')?;
                        stack.push(Task::ListRest(cdr(heap, rest)));
                        stack.push(Task::Value(car(heap, rest)));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Pending printer work, popped last-in first-out.
enum Task {
    Value(Value),
    Text(&'static str),
    /// The cdr of a list cell whose opening parenthesis is already written.
    ListRest(Value),
}

/// Write `open` and queue `items` separated by spaces, then `close`.
fn push_seq(
    stack: &mut Vec<Task>,
    out: &mut impl Write,
    open: &str,
    items: &[Value],
    close: &'static str,
) -> fmt::Result {
    out.write_str(open)?;
    stack.push(Task::Text(close));
    for (i, item) in items.iter().enumerate().rev() {
        stack.push(Task::Value(*item));
        if i > 0 {
            stack.push(Task::Text(" "));
        }
    }
    Ok(())
}

impl Heap {
    pub fn print(&self, value: Value) -> String {
        Printer::new(self).print(value)
    }

    pub fn write_value(&self, out: &mut impl Write, value: Value) -> fmt::Result {
        Printer::new(self).write(out, value)
    }
}

impl fmt::Display for Handle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.heap().write_value(f, self.get())
    }
}

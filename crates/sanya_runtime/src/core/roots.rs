//! The root set: every external reference the collector must update.
//!
//! Roots form a circular doubly-linked list threaded through a node table
//! owned by the heap. Node 0 is a permanent sentinel, so insertion and
//! removal never special-case the ends. Freed nodes are recycled through a
//! free list; the collector walks only linked nodes.

use crate::errors::fatal;
use sanya_core::Value;

const SENTINEL: u32 = 0;

/// Position of a registered reference in the root set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootId(u32);

#[derive(Clone, Copy, Debug)]
struct RootNode {
    value: Value,
    prev: u32,
    next: u32,
    linked: bool,
}

impl RootNode {
    const UNLINKED: RootNode = RootNode {
        value: Value::NIL,
        prev: SENTINEL,
        next: SENTINEL,
        linked: false,
    };
}

pub(crate) struct RootSet {
    nodes: Vec<RootNode>,
    free: Vec<u32>,
    len: usize,
}

impl RootSet {
    pub fn new() -> Self {
        let sentinel = RootNode {
            linked: true,
            ..RootNode::UNLINKED
        };
        Self {
            nodes: vec![sentinel],
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of linked roots, sentinel excluded.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Link a new root right after the sentinel.
    pub fn put(&mut self, value: Value) -> RootId {
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                let Ok(id) = u32::try_from(self.nodes.len()) else {
                    fatal("root set exhausted");
                };
                self.nodes.push(RootNode::UNLINKED);
                id
            }
        };

        let first = self.nodes[SENTINEL as usize].next;
        self.nodes[id as usize] = RootNode {
            value,
            prev: SENTINEL,
            next: first,
            linked: true,
        };
        self.nodes[first as usize].prev = id;
        self.nodes[SENTINEL as usize].next = id;
        self.len += 1;
        RootId(id)
    }

    /// Unlink a root. Unlinking an already unlinked root does nothing.
    pub fn unlink(&mut self, id: RootId) {
        if id.0 == SENTINEL {
            fatal("attempt to unlink the root sentinel");
        }
        let node = self.nodes[id.0 as usize];
        if !node.linked {
            return;
        }
        self.nodes[node.prev as usize].next = node.next;
        self.nodes[node.next as usize].prev = node.prev;
        self.nodes[id.0 as usize] = RootNode::UNLINKED;
        self.free.push(id.0);
        self.len -= 1;
    }

    #[inline]
    pub fn get(&self, id: RootId) -> Value {
        let node = &self.nodes[id.0 as usize];
        debug_assert!(node.linked, "read through unlinked root {id:?}");
        node.value
    }

    #[inline]
    pub fn set(&mut self, id: RootId, value: Value) {
        let node = &mut self.nodes[id.0 as usize];
        debug_assert!(node.linked, "write through unlinked root {id:?}");
        node.value = value;
    }

    #[cfg(test)]
    pub fn is_linked(&self, id: RootId) -> bool {
        id.0 != SENTINEL && self.nodes.get(id.0 as usize).is_some_and(|n| n.linked)
    }

    /// Visit every linked root, most recently linked first.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Value)) {
        let mut it = self.nodes[SENTINEL as usize].next;
        while it != SENTINEL {
            let node = &mut self.nodes[it as usize];
            f(&mut node.value);
            it = node.next;
        }
    }
}

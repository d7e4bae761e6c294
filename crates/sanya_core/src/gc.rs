//! Garbage collection infrastructure - base types.

/// Slot index of a heap-allocated object in the active semispace.
///
/// Ids are only meaningful until the next collection, which renumbers
/// every surviving object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

//! Byte-string hashing shared by symbols and the symbol table.

use ahash::RandomState;
use std::hash::{BuildHasher, Hasher};

/// Fixed seeds keep symbol hashes stable across runs and heaps.
pub fn fast_hasher() -> RandomState {
    RandomState::with_seeds(0, 0, 0, 0)
}

/// Hash a symbol spelling.
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = fast_hasher().build_hasher();
    hasher.write(bytes);
    hasher.write_usize(bytes.len());
    hasher.finish()
}

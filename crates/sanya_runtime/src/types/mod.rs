//! Heap object kinds and their typed handle views.

pub mod dict;
pub mod growable;
pub mod pair;
pub mod symbol;
pub mod vector;

pub use dict::{DictRef, LookupMode};
pub use growable::GrowableVectorRef;
pub use pair::PairRef;
pub use symbol::SymbolRef;
pub use vector::VectorRef;

use crate::core::Handle;
use crate::errors::{HeapError, Result};
use sanya_core::ObjectType;

/// Check that `handle` currently refers to an object of kind `expected`.
pub(crate) fn expect_type(handle: &Handle<'_>, expected: ObjectType) -> Result<()> {
    let found = handle.heap().type_of(handle.get());
    if found == expected {
        Ok(())
    } else {
        Err(HeapError::TypeMismatch { expected, found })
    }
}

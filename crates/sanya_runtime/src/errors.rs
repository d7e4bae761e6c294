//! Error kinds surfaced at the public construction and lookup boundary.
//!
//! Contract violations and resource exhaustion are reported as
//! [`HeapError`]. Corruption of the heap's own bookkeeping is not
//! recoverable and goes through [`fatal`].

use sanya_core::ObjectType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    #[error("out of space: {requested} bytes requested, semispace holds {capacity}")]
    OutOfMemory { requested: usize, capacity: usize },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: ObjectType,
        found: ObjectType,
    },

    #[error("cannot hash {0}: contents are mutable")]
    Unhashable(ObjectType),

    #[error("{0} is not supported yet")]
    NotImplemented(&'static str),

    #[error("invalid fixnum literal {0:?}")]
    InvalidFixnum(String),

    #[error("fixnum literal {0} does not fit in a tagged word")]
    FixnumOverflow(String),

    #[error("expected a proper list")]
    ImproperList,
}

pub type Result<T, E = HeapError> = std::result::Result<T, E>;

/// Abort on a broken internal invariant.
#[cold]
#[track_caller]
pub(crate) fn fatal(what: &str) -> ! {
    let site = std::panic::Location::caller();
    tracing::error!(file = site.file(), line = site.line(), "SANYA::FATAL({what})");
    panic!("{site} -- SANYA::FATAL({what})");
}

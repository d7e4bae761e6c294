//! Sanya memory runtime.
//!
//! A semispace copying heap with relocation-safe handles and collection-aware
//! containers:
//! - [`Heap`] - the allocator, collector and root set, as one explicit context
//! - [`Handle`] - a rooted reference that follows its object across collections
//! - [`HandleZone`] - arena-owned handles for tree builders
//! - typed views over pairs, symbols, vectors, growable vectors and dicts
//! - interning, introspection and a debug printer
//! - [`Builder`] - the construction interface used by readers

pub mod builder;
pub mod config;
pub mod core;
pub mod errors;
mod intern;
mod introspect;
pub mod print;
pub mod types;

pub use builder::Builder;
pub use config::HeapConfig;
pub use crate::core::{GcStats, Handle, HandleZone, Heap};
pub use errors::{HeapError, Result};
pub use print::Printer;
pub use sanya_core::{ObjectType, Value};
pub use types::{DictRef, GrowableVectorRef, LookupMode, PairRef, SymbolRef, VectorRef};

//! Core types for the sanya memory layer.
//!
//! This crate contains the fundamental types that are independent of the heap:
//! - `Value` - Tagged reference word (immediates or heap references)
//! - `ObjectType` - Closed set of value kinds
//! - `ObjectId` - Slot index of a heap-allocated object
//! - `hash_bytes` - Deterministic byte-string hash used by symbols

pub mod gc;
pub mod symbol;
pub mod value;

pub use gc::ObjectId;
pub use symbol::hash_bytes;
pub use value::{ObjectType, Value};

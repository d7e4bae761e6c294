pub mod handle;
pub mod heap;
pub(crate) mod object;
pub(crate) mod roots;
pub mod zone;

pub use handle::Handle;
pub use heap::{GcStats, Heap};
pub use zone::HandleZone;

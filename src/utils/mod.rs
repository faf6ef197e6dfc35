//! Utility helpers: the generational arena and logging support.

pub mod allocator;
pub mod logging;

pub use allocator::{Arena, GenerationalId, SlotId};

//! Power-of-two buddy allocator.
//!
//! The buffer is modeled as an implicit perfect binary tree: the root
//! covers the whole buffer, each node's children cover its two halves, and
//! leaves cover one alignment unit each. Node states live in a packed
//! two-bit array owned by the allocator, the only heap ownership in the
//! crate.

pub mod allocator;
mod tree;

pub use allocator::BuddyAllocator;

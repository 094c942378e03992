//! # carve
//!
//! Region-based allocators that carve caller-provided byte buffers into
//! aligned sub-allocations. Five independent allocators are provided, each
//! operating inside a borrowed buffer of fixed capacity:
//!
//! - [`ArenaAllocator`] — monotonic bump allocation with tail resizing and
//!   scoped [`ArenaSavepoint`] rollback
//! - [`StackAllocator`] — LIFO allocation with per-allocation headers and
//!   out-of-order-free detection
//! - [`PoolAllocator`] — fixed-size chunks on an intrusive free list
//! - [`FreeListAllocator`] — sorted, coalescing free list with first-fit
//!   or best-fit placement
//! - [`BuddyAllocator`] — power-of-two blocks tracked in a packed binary
//!   tree
//!
//! The allocators never grow their buffer and are single-threaded; every
//! returned region is zero-filled and aligned as requested. Failures
//! return structured [`AllocError`] values and emit one diagnostic line
//! through `tracing`.
//!
//! ## Quick start
//!
//! ```
//! use carve::{ArenaAllocator, MemoryUsage};
//!
//! let mut backing = [0u8; 1024];
//! let mut arena = ArenaAllocator::new(&mut backing);
//!
//! let ptr = arena.alloc(128).expect("fits");
//! assert_eq!(ptr.as_ptr() as usize % 8, 0);
//! assert!(arena.used_memory() >= 128);
//!
//! arena.free_all();
//! assert_eq!(arena.used_memory(), 0);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]

pub mod arena;
pub mod buddy;
pub mod error;
pub mod freelist;
pub mod pool;
pub mod stack;
pub mod stats;
pub mod traits;
pub mod utils;

pub use arena::{ArenaAllocator, ArenaSavepoint};
pub use buddy::BuddyAllocator;
pub use error::{AllocError, AllocErrorKind, AllocResult};
pub use freelist::{AllocationPolicy, FreeListAllocator};
pub use pool::PoolAllocator;
pub use stack::{StackAllocator, MAX_STACK_ALIGNMENT};
pub use stats::{AllocatorStats, StatisticsProvider};
pub use traits::{MemoryUsage, Resettable};
pub use utils::DEFAULT_ALIGNMENT;

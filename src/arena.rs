//! Monotonic bump arena with scoped savepoints.
//!
//! The arena carves allocations out of a caller-provided buffer by bumping
//! an offset forward. Individual frees are no-ops; memory comes back
//! through [`ArenaAllocator::free_all`] or by unwinding an
//! [`ArenaSavepoint`].
//!
//! # Example
//! ```
//! use carve::ArenaAllocator;
//!
//! let mut backing = [0u8; 256];
//! let mut arena = ArenaAllocator::new(&mut backing);
//!
//! let ptr = arena.alloc(24).unwrap();
//! assert_eq!(ptr.as_ptr() as usize % 8, 0);
//!
//! let before = arena.offset();
//! {
//!     let mut scope = arena.savepoint();
//!     scope.alloc(100).unwrap();
//! }
//! assert_eq!(arena.offset(), before);
//! ```

use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use tracing::error;

use crate::error::{AllocError, AllocResult};
use crate::stats::{AllocatorStats, StatisticsProvider};
use crate::traits::{MemoryUsage, Resettable};
use crate::utils::{align_forward, DEFAULT_ALIGNMENT};

/// Bump allocator over a borrowed byte buffer.
///
/// The buffer is borrowed for the allocator's lifetime; returned pointers
/// are valid until the region they occupy is released by `free_all`, a
/// savepoint unwind, or a shrinking resize.
pub struct ArenaAllocator<'buf> {
    base: NonNull<u8>,
    capacity: usize,
    offset: usize,
    stats: AllocatorStats,
    _buffer: PhantomData<&'buf mut [u8]>,
}

impl<'buf> ArenaAllocator<'buf> {
    /// Binds the arena to `buffer`. The buffer contents are left as-is;
    /// allocations are zeroed individually on return.
    #[must_use]
    pub fn new(buffer: &'buf mut [u8]) -> Self {
        let capacity = buffer.len();
        // SAFETY: a slice pointer is never null.
        let base = unsafe { NonNull::new_unchecked(buffer.as_mut_ptr()) };
        Self {
            base,
            capacity,
            offset: 0,
            stats: AllocatorStats::default(),
            _buffer: PhantomData,
        }
    }

    /// Total capacity of the backing buffer.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Offset of the next free byte relative to the buffer base.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes still available at the tail of the buffer.
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.capacity - self.offset
    }

    #[inline]
    fn base_addr(&self) -> usize {
        self.base.as_ptr() as usize
    }

    #[inline]
    fn contains(&self, ptr: NonNull<u8>) -> bool {
        let addr = ptr.as_ptr() as usize;
        addr >= self.base_addr() && addr < self.base_addr() + self.capacity
    }

    /// Allocates `size` bytes at [`DEFAULT_ALIGNMENT`].
    ///
    /// # Errors
    /// [`crate::AllocErrorKind::OutOfCapacity`] if the aligned request does
    /// not fit; the arena is unchanged.
    pub fn alloc(&mut self, size: usize) -> AllocResult<NonNull<u8>> {
        self.alloc_aligned(size, DEFAULT_ALIGNMENT)
    }

    /// Allocates `size` bytes aligned to `align`. The returned region is
    /// zero-filled.
    ///
    /// # Errors
    /// [`crate::AllocErrorKind::OutOfCapacity`] if the aligned request does
    /// not fit; the arena is unchanged.
    ///
    /// # Panics
    /// Panics if `align` is not a power of two.
    pub fn alloc_aligned(&mut self, size: usize, align: usize) -> AllocResult<NonNull<u8>> {
        let next_addr = align_forward(self.base_addr() + self.offset, align);
        let aligned_offset = next_addr - self.base_addr();

        match aligned_offset.checked_add(size) {
            Some(end) if end <= self.capacity => {
                self.offset = end;
                // SAFETY: [aligned_offset, aligned_offset + size) is within
                // the borrowed buffer, checked just above.
                let user = unsafe {
                    let p = self.base.as_ptr().add(aligned_offset);
                    ptr::write_bytes(p, 0, size);
                    NonNull::new_unchecked(p)
                };
                self.stats.record_alloc(self.offset);
                Ok(user)
            }
            _ => {
                self.stats.record_failure();
                error!(
                    size,
                    align,
                    available = self.available(),
                    "arena allocation exceeds remaining capacity"
                );
                Err(AllocError::out_of_capacity(size, self.available()))
            }
        }
    }

    /// Resizes an allocation at [`DEFAULT_ALIGNMENT`].
    ///
    /// # Errors
    /// See [`ArenaAllocator::resize_aligned`].
    pub fn resize(
        &mut self,
        old: Option<NonNull<u8>>,
        old_size: usize,
        new_size: usize,
    ) -> AllocResult<NonNull<u8>> {
        self.resize_aligned(old, old_size, new_size, DEFAULT_ALIGNMENT)
    }

    /// Resizes an allocation.
    ///
    /// With `old` of `None` (or `old_size` of zero) this is a plain
    /// allocation. The most recent allocation is grown or shrunk in place,
    /// zeroing newly exposed bytes. Any other live allocation is copied to
    /// a fresh region of `new_size` bytes and the old region is stranded
    /// until `free_all`; arenas never reclaim interior blocks.
    ///
    /// # Errors
    /// [`crate::AllocErrorKind::ForeignPointer`] if `old` lies outside the
    /// buffer, [`crate::AllocErrorKind::OutOfCapacity`] if growth does not
    /// fit. The arena is unchanged on every error path.
    ///
    /// # Panics
    /// Panics if `align` is not a power of two.
    pub fn resize_aligned(
        &mut self,
        old: Option<NonNull<u8>>,
        old_size: usize,
        new_size: usize,
        align: usize,
    ) -> AllocResult<NonNull<u8>> {
        let Some(old_ptr) = old else {
            return self.alloc_aligned(new_size, align);
        };
        if old_size == 0 {
            return self.alloc_aligned(new_size, align);
        }

        if !self.contains(old_ptr) {
            self.stats.record_failure();
            error!(
                addr = old_ptr.as_ptr() as usize,
                base = self.base_addr(),
                capacity = self.capacity,
                "resize pointer outside arena buffer"
            );
            return Err(AllocError::foreign_pointer());
        }

        let old_offset = old_ptr.as_ptr() as usize - self.base_addr();
        if old_offset + old_size == self.offset {
            // Tail block: move the offset without relocating.
            let Some(end) = old_offset.checked_add(new_size) else {
                self.stats.record_failure();
                return Err(AllocError::out_of_capacity(new_size, self.available()));
            };
            if end > self.capacity {
                self.stats.record_failure();
                error!(
                    new_size,
                    available = self.capacity - old_offset,
                    "arena tail resize exceeds capacity"
                );
                return Err(AllocError::out_of_capacity(
                    new_size,
                    self.capacity - old_offset,
                ));
            }

            self.offset = end;
            if new_size > old_size {
                // SAFETY: the grown tail [old_offset + old_size, end) is in
                // bounds, checked above.
                unsafe {
                    ptr::write_bytes(
                        self.base.as_ptr().add(old_offset + old_size),
                        0,
                        new_size - old_size,
                    );
                }
            }
            self.stats.record_realloc(self.offset);
            Ok(old_ptr)
        } else {
            let new_ptr = self.alloc_aligned(new_size, align)?;
            let copy = old_size.min(new_size);
            // SAFETY: both regions are in-bounds live parts of the buffer
            // and a fresh allocation never overlaps an existing one.
            unsafe {
                ptr::copy_nonoverlapping(old_ptr.as_ptr(), new_ptr.as_ptr(), copy);
            }
            self.stats.record_realloc(self.offset);
            Ok(new_ptr)
        }
    }

    /// Individual frees are a no-op; memory returns via [`free_all`] or a
    /// savepoint unwind.
    ///
    /// [`free_all`]: ArenaAllocator::free_all
    pub fn free(&mut self, _ptr: NonNull<u8>) {}

    /// Releases every allocation at once, invalidating all outstanding
    /// pointers.
    pub fn free_all(&mut self) {
        self.offset = 0;
    }

    /// Captures the current offset; dropping (or [`end`]ing) the returned
    /// guard rolls every allocation made through it back.
    ///
    /// [`end`]: ArenaSavepoint::end
    pub fn savepoint(&mut self) -> ArenaSavepoint<'_, 'buf> {
        let saved_offset = self.offset;
        ArenaSavepoint {
            arena: self,
            saved_offset,
        }
    }
}

impl MemoryUsage for ArenaAllocator<'_> {
    fn used_memory(&self) -> usize {
        self.offset
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.available())
    }

    fn total_memory(&self) -> Option<usize> {
        Some(self.capacity)
    }
}

impl Resettable for ArenaAllocator<'_> {
    fn reset(&mut self) {
        self.free_all();
    }
}

impl StatisticsProvider for ArenaAllocator<'_> {
    fn statistics(&self) -> AllocatorStats {
        self.stats
    }

    fn reset_statistics(&mut self) {
        self.stats = AllocatorStats::default();
    }
}

impl core::fmt::Debug for ArenaAllocator<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArenaAllocator")
            .field("capacity", &self.capacity)
            .field("offset", &self.offset)
            .finish()
    }
}

/// Scoped rollback point for an [`ArenaAllocator`].
///
/// The guard borrows the arena mutably and derefs to it, so all
/// allocations inside the scope go through the guard and savepoints can
/// only be released in reverse order of creation. Dropping the guard
/// restores the arena offset captured at creation, discarding everything
/// allocated since.
pub struct ArenaSavepoint<'a, 'buf> {
    arena: &'a mut ArenaAllocator<'buf>,
    saved_offset: usize,
}

impl ArenaSavepoint<'_, '_> {
    /// Ends the savepoint, restoring the captured offset.
    pub fn end(self) {
        // Drop performs the restore.
        drop(self);
    }

    /// Offset the arena will be restored to.
    #[inline]
    #[must_use]
    pub fn saved_offset(&self) -> usize {
        self.saved_offset
    }
}

impl<'buf> Deref for ArenaSavepoint<'_, 'buf> {
    type Target = ArenaAllocator<'buf>;

    fn deref(&self) -> &Self::Target {
        self.arena
    }
}

impl DerefMut for ArenaSavepoint<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.arena
    }
}

impl Drop for ArenaSavepoint<'_, '_> {
    fn drop(&mut self) {
        self.arena.offset = self.saved_offset;
    }
}

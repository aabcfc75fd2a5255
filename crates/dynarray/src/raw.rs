//! Untyped element storage.
//!
//! [`RawBuffer`] owns a block sized for exactly `capacity` values of `T`
//! and nothing more: it never constructs, reads, or drops a `T`. Object
//! lifetime is the business of [`DynamicArray`](crate::DynamicArray),
//! which decides which slots are live.

use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::error::ArrayError;

/// Exclusively owned raw storage for `capacity` elements of `T`.
///
/// A buffer with capacity 0 holds no allocation and a dangling pointer.
/// Zero-sized types never allocate and report a capacity of `usize::MAX`.
///
/// Moving a `RawBuffer` transfers the block. There is no `Clone`; only the
/// owning array knows which slots hold live values.
pub struct RawBuffer<T> {
    ptr: NonNull<T>,
    capacity: usize,
    _marker: PhantomData<T>,
}

// SAFETY: `RawBuffer` owns its block exclusively; sending it sends the
// (possibly) contained `T`s with it.
unsafe impl<T: Send> Send for RawBuffer<T> {}
// SAFETY: shared access only hands out raw pointers; any `&T` derived from
// them goes through `DynamicArray`, which requires `T: Sync` for that.
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> RawBuffer<T> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Create an empty buffer. Does not allocate.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: if Self::IS_ZST { usize::MAX } else { 0 },
            _marker: PhantomData,
        }
    }

    /// Reserve raw storage for exactly `capacity` elements.
    ///
    /// Returns an empty buffer when `capacity` is 0. Fails with
    /// [`ArrayError::CapacityOverflow`] if the byte size is not
    /// representable and [`ArrayError::AllocationFailed`] if the allocator
    /// cannot supply the block. Nothing is retained on failure.
    pub fn allocate(capacity: usize) -> Result<Self, ArrayError> {
        if Self::IS_ZST || capacity == 0 {
            return Ok(Self::new());
        }
        let layout = Layout::array::<T>(capacity).map_err(|_| ArrayError::CapacityOverflow {
            requested: capacity,
        })?;
        // SAFETY: `T` is not zero-sized and `capacity > 0`, so the layout
        // has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw.cast::<T>()).ok_or(ArrayError::AllocationFailed {
            requested: capacity,
            layout,
        })?;
        Ok(Self {
            ptr,
            capacity,
            _marker: PhantomData,
        })
    }

    /// Number of elements the block can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Address of the slot at `offset`.
    ///
    /// `offset` may equal `capacity` (the one-past-end address); such an
    /// address may be compared or used as a bound, never dereferenced.
    /// Whether the slot holds a live value is tracked by the caller.
    #[inline]
    pub fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(
            offset <= self.capacity,
            "slot {offset} past capacity {}",
            self.capacity
        );
        self.ptr.as_ptr().wrapping_add(offset)
    }

    /// Start of the block.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Start of the block, for writes.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Exchange blocks with `other`. Constant time, never allocates.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Move the block out, leaving `self` empty.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    fn layout(&self) -> Option<Layout> {
        if Self::IS_ZST || self.capacity == 0 {
            return None;
        }
        Layout::array::<T>(self.capacity).ok()
    }
}

impl<T> Default for RawBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        if let Some(layout) = self.layout() {
            // SAFETY: a non-empty, non-ZST buffer was produced by `allocate`
            // with this exact layout and has not been released.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) };
        }
    }
}

impl<T> std::fmt::Debug for RawBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBuffer")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}

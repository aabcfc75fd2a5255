//! The growable array.
//!
//! [`DynamicArray`] pairs one [`RawBuffer`] with a live count. Slots
//! `[0, len)` hold constructed values; `[len, capacity)` are raw storage.
//!
//! # Failure model
//!
//! Element constructors report failure either by panicking or, in the
//! `try_*` family, by returning `Err`. Allocation failure and invalid
//! positions are returned as [`ArrayError`]. Every operation that needs a
//! new block builds the new contents first and swaps blocks only once
//! nothing else can fail, so a failed call leaves length, capacity and
//! values exactly as they were.
//!
//! Relocating live values into a new block is a bitwise move, which cannot
//! fail. `Clone` runs only for explicit copies (`clone`, `clone_from`,
//! `From<&[T]>`), never during growth.

use std::convert::Infallible;
use std::fmt;
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr;
use std::slice::{self, SliceIndex};

use crate::config::GrowthPolicy;
use crate::error::{ArrayError, ConstructError};
use crate::guard::PartialInit;
use crate::iter::IntoIter;
use crate::raw::RawBuffer;

/// A contiguous, growable sequence that owns its elements.
///
/// # Example
///
/// ```
/// use dynarray::DynamicArray;
///
/// let mut arr = DynamicArray::new();
/// arr.push(1).unwrap();
/// arr.push(2).unwrap();
/// arr.push(3).unwrap();
/// arr.insert(1, 9).unwrap();
/// assert_eq!(arr, [1, 9, 2, 3]);
///
/// arr.erase(0).unwrap();
/// arr.resize(5).unwrap();
/// assert_eq!(arr, [9, 2, 3, 0, 0]);
/// ```
pub struct DynamicArray<T> {
    buf: RawBuffer<T>,
    len: usize,
    growth: GrowthPolicy,
}

/// Bitwise-move `count` live values from `src[from..]` to `dst[to..]`.
///
/// # Safety
///
/// The source range must be live and the destination range raw. Afterwards
/// the source range must be treated as raw.
unsafe fn relocate<T>(
    src: &RawBuffer<T>,
    from: usize,
    dst: &mut RawBuffer<T>,
    to: usize,
    count: usize,
) {
    // SAFETY: the blocks are distinct allocations and both ranges lie
    // within their capacities, guaranteed by the caller.
    unsafe { ptr::copy_nonoverlapping(src.slot(from), dst.slot(to), count) };
}

impl<T> DynamicArray<T> {
    /// Create an empty array. Does not allocate.
    pub const fn new() -> Self {
        Self::with_growth(GrowthPolicy::doubling())
    }

    /// Create an empty array that grows according to `growth`.
    pub const fn with_growth(growth: GrowthPolicy) -> Self {
        Self {
            buf: RawBuffer::new(),
            len: 0,
            growth,
        }
    }

    /// Create an empty array with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, ArrayError> {
        let mut arr = Self::new();
        arr.reserve(capacity)?;
        Ok(arr)
    }

    /// Create an array of `len` default values; capacity equals `len`.
    ///
    /// If a `T::default()` call panics, every value built so far is dropped
    /// and the storage released before the panic continues.
    pub fn with_len(len: usize) -> Result<Self, ArrayError>
    where
        T: Default,
    {
        Self::from_fn(len, |_| T::default())
    }

    /// Create an array of `len` values produced by `f(index)` in order.
    pub fn from_fn<F>(len: usize, mut f: F) -> Result<Self, ArrayError>
    where
        F: FnMut(usize) -> T,
    {
        Ok(Self::try_from_fn(len, |i| Ok::<T, Infallible>(f(i)))?)
    }

    /// Create an array of `len` values produced by a fallible `f(index)`.
    ///
    /// The first `Err` drops every value already built, releases the
    /// storage, and is returned as [`ConstructError::Element`].
    pub fn try_from_fn<E, F>(len: usize, mut f: F) -> Result<Self, ConstructError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        let buf: RawBuffer<T> = RawBuffer::allocate(len)?;
        // SAFETY: `buf` has `len` raw slots.
        let mut init = unsafe { PartialInit::new(buf.slot(0)) };
        for i in 0..len {
            let value = f(i).map_err(ConstructError::Element)?;
            // SAFETY: `i < len`.
            unsafe { init.push(value) };
        }
        let len = init.commit();
        Ok(Self {
            buf,
            len,
            growth: GrowthPolicy::doubling(),
        })
    }
}

impl<T> DynamicArray<T> {
    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current block can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The growth policy applied by implicit growth.
    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }

    /// Replace the growth policy. Existing storage is untouched.
    pub fn set_growth(&mut self, growth: GrowthPolicy) {
        self.growth = growth;
    }

    /// Pointer to the first element (dangling when capacity is 0).
    ///
    /// Invalidated by any operation that changes capacity.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Mutable pointer to the first element.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// The live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is live and the pointer is aligned and non-null.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    /// Ensure capacity is at least `new_capacity`.
    ///
    /// Does nothing if the current block is already large enough; otherwise
    /// allocates exactly `new_capacity` slots and relocates the live
    /// elements. On failure the array is unchanged.
    pub fn reserve(&mut self, new_capacity: usize) -> Result<(), ArrayError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        let mut fresh: RawBuffer<T> = RawBuffer::allocate(new_capacity)?;
        // SAFETY: `[0, len)` is live in the old block and raw in the new
        // one, which is at least as large.
        unsafe { relocate(&self.buf, 0, &mut fresh, 0, self.len) };
        self.install(fresh);
        Ok(())
    }

    /// Swap in `fresh`, whose live prefix has already been built, and
    /// release the old block without dropping anything in it.
    fn install(&mut self, mut fresh: RawBuffer<T>) {
        log::trace!(
            "dynarray: reallocated {} -> {} slots ({} live)",
            self.buf.capacity(),
            fresh.capacity(),
            self.len
        );
        self.buf.swap(&mut fresh);
    }

    /// Capacity to grow to when one more slot is needed.
    fn grown_capacity(&self) -> Result<usize, ArrayError> {
        let required = self
            .len
            .checked_add(1)
            .ok_or(ArrayError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        Ok(self.growth.next_capacity(self.capacity(), required))
    }

    /// Set the length to `new_len`, dropping or default-constructing the
    /// difference.
    ///
    /// Growing past capacity allocates exactly `new_len` slots.
    pub fn resize(&mut self, new_len: usize) -> Result<(), ArrayError>
    where
        T: Default,
    {
        self.resize_with(new_len, T::default)
    }

    /// Set the length to `new_len`, filling new slots with `f()`.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<(), ArrayError>
    where
        F: FnMut() -> T,
    {
        Ok(self.try_resize_with(new_len, || Ok::<T, Infallible>(f()))?)
    }

    /// Set the length to `new_len`, filling new slots with a fallible `f()`.
    ///
    /// When growing, the new tail is built before the array is touched: a
    /// failure drops the values built so far and leaves length, capacity
    /// and contents unchanged.
    pub fn try_resize_with<E, F>(&mut self, new_len: usize, mut f: F) -> Result<(), ConstructError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        let added = new_len - self.len;
        if new_len > self.capacity() {
            let mut fresh: RawBuffer<T> = RawBuffer::allocate(new_len)?;
            // SAFETY: `[len, new_len)` is raw in `fresh`.
            let mut init = unsafe { PartialInit::new(fresh.slot(self.len)) };
            for _ in 0..added {
                let value = f().map_err(ConstructError::Element)?;
                // SAFETY: at most `added` pushes.
                unsafe { init.push(value) };
            }
            init.commit();
            // SAFETY: `[0, len)` is live here and raw in `fresh`.
            unsafe { relocate(&self.buf, 0, &mut fresh, 0, self.len) };
            self.install(fresh);
        } else {
            // SAFETY: `[len, new_len)` is raw and within capacity.
            let mut init = unsafe { PartialInit::new(self.buf.slot(self.len)) };
            for _ in 0..added {
                let value = f().map_err(ConstructError::Element)?;
                // SAFETY: at most `added` pushes.
                unsafe { init.push(value) };
            }
            init.commit();
        }
        self.len = new_len;
        Ok(())
    }

    /// Drop every element past `new_len`. Capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail = ptr::slice_from_raw_parts_mut(self.buf.slot(new_len), self.len - new_len);
        // Shrink first so a panicking destructor cannot cause a double drop.
        self.len = new_len;
        // SAFETY: the tail was live and is no longer counted.
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Drop every element. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchange contents with `other` in constant time.
    ///
    /// Elements keep their addresses; they now belong to the other array.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Append `value` and return a reference to it.
    pub fn push(&mut self, value: T) -> Result<&mut T, ArrayError> {
        self.emplace_back(|| value)
    }

    /// Append the value produced by `f` and return a reference to it.
    ///
    /// When the block is full, `f` runs after the new block is allocated
    /// and writes straight into its final slot; if it panics the array is
    /// untouched.
    pub fn emplace_back<F>(&mut self, f: F) -> Result<&mut T, ArrayError>
    where
        F: FnOnce() -> T,
    {
        let at = self.emplace(self.len, f)?;
        Ok(&mut self.as_mut_slice()[at])
    }

    /// Append the value produced by a fallible `f`.
    pub fn try_emplace_back<E, F>(&mut self, f: F) -> Result<&mut T, ConstructError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let at = self.try_emplace(self.len, f)?;
        Ok(&mut self.as_mut_slice()[at])
    }

    /// Remove and return the last element, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was live and is no longer counted.
        Some(unsafe { self.buf.slot(self.len).read() })
    }

    /// Insert `value` at `position`, shifting `[position, len)` right.
    ///
    /// Returns the position of the inserted element.
    pub fn insert(&mut self, position: usize, value: T) -> Result<usize, ArrayError> {
        self.emplace(position, || value)
    }

    /// Construct an element at `position` with `f`, shifting
    /// `[position, len)` right by one.
    ///
    /// `position` must lie in `[0, len]`; anything else returns
    /// [`ArrayError::InvalidPosition`] before `f` runs.
    pub fn emplace<F>(&mut self, position: usize, f: F) -> Result<usize, ArrayError>
    where
        F: FnOnce() -> T,
    {
        Ok(self.try_emplace(position, || Ok::<T, Infallible>(f()))?)
    }

    /// Construct an element at `position` with a fallible `f`.
    ///
    /// With spare capacity the value is built first, then the suffix is
    /// shifted and the value written. Otherwise a block of grown capacity
    /// is allocated, the value is built directly in its final slot, and the
    /// prefix and suffix are relocated around it. Either way the array is
    /// unchanged if `f` fails.
    pub fn try_emplace<E, F>(&mut self, position: usize, f: F) -> Result<usize, ConstructError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if position > self.len {
            return Err(ArrayError::InvalidPosition {
                position,
                len: self.len,
            }
            .into());
        }

        if self.len < self.capacity() {
            let value = f().map_err(ConstructError::Element)?;
            let base = self.buf.slot(position);
            // SAFETY: `[position, len)` is live and `len < capacity`, so
            // shifting it one slot right stays in bounds; the vacated slot
            // is then raw and receives `value`.
            unsafe {
                ptr::copy(base, base.add(1), self.len - position);
                base.write(value);
            }
            self.len += 1;
            return Ok(position);
        }

        let mut fresh: RawBuffer<T> = RawBuffer::allocate(self.grown_capacity()?)?;
        let value = f().map_err(ConstructError::Element)?;
        // SAFETY: `fresh` holds at least `len + 1` raw slots. The new value
        // goes to `position`, the prefix to `[0, position)` and the suffix
        // to `[position + 1, len + 1)`.
        unsafe {
            fresh.slot(position).write(value);
            relocate(&self.buf, 0, &mut fresh, 0, position);
            relocate(&self.buf, position, &mut fresh, position + 1, self.len - position);
        }
        self.install(fresh);
        self.len += 1;
        Ok(position)
    }

    /// Drop the element at `position`, shifting `[position + 1, len)` left.
    ///
    /// Returns `position`, which now names the element that followed the
    /// erased one (or `len` if the last element was erased).
    pub fn erase(&mut self, position: usize) -> Result<usize, ArrayError> {
        drop(self.remove(position)?);
        Ok(position)
    }

    /// Remove and return the element at `position`, shifting the rest left.
    pub fn remove(&mut self, position: usize) -> Result<T, ArrayError> {
        if position >= self.len {
            return Err(ArrayError::InvalidPosition {
                position,
                len: self.len,
            });
        }
        let base = self.buf.slot(position);
        // SAFETY: `position < len`, so the slot is live. After reading it
        // out, `[position + 1, len)` moves down over it and the last slot
        // becomes raw.
        let removed = unsafe {
            let removed = base.read();
            ptr::copy(base.add(1), base, self.len - position - 1);
            removed
        };
        self.len -= 1;
        Ok(removed)
    }
}

impl<T: Clone> DynamicArray<T> {
    /// Deep copy with capacity equal to `self.len()`.
    ///
    /// A panicking `T::clone` drops every copy made so far.
    pub fn try_clone(&self) -> Result<Self, ArrayError> {
        let buf: RawBuffer<T> = RawBuffer::allocate(self.len)?;
        // SAFETY: `buf` has `len` raw slots.
        let mut init = unsafe { PartialInit::new(buf.slot(0)) };
        for item in self.as_slice() {
            // SAFETY: at most `len` pushes.
            unsafe { init.push(item.clone()) };
        }
        let len = init.commit();
        Ok(Self {
            buf,
            len,
            growth: self.growth,
        })
    }

    /// Make `self` a copy of `rhs`, reusing storage when it fits.
    ///
    /// If `rhs` does not fit, a full copy is built and swapped in, so a
    /// failure leaves `self` unchanged. Otherwise the overlapping prefix is
    /// assigned in place with `T::clone_from`, any excess tail is dropped,
    /// and any missing tail is cloned into spare capacity.
    pub fn try_assign_from(&mut self, rhs: &Self) -> Result<(), ArrayError> {
        if rhs.len > self.capacity() {
            let mut copy = rhs.try_clone()?;
            self.swap(&mut copy);
            return Ok(());
        }
        self.growth = rhs.growth;
        let overlap = self.len.min(rhs.len);
        self.as_mut_slice()[..overlap].clone_from_slice(&rhs.as_slice()[..overlap]);
        if rhs.len < self.len {
            self.truncate(rhs.len);
        } else {
            // SAFETY: `[len, rhs.len)` is raw and within capacity.
            let mut init = unsafe { PartialInit::new(self.buf.slot(self.len)) };
            for item in &rhs.as_slice()[self.len..] {
                // SAFETY: at most `rhs.len - len` pushes.
                unsafe { init.push(item.clone()) };
            }
            self.len += init.commit();
        }
        Ok(())
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: `[0, len)` is live. The block itself is released by
        // `RawBuffer`'s own drop.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.buf.as_mut_ptr(),
                self.len,
            ));
        }
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| err.escalate())
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.try_assign_from(source) {
            err.escalate();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, I: SliceIndex<[T]>> Index<I> for DynamicArray<T> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<T, I: SliceIndex<[T]>> IndexMut<I> for DynamicArray<T> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.as_mut_slice()[index]
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, U> PartialEq<DynamicArray<U>> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &DynamicArray<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T, U> PartialEq<[U]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U> PartialEq<&[U]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Clone> From<&[T]> for DynamicArray<T> {
    fn from(items: &[T]) -> Self {
        Self::from_fn(items.len(), |i| items[i].clone()).unwrap_or_else(|err| err.escalate())
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if let Some(wanted) = self.len.checked_add(lower) {
            if wanted > self.capacity() {
                let target = self.growth.next_capacity(self.capacity(), wanted);
                if let Err(err) = self.reserve(target) {
                    err.escalate();
                }
            }
        }
        for value in iter {
            if let Err(err) = self.push(value) {
                err.escalate();
            }
        }
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::new();
        arr.extend(iter);
        arr
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let mut this = ManuallyDrop::new(self);
        let len = this.len;
        // The iterator takes over both the block and the live range.
        IntoIter::new(this.buf.take(), len)
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

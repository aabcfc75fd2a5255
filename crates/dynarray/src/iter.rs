//! Owning iteration.

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;
use std::slice;

use crate::raw::RawBuffer;

/// Owning iterator over the elements of a [`DynamicArray`](crate::DynamicArray).
///
/// Slots `[start, end)` of the taken block are still live. Dropping the
/// iterator drops whatever was not yielded and then releases the block.
pub struct IntoIter<T> {
    buf: RawBuffer<T>,
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    /// Take over `buf`, whose first `len` slots are live.
    pub(crate) fn new(buf: RawBuffer<T>, len: usize) -> Self {
        Self {
            buf,
            start: 0,
            end: len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` is live.
        unsafe { slice::from_raw_parts(self.buf.slot(self.start), self.end - self.start) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start < end`, so the slot is live; advancing `start`
        // hands ownership to the caller.
        let value = unsafe { self.buf.slot(self.start).read() };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: the slot at the old `end - 1` is live and now excluded.
        Some(unsafe { self.buf.slot(self.end).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let rest = ptr::slice_from_raw_parts_mut(self.buf.slot(self.start), self.end - self.start);
        self.start = self.end;
        // SAFETY: the unyielded range is live and no longer tracked.
        unsafe { ptr::drop_in_place(rest) };
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

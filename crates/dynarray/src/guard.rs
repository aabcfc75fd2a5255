//! Rollback guard for runs of in-progress construction.
//!
//! [`PartialInit`] records how many consecutive slots it has filled. If it
//! is dropped before [`commit`](PartialInit::commit), whether by an early
//! `?` return or by a panic unwinding through it, every value it wrote is
//! dropped again and the slots return to raw storage. Committing hands
//! ownership of the run to the caller.

use std::mem;
use std::ptr;

pub(crate) struct PartialInit<T> {
    start: *mut T,
    initialized: usize,
}

impl<T> PartialInit<T> {
    /// Begin a run at `start`.
    ///
    /// # Safety
    ///
    /// `start` must be valid for writes of every element later passed to
    /// [`push`](Self::push), and those slots must not hold live values.
    pub(crate) unsafe fn new(start: *mut T) -> Self {
        Self {
            start,
            initialized: 0,
        }
    }

    /// Write `value` into the next slot of the run.
    ///
    /// # Safety
    ///
    /// The next slot must lie within the region promised to [`new`](Self::new).
    pub(crate) unsafe fn push(&mut self, value: T) {
        // SAFETY: guaranteed by the caller.
        unsafe { self.start.add(self.initialized).write(value) };
        self.initialized += 1;
    }

    /// Disarm the guard and return the number of live values it wrote.
    pub(crate) fn commit(self) -> usize {
        let initialized = self.initialized;
        mem::forget(self);
        initialized
    }
}

impl<T> Drop for PartialInit<T> {
    fn drop(&mut self) {
        if self.initialized == 0 {
            return;
        }
        log::debug!(
            "dynarray: rolling back {} partially constructed elements",
            self.initialized
        );
        // SAFETY: exactly `initialized` slots from `start` were written by
        // `push` and have not been handed out.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.start,
                self.initialized,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::mem::MaybeUninit;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    struct Noisy<'a>(&'a Cell<usize>);

    impl Drop for Noisy<'_> {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn dropped_guard_releases_written_values() {
        let drops = Cell::new(0);
        let mut slots: [MaybeUninit<Noisy<'_>>; 4] = [const { MaybeUninit::uninit() }; 4];
        {
            // SAFETY: four uninitialised slots.
            let mut guard = unsafe { PartialInit::new(slots.as_mut_ptr().cast::<Noisy<'_>>()) };
            for _ in 0..3 {
                unsafe { guard.push(Noisy(&drops)) };
            }
        }
        assert_eq!(drops.get(), 3);
    }

    #[test]
    fn committed_guard_keeps_values_alive() {
        let drops = Cell::new(0);
        let mut slots: [MaybeUninit<Noisy<'_>>; 2] = [const { MaybeUninit::uninit() }; 2];
        let base = slots.as_mut_ptr().cast::<Noisy<'_>>();
        // SAFETY: two uninitialised slots.
        let mut guard = unsafe { PartialInit::new(base) };
        unsafe {
            guard.push(Noisy(&drops));
            guard.push(Noisy(&drops));
        }
        assert_eq!(guard.commit(), 2);
        assert_eq!(drops.get(), 0);
        // SAFETY: both slots were committed as live.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base, 2)) };
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn panic_mid_run_rolls_back() {
        let drops = Cell::new(0);
        let mut slots: [MaybeUninit<Noisy<'_>>; 5] = [const { MaybeUninit::uninit() }; 5];
        let base = slots.as_mut_ptr().cast::<Noisy<'_>>();
        let result = catch_unwind(AssertUnwindSafe(|| {
            // SAFETY: five uninitialised slots.
            let mut guard = unsafe { PartialInit::new(base) };
            for i in 0..5 {
                if i == 2 {
                    panic!("constructor failed");
                }
                unsafe { guard.push(Noisy(&drops)) };
            }
            guard.commit()
        }));
        assert!(result.is_err());
        assert_eq!(drops.get(), 2);
    }
}

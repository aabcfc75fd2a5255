//! Reusable element fixtures.
//!
//! - [`Ledger`] / [`Tracked`] — counts every construction, clone and drop,
//!   and can make the k-th clone panic.
//! - [`FailAfter`] — a generator that succeeds N times, then errors.
//! - [`expect_panic`] — run a closure that must panic, return its message.

use std::error::Error;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const NO_FUSE: usize = usize::MAX;

#[derive(Default)]
struct Counters {
    created: AtomicUsize,
    dropped: AtomicUsize,
    clones: AtomicUsize,
    fuse: AtomicUsize,
}

/// Shared tally for [`Tracked`] values.
///
/// Cloning a ledger shares the counters. Uses atomics so fixtures stay
/// `Send + Sync`.
#[derive(Clone)]
pub struct Ledger {
    counters: Arc<Counters>,
}

impl Ledger {
    pub fn new() -> Self {
        let counters = Counters::default();
        counters.fuse.store(NO_FUSE, Ordering::Relaxed);
        Self {
            counters: Arc::new(counters),
        }
    }

    /// Construct a tracked value.
    pub fn track(&self, value: i32) -> Tracked {
        self.counters.created.fetch_add(1, Ordering::Relaxed);
        Tracked {
            value,
            ledger: self.clone(),
        }
    }

    /// Values constructed so far, clones included.
    pub fn created(&self) -> usize {
        self.counters.created.load(Ordering::Relaxed)
    }

    /// Values dropped so far.
    pub fn dropped(&self) -> usize {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    /// Values constructed and not yet dropped.
    pub fn live(&self) -> usize {
        self.created() - self.dropped()
    }

    /// Successful clones so far.
    pub fn clones(&self) -> usize {
        self.counters.clones.load(Ordering::Relaxed)
    }

    /// Make the `k`-th clone from now (1-based) panic.
    ///
    /// The fuse stays lit: every clone after that one panics too, until
    /// [`disarm`](Self::disarm) is called.
    pub fn fail_on_clone(&self, k: usize) {
        assert!(k > 0, "clone fuse must be at least 1");
        self.counters
            .fuse
            .store(self.clones() + k, Ordering::Relaxed);
    }

    /// Let clones succeed again.
    pub fn disarm(&self) {
        self.counters.fuse.store(NO_FUSE, Ordering::Relaxed);
    }

    fn try_clone(&self) -> bool {
        let attempt = self.clones() + 1;
        if attempt >= self.counters.fuse.load(Ordering::Relaxed) {
            return false;
        }
        self.counters.clones.fetch_add(1, Ordering::Relaxed);
        true
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// An `i32` whose lifetime is recorded in a [`Ledger`].
pub struct Tracked {
    value: i32,
    ledger: Ledger,
}

impl Tracked {
    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn set(&mut self, value: i32) {
        self.value = value;
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        if !self.ledger.try_clone() {
            panic!("clone of tracked value {} failed", self.value);
        }
        self.ledger.track(self.value)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.counters.dropped.fetch_add(1, Ordering::Relaxed);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialEq<i32> for Tracked {
    fn eq(&self, other: &i32) -> bool {
        self.value == *other
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({})", self.value)
    }
}

/// Error returned by [`FailAfter`] once its budget is spent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Refused {
    /// Number of successful calls before the refusal.
    pub after: usize,
}

impl fmt::Display for Refused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "refused after {} successful calls", self.after)
    }
}

impl Error for Refused {}

/// Succeeds a configurable number of times, then fails on every call.
pub struct FailAfter {
    succeed_count: usize,
    calls: usize,
}

impl FailAfter {
    /// Create a generator that succeeds `succeed_count` times then fails.
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            calls: 0,
        }
    }

    /// Returns the call index on success.
    pub fn attempt(&mut self) -> Result<usize, Refused> {
        let n = self.calls;
        self.calls += 1;
        if n >= self.succeed_count {
            return Err(Refused {
                after: self.succeed_count,
            });
        }
        Ok(n)
    }

    /// How many times `attempt()` has been called.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

/// Run `f`, which must panic, and return the panic message.
///
/// # Panics
///
/// Panics if `f` returns normally.
pub fn expect_panic<R>(f: impl FnOnce() -> R) -> String {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(_) => panic!("expected a panic, but the call returned"),
        Err(payload) => {
            if let Some(msg) = payload.downcast_ref::<&str>() {
                (*msg).to_string()
            } else if let Some(msg) = payload.downcast_ref::<String>() {
                msg.clone()
            } else {
                String::from("<non-string panic payload>")
            }
        }
    }
}

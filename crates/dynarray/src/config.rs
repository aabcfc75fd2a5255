//! Growth configuration for dynamic arrays.

/// Controls how much capacity an array acquires when it runs out of room.
///
/// Applied only by operations that grow implicitly (`push`, `emplace`,
/// `insert`, `extend`). Explicit requests (`reserve`, `resize`) allocate
/// exactly what was asked for. Whatever the fields hold, the computed
/// capacity never falls below what the operation requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Multiplier applied to the current capacity.
    ///
    /// Default: 2. A factor of 1 grows to the exact required size and gives
    /// up amortized O(1) appends.
    pub factor: usize,

    /// Smallest capacity ever allocated by implicit growth.
    ///
    /// Default: 1.
    pub min_capacity: usize,
}

impl GrowthPolicy {
    /// Default growth multiplier.
    pub const DEFAULT_FACTOR: usize = 2;

    /// Default floor for implicit growth.
    pub const DEFAULT_MIN_CAPACITY: usize = 1;

    /// Doubling growth with a floor of one slot.
    pub const fn doubling() -> Self {
        Self {
            factor: Self::DEFAULT_FACTOR,
            min_capacity: Self::DEFAULT_MIN_CAPACITY,
        }
    }

    /// Grow to exactly the required capacity.
    pub const fn exact() -> Self {
        Self {
            factor: 1,
            min_capacity: 1,
        }
    }

    /// Capacity to allocate when `current` slots are full and `required`
    /// slots are needed.
    ///
    /// Saturates instead of overflowing; the allocator rejects anything
    /// whose byte size is out of range.
    pub fn next_capacity(&self, current: usize, required: usize) -> usize {
        current
            .saturating_mul(self.factor)
            .max(self.min_capacity)
            .max(required)
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::doubling()
    }
}

//! Workload builders shared by the dynarray benchmarks.
//!
//! - [`filled`]: an array of `n` consecutive integers, grown by appends
//! - [`insert_positions`]: deterministic pseudo-random insert positions
//! - [`Payload`]: a heap-owning element so clone and drop cost something

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use dynarray::DynamicArray;

/// Build an array of `0..n` by repeated `push`.
pub fn filled(n: usize) -> DynamicArray<u64> {
    let mut arr = DynamicArray::new();
    for i in 0..n as u64 {
        arr.push(i).expect("bench sizes fit in memory");
    }
    arr
}

/// Generate `n` insert positions, each valid for an array that starts
/// empty and grows by one per insert.
///
/// Uses an LCG step on the seed so runs are reproducible.
pub fn insert_positions(n: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    (0..n)
        .map(|len| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) as usize) % (len + 1)
        })
        .collect()
}

/// A small heap-backed element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload {
    /// Label bytes; owning them makes clone and drop non-trivial.
    pub bytes: Vec<u8>,
}

impl Payload {
    /// A payload of `len` copies of `tag`.
    pub fn new(tag: u8, len: usize) -> Self {
        Self {
            bytes: vec![tag; len],
        }
    }
}

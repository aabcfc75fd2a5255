//! A growable, contiguous array with explicit control over allocation and
//! element lifetime.
//!
//! Memory and objects are handled by separate layers:
//!
//! ```text
//! DynamicArray<T>  (live count, construction, relocation, growth)
//! └── RawBuffer<T> (one untyped block for exactly N elements)
//! ```
//!
//! [`RawBuffer`] only allocates and releases. [`DynamicArray`] decides
//! which slots are live and builds new contents in a fresh block before
//! swapping it in, so a failed allocation or a failing element constructor
//! never leaves the array half-updated.
//!
//! # Failure reporting
//!
//! - Allocation failure and out-of-range positions: [`ArrayError`].
//! - Fallible element constructors (`try_*` methods): [`ConstructError`].
//! - Panicking constructors (`Default`, `Clone`, closures): every partially
//!   built range is dropped before the panic reaches the caller.
//!
//! # Growth
//!
//! Implicit growth follows a [`GrowthPolicy`] (doubling from one slot by
//! default). Relocation into a new block is a bitwise move and never runs
//! `Clone`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod array;
pub mod config;
pub mod error;
mod guard;
pub mod iter;
pub mod raw;

pub use array::DynamicArray;
pub use config::GrowthPolicy;
pub use error::{ArrayError, ConstructError};
pub use iter::IntoIter;
pub use raw::RawBuffer;

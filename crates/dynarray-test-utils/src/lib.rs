//! Test utilities for `dynarray` development.
//!
//! Provides instrumented element types that record constructions, clones
//! and drops in a shared [`Ledger`], clones that fail on a chosen call, and
//! a fallible generator ([`FailAfter`]) for the `try_*` APIs.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{expect_panic, FailAfter, Ledger, Refused, Tracked};

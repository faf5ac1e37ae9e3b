//! Shared utilities for the `sc_*` crates.
//!
//! - [`hash`]: hash containers with a fixed seed, so iteration order only
//!   depends on the inserted keys. Generated artifacts must not change between
//!   two runs over the same model.
//! - [`UniqueVec`]: an insertion-ordered, deduplicated list.

// -----------------------------------------------------------------------------
// Modules

mod unique_vec;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use unique_vec::UniqueVec;

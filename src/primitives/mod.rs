//! Core compute primitives.
//!
//! [`SparseVector`] is the parameter and instance representation shared by
//! every learner in the crate.

mod sparse;

pub use sparse::SparseVector;

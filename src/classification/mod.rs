//! Streaming classifiers.
//!
//! - [`BudgetKernelPerceptron`]: dual-space kernel perceptron with a
//!   capacity-bounded support-vector pool
//!
//! The primal sparse linear learner lives in [`crate::online`].

mod budget;

pub use budget::{BudgetKernelPerceptron, SupportVector};

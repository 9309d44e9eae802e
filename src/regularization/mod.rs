//! Regularization for streaming parameter vectors.
//!
//! # Techniques
//! - [`Prior`]: per-parameter shrinkage gradients under uniform, Gaussian,
//!   Laplace, Cauchy or quadratic priors; a single step never flips a sign
//! - [`GradientTruncation`]: periodic rounding, truncated gradient, Pegasos
//!   projection or modified-Duchi shrinkage over the whole vector

mod prior;
mod truncation;

pub use prior::{Prior, PriorConfig};
pub use truncation::{
    GradientTruncation, TruncationConfig, TruncationPolicy, TruncationState, TruncationType,
};

#[cfg(test)]
mod tests;

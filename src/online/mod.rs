//! Online learning over streamed sparse examples.
//!
//! Every example is fully processed (predict, gradient, learning rate,
//! regularize, truncate) before the next one is read. Learners hold no
//! process-wide state, so independent replicas can be built freely, but a
//! single learner must have exactly one writer.
//!
//! # References
//!
//! - [Bottou 2010] "Large-Scale Machine Learning with Stochastic Gradient Descent"
//! - [Langford, Li & Zhang 2009] "Sparse Online Learning via Truncated Gradient"

mod config;
mod sparse_linear;

pub use config::TrainingConfig;
pub use sparse_linear::SparseLinearLearner;

use crate::data::Instance;
use crate::error::Result;
use crate::primitives::SparseVector;

/// Online learning capability for incremental model updates.
///
/// Reference: [Bottou 2010] "Large-Scale Machine Learning with Stochastic
/// Gradient Descent" - Online learning converges to optimal solution with
/// O(1/t) regret bound under convex loss.
///
/// # Example
///
/// ```rust,ignore
/// use streamlearn::online::OnlineLearner;
///
/// let mut model = SparseLinearLearner::new(1 << 20)?;
/// for instance in stream {
///     let loss = model.update(&instance)?;
///     println!("Sample loss: {}", loss);
/// }
/// ```
pub trait OnlineLearner {
    /// Processes one labeled example.
    ///
    /// # Returns
    /// The (weighted) loss on this example before the update
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` without touching the model if the
    /// instance dimension differs from the learner's.
    fn update(&mut self, instance: &Instance) -> Result<f64>;

    /// Raw decision value for `features`.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` on a dimension disagreement.
    fn regress(&self, features: &SparseVector) -> Result<f64>;

    /// Binary prediction: `+1.0` when [`OnlineLearner::regress`] is
    /// non-negative, `-1.0` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` on a dimension disagreement.
    fn predict(&self, features: &SparseVector) -> Result<f64> {
        let score = self.regress(features)?;
        Ok(if score >= 0.0 { 1.0 } else { -1.0 })
    }

    /// Streams every instance through [`OnlineLearner::update`].
    ///
    /// # Returns
    /// Mean loss over the stream (0.0 for an empty stream)
    ///
    /// # Errors
    ///
    /// Stops at the first failing instance; earlier updates are kept.
    fn update_all<'a, I>(&mut self, instances: I) -> Result<f64>
    where
        I: IntoIterator<Item = &'a Instance>,
        Self: Sized,
    {
        let mut total = 0.0;
        let mut count = 0_u64;
        for instance in instances {
            total += self.update(instance)?;
            count += 1;
        }
        Ok(if count == 0 { 0.0 } else { total / count as f64 })
    }

    /// Number of samples seen so far
    fn n_samples_seen(&self) -> u64;

    /// Reset internal state (for retraining from scratch)
    fn reset(&mut self);
}

#[cfg(test)]
#[path = "online_tests.rs"]
mod tests;

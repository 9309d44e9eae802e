//! Per-example gradient representation.

use serde::{Deserialize, Serialize};

use crate::loss::Loss;
use crate::primitives::SparseVector;

/// Sparse gradient of the loss on one example, with the scalar loss and
/// the instance weight it was computed under.
///
/// Built once per example and never mutated afterwards: the update loop
/// applies it and [`AdaGrad`](super::AdaGrad) accumulates it.
///
/// # Example
///
/// ```
/// use streamlearn::optim::Gradient;
/// use streamlearn::primitives::SparseVector;
///
/// let g = Gradient::new(SparseVector::from_dense(&[0.0, -0.5]), 0.7);
/// assert_eq!(g.weight(), 1.0);
/// assert_eq!(g.get(1), -0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    direction: SparseVector,
    loss: f64,
    weight: f64,
}

impl Gradient {
    /// Gradient with the default instance weight of 1.0.
    #[must_use]
    pub fn new(direction: SparseVector, loss: f64) -> Self {
        Self::weighted(direction, loss, 1.0)
    }

    /// Gradient computed under an explicit instance weight.
    #[must_use]
    pub fn weighted(direction: SparseVector, loss: f64, weight: f64) -> Self {
        Self {
            direction,
            loss,
            weight,
        }
    }

    /// Gradient of `loss_fn` at prediction `p` for features `x`.
    ///
    /// The direction is `weight * dloss/dp * x`; the reported loss is
    /// weighted the same way.
    #[must_use]
    pub fn from_loss<L: Loss>(loss_fn: &L, x: &SparseVector, p: f64, label: f64, weight: f64) -> Self {
        let scale = weight * loss_fn.derivative(p, label);
        let mut direction = x.clone();
        direction.scale(scale);
        Self::weighted(direction, weight * loss_fn.loss(p, label), weight)
    }

    /// Sparse gradient direction.
    #[must_use]
    pub fn direction(&self) -> &SparseVector {
        &self.direction
    }

    /// Scalar loss on the example, already weighted.
    #[must_use]
    pub fn loss(&self) -> f64 {
        self.loss
    }

    /// Instance weight the gradient was computed under.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Gradient component at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        self.direction.get(index)
    }

    /// Logical dimension of the gradient.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.direction.dimension()
    }

    /// Iterates non-zero `(index, component)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.direction.iter()
    }
}

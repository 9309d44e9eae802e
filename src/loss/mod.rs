//! Per-example loss functions for streaming training.
//!
//! Each loss works on a single raw prediction `p = w·x` and a label, and
//! exposes its derivative with respect to `p`. The online update loop turns
//! that derivative into a [`Gradient`](crate::optim::Gradient) by scaling
//! the instance's feature vector.
//!
//! # Usage
//!
//! ```
//! use streamlearn::loss::{Loss, LossFunction};
//!
//! let hinge = LossFunction::Hinge;
//! assert_eq!(hinge.loss(2.0, 1.0), 0.0);
//! assert_eq!(hinge.loss(0.5, 1.0), 0.5);
//! assert_eq!(hinge.derivative(0.5, 1.0), -1.0);
//! ```

use serde::{Deserialize, Serialize};

/// Common interface for pointwise losses.
pub trait Loss {
    /// Loss of prediction `p` against `label`.
    fn loss(&self, p: f64, label: f64) -> f64;

    /// `d loss / d p`.
    fn derivative(&self, p: f64, label: f64) -> f64;

    /// Returns the name of the loss function.
    fn name(&self) -> &str;
}

/// Built-in losses.
///
/// Classification losses read the label through its sign (`label > 0` is
/// the positive class); [`LossFunction::Squared`] uses the raw label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LossFunction {
    /// `ln(1 + exp(-y p))`
    #[default]
    Logistic,
    /// `max(0, 1 - y p)`
    Hinge,
    /// `max(0, -y p)`, updates only on mistakes
    Perceptron,
    /// `(p - y)^2 / 2`
    Squared,
}

fn label_sign(label: f64) -> f64 {
    if label > 0.0 {
        1.0
    } else {
        -1.0
    }
}

impl Loss for LossFunction {
    fn loss(&self, p: f64, label: f64) -> f64 {
        match self {
            LossFunction::Logistic => {
                let z = label_sign(label) * p;
                // ln(1 + e^-z) without overflow for large |z|
                if z > 0.0 {
                    (-z).exp().ln_1p()
                } else {
                    -z + z.exp().ln_1p()
                }
            }
            LossFunction::Hinge => (1.0 - label_sign(label) * p).max(0.0),
            LossFunction::Perceptron => (-label_sign(label) * p).max(0.0),
            LossFunction::Squared => {
                let diff = p - label;
                0.5 * diff * diff
            }
        }
    }

    fn derivative(&self, p: f64, label: f64) -> f64 {
        match self {
            LossFunction::Logistic => {
                let y = label_sign(label);
                -y / (1.0 + (y * p).exp())
            }
            LossFunction::Hinge => {
                let y = label_sign(label);
                if y * p < 1.0 {
                    -y
                } else {
                    0.0
                }
            }
            LossFunction::Perceptron => {
                let y = label_sign(label);
                if y * p <= 0.0 {
                    -y
                } else {
                    0.0
                }
            }
            LossFunction::Squared => p - label,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            LossFunction::Logistic => "Logistic",
            LossFunction::Hinge => "Hinge",
            LossFunction::Perceptron => "Perceptron",
            LossFunction::Squared => "Squared",
        }
    }
}

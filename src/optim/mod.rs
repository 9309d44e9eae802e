//! Gradients and learning-rate schedules for streaming optimization.
//!
//! - [`Gradient`] - sparse per-example gradient with its loss and weight
//! - [`AnnealingSchedule`] - constant, inverse-time, exponential and AdaGrad rates
//! - [`AdaGrad`] - per-dimension adaptive rates from squared-gradient history
//!
//! # Example
//!
//! ```
//! use streamlearn::optim::{AnnealingConfig, AnnealingSchedule, AnnealingType, Gradient};
//! use streamlearn::primitives::SparseVector;
//!
//! let config = AnnealingConfig {
//!     kind: AnnealingType::AdaGrad,
//!     learning_rate: 0.1,
//!     ..Default::default()
//! };
//! let mut schedule = AnnealingSchedule::new(&config).unwrap();
//!
//! let gradient = Gradient::new(SparseVector::from_dense(&[3.0, 0.0, 4.0]), 0.5);
//! schedule.observe(&gradient);
//!
//! assert!((schedule.learning_rate(0, 0) - 1.0 / 3.0).abs() < 1e-12);
//! assert_eq!(schedule.learning_rate(0, 1), 0.1);
//! ```

mod annealing;
mod gradient;

pub use annealing::{AdaGrad, AnnealingConfig, AnnealingSchedule, AnnealingType};
pub use gradient::Gradient;

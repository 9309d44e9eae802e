//! Streamlearn: sparse online learning in pure Rust.
//!
//! Streamlearn trains linear and kernel classifiers one example at a time
//! over sparse, high-dimensional inputs, keeping parameter vectors sparse
//! and bounded with periodic truncation and sign-safe prior shrinkage.
//!
//! # Quick Start
//!
//! ```
//! use streamlearn::prelude::*;
//!
//! let config = TrainingConfig::new(3)
//!     .with_loss(LossFunction::Hinge)
//!     .with_truncation(TruncationConfig {
//!         kind: TruncationType::Truncating,
//!         period: 5,
//!         alpha: 0.01,
//!         theta: 0.5,
//!     });
//! let mut model = SparseLinearLearner::with_config(config).unwrap();
//!
//! let stream = vec![
//!     Instance::new(SparseVector::from_dense(&[1.0, 0.0, 0.0]), 1.0),
//!     Instance::new(SparseVector::from_dense(&[0.0, 0.0, 1.0]), -1.0),
//! ];
//! for _ in 0..10 {
//!     model.update_all(&stream).unwrap();
//! }
//!
//! let x = SparseVector::from_dense(&[1.0, 0.0, 0.0]);
//! assert_eq!(model.predict(&x).unwrap(), 1.0);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Sparse vector type
//! - [`data`]: Labeled, weighted streaming instances
//! - [`loss`]: Pointwise losses (logistic, hinge, perceptron, squared)
//! - [`optim`]: Gradients and learning-rate schedules (AdaGrad included)
//! - [`regularization`]: Priors and periodic gradient truncation
//! - [`kernel`]: Kernel functions for dual-space learners
//! - [`online`]: The online update loop and its configuration
//! - [`classification`]: Budget kernel perceptron

pub mod classification;
pub mod data;
pub mod error;
pub mod kernel;
pub mod loss;
pub mod online;
pub mod optim;
pub mod prelude;
pub mod primitives;
pub mod regularization;

pub use error::{Result, StreamlearnError};
pub use primitives::SparseVector;

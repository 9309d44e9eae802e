//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use streamlearn::prelude::*;
//! ```

pub use crate::classification::BudgetKernelPerceptron;
pub use crate::data::Instance;
pub use crate::kernel::Kernel;
pub use crate::loss::{Loss, LossFunction};
pub use crate::online::{OnlineLearner, SparseLinearLearner, TrainingConfig};
pub use crate::optim::{AnnealingConfig, AnnealingSchedule, AnnealingType, Gradient};
pub use crate::primitives::SparseVector;
pub use crate::regularization::{
    GradientTruncation, Prior, PriorConfig, TruncationConfig, TruncationType,
};

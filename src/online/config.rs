//! Training configuration for the sparse online update loop.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StreamlearnError};
use crate::loss::LossFunction;
use crate::optim::{AnnealingConfig, AnnealingSchedule};
use crate::regularization::{GradientTruncation, PriorConfig, TruncationConfig};

/// Everything needed to build a [`SparseLinearLearner`](super::SparseLinearLearner).
///
/// Passed by value into the constructor; there is no runtime option
/// registry. Missing JSON fields fall back to [`TrainingConfig::default`].
///
/// # Example
///
/// ```
/// use streamlearn::online::TrainingConfig;
/// use streamlearn::regularization::TruncationType;
///
/// let config = TrainingConfig::from_json(r#"{
///     "dimension": 1000,
///     "has_bias": true,
///     "loss": "HINGE",
///     "annealing": { "kind": "ADAGRAD", "learning_rate": 0.5 },
///     "truncation": { "kind": "TRUNCATING", "period": 10, "alpha": 0.01, "theta": 1.0 },
///     "priors": [ { "prior": "LAPLACE", "variance": 10.0 } ]
/// }"#).unwrap();
///
/// assert_eq!(config.dimension, 1000);
/// assert_eq!(config.truncation.kind, TruncationType::Truncating);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of input features (>= 1)
    pub dimension: usize,
    /// Learn an intercept through a constant trailing feature
    pub has_bias: bool,
    /// Loss producing the per-example gradient
    pub loss: LossFunction,
    /// Learning-rate schedule
    pub annealing: AnnealingConfig,
    /// Periodic truncation policy
    pub truncation: TruncationConfig,
    /// Priors applied after every gradient step, in order
    pub priors: Vec<PriorConfig>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dimension: 0,
            has_bias: false,
            loss: LossFunction::default(),
            annealing: AnnealingConfig::default(),
            truncation: TruncationConfig::default(),
            priors: Vec::new(),
        }
    }
}

impl TrainingConfig {
    /// Default configuration for `dimension` features.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON and `InvalidConfiguration`
    /// for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every parameter range without building anything.
    ///
    /// # Errors
    ///
    /// Returns the first `InvalidConfiguration` found.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(StreamlearnError::invalid_configuration(
                "dimension",
                self.dimension,
                ">= 1",
            ));
        }
        AnnealingSchedule::new(&self.annealing)?;
        GradientTruncation::from_config(&self.truncation)?;
        for prior in &self.priors {
            prior.validate()?;
        }
        Ok(())
    }

    /// Enables or disables the trailing bias feature.
    #[must_use]
    pub fn with_bias(mut self, has_bias: bool) -> Self {
        self.has_bias = has_bias;
        self
    }

    /// Sets the loss producing per-example gradients.
    #[must_use]
    pub fn with_loss(mut self, loss: LossFunction) -> Self {
        self.loss = loss;
        self
    }

    /// Sets the learning-rate schedule.
    #[must_use]
    pub fn with_annealing(mut self, annealing: AnnealingConfig) -> Self {
        self.annealing = annealing;
        self
    }

    /// Sets the periodic truncation policy.
    #[must_use]
    pub fn with_truncation(mut self, truncation: TruncationConfig) -> Self {
        self.truncation = truncation;
        self
    }

    /// Appends a prior; priors run in insertion order.
    #[must_use]
    pub fn with_prior(mut self, prior: PriorConfig) -> Self {
        self.priors.push(prior);
        self
    }
}

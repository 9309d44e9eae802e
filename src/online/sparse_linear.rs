//! Sparse linear learner driven by the full online update loop.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{OnlineLearner, TrainingConfig};
use crate::data::{check_dimension, Instance};
use crate::error::{Result, StreamlearnError};
use crate::loss::LossFunction;
use crate::optim::{AnnealingSchedule, Gradient};
use crate::primitives::SparseVector;
use crate::regularization::{GradientTruncation, Prior, PriorConfig};

/// Online linear model over a sparse parameter vector.
///
/// Each call to [`OnlineLearner::update`] runs, in order:
///
/// 1. predict `p = w·x`
/// 2. build the [`Gradient`] of the configured loss at `p`
/// 3. feed it to the schedule (AdaGrad accumulation)
/// 4. `w[i] -= η(t, i) · g[i]` for every set gradient index
/// 5. shrink every stored weight by each prior, sign-safely
/// 6. hand the vector to the truncation policy
///
/// The parameter vector, schedule state and truncation counter are owned
/// by this learner and never shared; replicas (e.g. cross-validation
/// folds) each need their own instance.
///
/// # Example
///
/// ```
/// use streamlearn::data::Instance;
/// use streamlearn::online::{OnlineLearner, SparseLinearLearner, TrainingConfig};
/// use streamlearn::primitives::SparseVector;
///
/// let mut model = SparseLinearLearner::with_config(TrainingConfig::new(3)).unwrap();
///
/// for _ in 0..20 {
///     let pos = Instance::new(SparseVector::from_dense(&[1.0, 0.0, 0.0]), 1.0);
///     let neg = Instance::new(SparseVector::from_dense(&[0.0, 0.0, 1.0]), -1.0);
///     model.update(&pos).unwrap();
///     model.update(&neg).unwrap();
/// }
///
/// assert!(model.parameter(0) > 0.0);
/// assert!(model.parameter(2) < 0.0);
/// assert_eq!(model.parameter(1), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SparseLinearLearnerRaw")]
pub struct SparseLinearLearner {
    /// Input dimension, excluding the bias feature
    dimension: usize,
    has_bias: bool,
    loss: LossFunction,
    weights: SparseVector,
    schedule: AnnealingSchedule,
    priors: Vec<PriorConfig>,
    truncation: GradientTruncation,
    /// Examples processed since construction or reset
    epoch: u64,
}

/// Saved learner state. Nested parts validate themselves; the raw form
/// checks how they fit together.
#[derive(Deserialize)]
struct SparseLinearLearnerRaw {
    dimension: usize,
    has_bias: bool,
    loss: LossFunction,
    weights: SparseVector,
    schedule: AnnealingSchedule,
    priors: Vec<PriorConfig>,
    truncation: GradientTruncation,
    epoch: u64,
}

impl TryFrom<SparseLinearLearnerRaw> for SparseLinearLearner {
    type Error = StreamlearnError;

    fn try_from(raw: SparseLinearLearnerRaw) -> Result<Self> {
        if raw.dimension == 0 {
            return Err(StreamlearnError::invalid_configuration(
                "dimension",
                raw.dimension,
                ">= 1",
            ));
        }
        let model_dimension = raw.dimension + usize::from(raw.has_bias);
        check_dimension("weight dimension", model_dimension, raw.weights.dimension())?;
        for prior in &raw.priors {
            prior.validate()?;
        }
        Ok(Self {
            dimension: raw.dimension,
            has_bias: raw.has_bias,
            loss: raw.loss,
            weights: raw.weights,
            schedule: raw.schedule,
            priors: raw.priors,
            truncation: raw.truncation,
            epoch: raw.epoch,
        })
    }
}

impl SparseLinearLearner {
    /// Learner with default settings for `dimension` features.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `dimension == 0`.
    pub fn new(dimension: usize) -> Result<Self> {
        Self::with_config(TrainingConfig::new(dimension))
    }

    /// Learner built from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for any out-of-range parameter.
    pub fn with_config(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let model_dimension = config.dimension + usize::from(config.has_bias);
        Ok(Self {
            dimension: config.dimension,
            has_bias: config.has_bias,
            loss: config.loss,
            weights: SparseVector::new(model_dimension),
            schedule: AnnealingSchedule::new(&config.annealing)?,
            priors: config.priors,
            truncation: GradientTruncation::from_config(&config.truncation)?,
            epoch: 0,
        })
    }

    /// Read-only view of the parameter vector.
    #[must_use]
    pub fn vector(&self) -> &SparseVector {
        &self.weights
    }

    /// Owned copy of the parameter vector.
    #[must_use]
    pub fn snapshot(&self) -> SparseVector {
        self.weights.clone()
    }

    /// Weight for feature `index`; the bias lives at `dimension()`.
    #[must_use]
    pub fn parameter(&self, index: usize) -> f64 {
        self.weights.get(index)
    }

    /// Intercept, 0.0 when the learner has no bias.
    #[must_use]
    pub fn bias(&self) -> f64 {
        if self.has_bias {
            self.weights.get(self.dimension)
        } else {
            0.0
        }
    }

    /// Input dimension, excluding the bias feature.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Whether a trailing bias feature is learned.
    #[must_use]
    pub fn has_bias(&self) -> bool {
        self.has_bias
    }

    /// Examples processed since construction or reset.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Learning-rate schedule, including any AdaGrad history.
    #[must_use]
    pub fn schedule(&self) -> &AnnealingSchedule {
        &self.schedule
    }

    /// Truncation driver and its epoch counter.
    #[must_use]
    pub fn truncation(&self) -> &GradientTruncation {
        &self.truncation
    }

    /// Sign-safe prior shrinkage over every stored weight except the bias.
    fn apply_priors(&mut self) -> Result<()> {
        let bias_index = self.has_bias.then_some(self.dimension);
        for prior in &self.priors {
            if prior.prior == Prior::Uniform {
                continue;
            }
            let shrunk: Vec<(usize, f64)> = self
                .weights
                .iter()
                .filter(|&(i, _)| Some(i) != bias_index)
                .map(|(i, w)| {
                    let rate = self.schedule.learning_rate(self.epoch, i);
                    (i, w - prior.shrinkage(w, rate))
                })
                .collect();
            for (i, w) in shrunk {
                self.weights.set(i, w)?;
            }
        }
        Ok(())
    }
}

impl OnlineLearner for SparseLinearLearner {
    fn update(&mut self, instance: &Instance) -> Result<f64> {
        check_dimension("instance dimension", self.dimension, instance.dimension())?;

        let x = instance.model_features(self.has_bias);
        let p = self.weights.dot(&x);
        let gradient = Gradient::from_loss(&self.loss, &x, p, instance.label(), instance.weight());

        self.schedule.observe(&gradient);
        for (i, g) in gradient.iter() {
            let rate = self.schedule.learning_rate(self.epoch, i);
            self.weights.accumulate(i, -rate * g)?;
        }

        self.apply_priors()?;
        self.truncation.truncate_parameters(&mut self.weights);

        trace!(
            epoch = self.epoch,
            loss = gradient.loss(),
            nnz = self.weights.nnz(),
            "processed example"
        );
        self.epoch += 1;
        Ok(gradient.loss())
    }

    fn regress(&self, features: &SparseVector) -> Result<f64> {
        check_dimension("instance dimension", self.dimension, features.dimension())?;
        Ok(self.weights.dot(features) + self.bias())
    }

    fn n_samples_seen(&self) -> u64 {
        self.epoch
    }

    fn reset(&mut self) {
        self.weights.clear();
        self.schedule.reset();
        self.truncation.reset();
        self.epoch = 0;
    }
}

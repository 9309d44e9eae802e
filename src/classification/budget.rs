//! Budget-constrained kernel perceptron.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{check_dimension, with_bias_feature, Instance};
use crate::error::{Result, StreamlearnError};
use crate::kernel::Kernel;
use crate::online::OnlineLearner;
use crate::primitives::SparseVector;

/// A retained dual pair: support instance and its multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportVector {
    /// Support instance in model space (bias feature appended when enabled)
    pub instance: SparseVector,
    /// Dual multiplier α
    pub alpha: f64,
}

/// Mistake-driven kernel perceptron with a hard cap on retained support vectors.
///
/// # Algorithm
///
/// For each streamed example `x` with label `y`:
///
/// ```text
/// empty pool        → insert (x, sign(y))
/// pred = Σ αᵢ K(x, xᵢ)
/// act  = sign(y) · weight(x)
/// pred · act ≤ margin → insert (x, act)
/// |pool| > N        → evict argmaxᵢ act · (pred − αᵢ K(x, xᵢ)), lowest index on ties
/// ```
///
/// The pool therefore never holds more than `N` pairs between updates.
///
/// # Example
///
/// ```
/// use streamlearn::classification::BudgetKernelPerceptron;
/// use streamlearn::data::Instance;
/// use streamlearn::kernel::Kernel;
/// use streamlearn::online::OnlineLearner;
/// use streamlearn::primitives::SparseVector;
///
/// let mut model = BudgetKernelPerceptron::new(2, false, Kernel::Linear, 2, 0.1).unwrap();
///
/// for (x, y) in [([1.0, 0.0], 1.0), ([0.0, 1.0], 1.0), ([1.0, 1.0], -1.0)] {
///     model.update(&Instance::new(SparseVector::from_dense(&x), y)).unwrap();
/// }
///
/// assert_eq!(model.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BudgetKernelPerceptronRaw")]
pub struct BudgetKernelPerceptron {
    dimension: usize,
    has_bias: bool,
    kernel: Kernel,
    capacity: usize,
    margin: f64,
    pool: Vec<SupportVector>,
    n_samples: u64,
}

/// Saved perceptron state, revalidated through [`BudgetKernelPerceptron::new`].
#[derive(Deserialize)]
struct BudgetKernelPerceptronRaw {
    dimension: usize,
    has_bias: bool,
    kernel: Kernel,
    capacity: usize,
    margin: f64,
    pool: Vec<SupportVector>,
    n_samples: u64,
}

impl TryFrom<BudgetKernelPerceptronRaw> for BudgetKernelPerceptron {
    type Error = StreamlearnError;

    fn try_from(raw: BudgetKernelPerceptronRaw) -> Result<Self> {
        let mut model = Self::new(
            raw.dimension,
            raw.has_bias,
            raw.kernel,
            raw.capacity,
            raw.margin,
        )?;
        if raw.pool.len() > raw.capacity {
            return Err(StreamlearnError::invalid_configuration(
                "pool",
                raw.pool.len(),
                "at most capacity entries",
            ));
        }
        let model_dimension = raw.dimension + usize::from(raw.has_bias);
        for sv in &raw.pool {
            check_dimension("support vector dimension", model_dimension, sv.instance.dimension())?;
            if !sv.alpha.is_finite() {
                return Err(StreamlearnError::invalid_configuration(
                    "alpha",
                    sv.alpha,
                    "finite",
                ));
            }
        }
        model.pool = raw.pool;
        model.n_samples = raw.n_samples;
        Ok(model)
    }
}

impl BudgetKernelPerceptron {
    /// Creates an empty perceptron.
    ///
    /// # Arguments
    ///
    /// * `dimension` - Number of input features
    /// * `has_bias` - Append a constant `1.0` feature to every instance
    /// * `kernel` - Inner-product oracle
    /// * `capacity` - Maximum pool size `N` (>= 1)
    /// * `margin` - Mistake threshold in `[0, 1]`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for `dimension == 0`, `capacity == 0`,
    /// a margin outside `[0, 1]`, or invalid kernel parameters.
    pub fn new(
        dimension: usize,
        has_bias: bool,
        kernel: Kernel,
        capacity: usize,
        margin: f64,
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(StreamlearnError::invalid_configuration(
                "dimension", dimension, ">= 1",
            ));
        }
        if capacity == 0 {
            return Err(StreamlearnError::invalid_configuration(
                "capacity", capacity, ">= 1",
            ));
        }
        if !(0.0..=1.0).contains(&margin) {
            return Err(StreamlearnError::invalid_configuration(
                "margin",
                margin,
                "in [0, 1]",
            ));
        }
        kernel.validate()?;

        Ok(Self {
            dimension,
            has_bias,
            kernel,
            capacity,
            margin,
            pool: Vec::new(),
            n_samples: 0,
        })
    }

    /// Retained pairs in insertion order.
    #[must_use]
    pub fn pool(&self) -> &[SupportVector] {
        &self.pool
    }

    /// Current pool size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Returns true before the first update or after a reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Maximum pool size `N`.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mistake threshold on `pred · act`.
    #[must_use]
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Inner-product oracle used for every prediction.
    #[must_use]
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Dual multipliers, parallel to [`BudgetKernelPerceptron::pool`].
    #[must_use]
    pub fn alphas(&self) -> Vec<f64> {
        self.pool.iter().map(|sv| sv.alpha).collect()
    }

    /// `Σ αᵢ K(x, xᵢ)` for an instance already in model space.
    fn decision(&self, x: &SparseVector) -> f64 {
        self.pool
            .iter()
            .map(|sv| sv.alpha * self.kernel.compute(x, &sv.instance))
            .sum()
    }

    /// Drops the pair whose removal costs the least on the current example.
    fn evict(&mut self, x: &SparseVector, pred: f64, act: f64) {
        let mut worst = 0;
        let mut worst_score = f64::NEG_INFINITY;
        for (i, sv) in self.pool.iter().enumerate() {
            let score = act * (pred - sv.alpha * self.kernel.compute(x, &sv.instance));
            // strict comparison keeps the earliest index on ties
            if score > worst_score {
                worst = i;
                worst_score = score;
            }
        }
        self.pool.remove(worst);
        debug!(
            evicted = worst,
            score = worst_score,
            pool = self.pool.len(),
            "budget eviction"
        );
    }
}

impl OnlineLearner for BudgetKernelPerceptron {
    fn update(&mut self, instance: &Instance) -> Result<f64> {
        check_dimension("instance dimension", self.dimension, instance.dimension())?;
        let x = instance.model_features(self.has_bias);
        let y = instance.label_sign();
        self.n_samples += 1;

        if self.pool.is_empty() {
            self.pool.push(SupportVector {
                instance: x,
                alpha: y,
            });
            return Ok(0.0);
        }

        let pred = self.decision(&x);
        let act = y * instance.weight();
        let agreement = pred * act;
        if agreement > self.margin {
            return Ok(0.0);
        }

        self.pool.push(SupportVector {
            instance: x.clone(),
            alpha: act,
        });
        if self.pool.len() > self.capacity {
            self.evict(&x, pred, act);
        }
        Ok(self.margin - agreement)
    }

    fn regress(&self, features: &SparseVector) -> Result<f64> {
        check_dimension("instance dimension", self.dimension, features.dimension())?;
        Ok(self.decision(&with_bias_feature(features, self.has_bias)))
    }

    fn n_samples_seen(&self) -> u64 {
        self.n_samples
    }

    fn reset(&mut self) {
        self.pool.clear();
        self.n_samples = 0;
    }
}

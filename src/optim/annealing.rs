//! Learning-rate annealing schedules.
//!
//! # Schedules
//!
//! ```text
//! Constant:     η(t)    = η₀
//! Inverse:      η(t)    = η₀ / (1 + λ t)
//! Exponential:  η(t)    = η₀ · βᵗ
//! AdaGrad:      η(t, i) = η₀                 while Gᵢ = 0
//!                       = 1 / sqrt(Gᵢ)       with Gᵢ = Σ gᵢ²
//! ```
//!
//! Reference: [Duchi et al. 2011] "Adaptive Subgradient Methods for Online
//! Learning and Stochastic Optimization"

use serde::{Deserialize, Serialize};

use super::Gradient;
use crate::error::{Result, StreamlearnError};

/// Schedule family selector, as named by external option layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnealingType {
    #[default]
    Constant,
    Exponential,
    Inverse,
    #[serde(rename = "ADAGRAD")]
    AdaGrad,
}

/// Configuration for an [`AnnealingSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    /// Schedule family
    pub kind: AnnealingType,
    /// Initial learning rate η₀ (> 0)
    pub learning_rate: f64,
    /// Inverse-time decay constant λ (>= 0)
    pub decay: f64,
    /// Exponential base β in (0, 1]
    pub base: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            kind: AnnealingType::Constant,
            learning_rate: 0.1,
            decay: 1e-3,
            base: 0.999,
        }
    }
}

/// Per-dimension adaptive learning rates from the running sum of squared gradients.
///
/// The accumulator is sized lazily from the first gradient it sees and only
/// ever grows.
///
/// # Example
///
/// ```
/// use streamlearn::optim::{AdaGrad, Gradient};
/// use streamlearn::primitives::SparseVector;
///
/// let mut adagrad = AdaGrad::new(0.5).unwrap();
/// assert_eq!(adagrad.learning_rate(0), 0.5);
///
/// adagrad.update(&Gradient::new(SparseVector::from_dense(&[2.0, 0.0]), 1.0));
/// assert_eq!(adagrad.learning_rate(0), 0.5); // 1 / sqrt(4)
/// assert_eq!(adagrad.learning_rate(1), 0.5); // untouched, initial rate
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AdaGradRaw")]
pub struct AdaGrad {
    initial_rate: f64,
    accumulated: Vec<f64>,
}

#[derive(Deserialize)]
struct AdaGradRaw {
    initial_rate: f64,
    accumulated: Vec<f64>,
}

impl TryFrom<AdaGradRaw> for AdaGrad {
    type Error = StreamlearnError;

    fn try_from(raw: AdaGradRaw) -> Result<Self> {
        let mut adagrad = Self::new(raw.initial_rate)?;
        if let Some(&bad) = raw.accumulated.iter().find(|g| !g.is_finite() || **g < 0.0) {
            return Err(StreamlearnError::invalid_configuration(
                "accumulated",
                bad,
                "finite and >= 0",
            ));
        }
        adagrad.accumulated = raw.accumulated;
        Ok(adagrad)
    }
}

impl AdaGrad {
    /// Creates an AdaGrad schedule with the given initial rate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` unless `initial_rate` is finite and positive.
    pub fn new(initial_rate: f64) -> Result<Self> {
        check_rate(initial_rate)?;
        Ok(Self {
            initial_rate,
            accumulated: Vec::new(),
        })
    }

    /// Accumulates `g[i]^2` for every set index of `gradient`.
    pub fn update(&mut self, gradient: &Gradient) {
        if self.accumulated.len() < gradient.dimension() {
            self.accumulated.resize(gradient.dimension(), 0.0);
        }
        for (i, g) in gradient.iter() {
            self.accumulated[i] += g * g;
        }
    }

    /// Rate for `dimension`: the initial rate until a gradient has touched
    /// it, `1 / sqrt(accumulated)` afterwards.
    #[must_use]
    pub fn learning_rate(&self, dimension: usize) -> f64 {
        match self.accumulated.get(dimension) {
            Some(&sum) if sum > 0.0 => 1.0 / sum.sqrt(),
            _ => self.initial_rate,
        }
    }

    /// Accumulated squared gradient for `dimension` (0.0 if never touched).
    #[must_use]
    pub fn accumulated(&self, dimension: usize) -> f64 {
        self.accumulated.get(dimension).copied().unwrap_or(0.0)
    }

    /// Number of dimensions the accumulator currently covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accumulated.len()
    }

    /// Returns true until the first gradient is accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accumulated.is_empty()
    }

    /// Rate reported for dimensions no gradient has touched yet.
    #[must_use]
    pub fn initial_rate(&self) -> f64 {
        self.initial_rate
    }

    /// Forgets all gradient history.
    pub fn reset(&mut self) {
        self.accumulated.clear();
    }
}

/// Learning-rate policy queried once per parameter update.
///
/// Epoch-only schedules ignore the `dimension` argument of
/// [`AnnealingSchedule::learning_rate`]; AdaGrad ignores the epoch.
///
/// # Example
///
/// ```
/// use streamlearn::optim::AnnealingSchedule;
///
/// let schedule = AnnealingSchedule::inverse(1.0, 0.5).unwrap();
/// assert_eq!(schedule.epoch_rate(0), 1.0);
/// assert_eq!(schedule.epoch_rate(2), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnnealingScheduleRaw")]
pub enum AnnealingSchedule {
    /// Fixed rate
    Constant {
        /// η₀
        rate: f64,
    },
    /// Inverse-time decay
    Inverse {
        /// η₀
        rate: f64,
        /// λ
        decay: f64,
    },
    /// Exponential decay
    Exponential {
        /// η₀
        rate: f64,
        /// β
        base: f64,
    },
    /// Per-dimension adaptive rates
    AdaGrad(AdaGrad),
}

#[derive(Deserialize)]
enum AnnealingScheduleRaw {
    Constant { rate: f64 },
    Inverse { rate: f64, decay: f64 },
    Exponential { rate: f64, base: f64 },
    AdaGrad(AdaGrad),
}

impl TryFrom<AnnealingScheduleRaw> for AnnealingSchedule {
    type Error = StreamlearnError;

    fn try_from(raw: AnnealingScheduleRaw) -> Result<Self> {
        match raw {
            AnnealingScheduleRaw::Constant { rate } => Self::constant(rate),
            AnnealingScheduleRaw::Inverse { rate, decay } => Self::inverse(rate, decay),
            AnnealingScheduleRaw::Exponential { rate, base } => Self::exponential(rate, base),
            AnnealingScheduleRaw::AdaGrad(adagrad) => Ok(Self::AdaGrad(adagrad)),
        }
    }
}

impl AnnealingSchedule {
    /// Builds the schedule described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for out-of-range parameters.
    pub fn new(config: &AnnealingConfig) -> Result<Self> {
        match config.kind {
            AnnealingType::Constant => Self::constant(config.learning_rate),
            AnnealingType::Inverse => Self::inverse(config.learning_rate, config.decay),
            AnnealingType::Exponential => Self::exponential(config.learning_rate, config.base),
            AnnealingType::AdaGrad => Ok(Self::AdaGrad(AdaGrad::new(config.learning_rate)?)),
        }
    }

    /// Constant schedule.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` unless `rate` is finite and positive.
    pub fn constant(rate: f64) -> Result<Self> {
        check_rate(rate)?;
        Ok(Self::Constant { rate })
    }

    /// Inverse-time decay `rate / (1 + decay * epoch)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a non-positive rate or negative decay.
    pub fn inverse(rate: f64, decay: f64) -> Result<Self> {
        check_rate(rate)?;
        if !decay.is_finite() || decay < 0.0 {
            return Err(StreamlearnError::invalid_configuration(
                "decay",
                decay,
                "finite and >= 0",
            ));
        }
        Ok(Self::Inverse { rate, decay })
    }

    /// Exponential decay `rate * base^epoch`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a non-positive rate or `base` outside (0, 1].
    pub fn exponential(rate: f64, base: f64) -> Result<Self> {
        check_rate(rate)?;
        if !(base > 0.0 && base <= 1.0) {
            return Err(StreamlearnError::invalid_configuration(
                "base",
                base,
                "in (0, 1]",
            ));
        }
        Ok(Self::Exponential { rate, base })
    }

    /// AdaGrad schedule starting from `rate`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` unless `rate` is finite and positive.
    pub fn adagrad(rate: f64) -> Result<Self> {
        Ok(Self::AdaGrad(AdaGrad::new(rate)?))
    }

    /// Family of this schedule.
    #[must_use]
    pub fn kind(&self) -> AnnealingType {
        match self {
            Self::Constant { .. } => AnnealingType::Constant,
            Self::Inverse { .. } => AnnealingType::Inverse,
            Self::Exponential { .. } => AnnealingType::Exponential,
            Self::AdaGrad(_) => AnnealingType::AdaGrad,
        }
    }

    /// Epoch-only rate. AdaGrad reports its initial rate.
    #[must_use]
    pub fn epoch_rate(&self, epoch: u64) -> f64 {
        match self {
            Self::Constant { rate } => *rate,
            Self::Inverse { rate, decay } => rate / (1.0 + decay * epoch as f64),
            Self::Exponential { rate, base } => rate * base.powf(epoch as f64),
            Self::AdaGrad(adagrad) => adagrad.initial_rate(),
        }
    }

    /// Rate for updating parameter `dimension` at `epoch`.
    #[must_use]
    pub fn learning_rate(&self, epoch: u64, dimension: usize) -> f64 {
        match self {
            Self::AdaGrad(adagrad) => adagrad.learning_rate(dimension),
            _ => self.epoch_rate(epoch),
        }
    }

    /// Feeds one observed gradient to the schedule.
    ///
    /// Must run once per example before that example's rate queries.
    /// A no-op for epoch-only schedules.
    pub fn observe(&mut self, gradient: &Gradient) {
        if let Self::AdaGrad(adagrad) = self {
            adagrad.update(gradient);
        }
    }

    /// Clears any gradient history.
    pub fn reset(&mut self) {
        if let Self::AdaGrad(adagrad) = self {
            adagrad.reset();
        }
    }
}

fn check_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(StreamlearnError::invalid_configuration(
            "learning_rate",
            rate,
            "finite and > 0",
        ));
    }
    Ok(())
}

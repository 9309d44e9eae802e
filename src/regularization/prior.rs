//! Per-parameter shrinkage under assumed priors.

use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StreamlearnError};

/// Prior assumed over each individual parameter.
///
/// Stateless: every method is a pure function of the parameter value and
/// the prior's variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Prior {
    /// Flat prior, no shrinkage
    #[default]
    Uniform,
    /// Normal prior, L2-style shrinkage
    Gaussian,
    /// Laplace prior, L1-style constant-magnitude shrinkage
    Laplace,
    /// Cauchy prior, heavy-tailed shrinkage that fades for large weights
    Cauchy,
    /// Plain quadratic penalty `w^2 / 2`
    Squared,
}

impl Prior {
    /// Gradient of the log prior density at `w`.
    ///
    /// ```text
    /// uniform   0
    /// gaussian  -w / σ²
    /// laplace   -√2 · sign(w) / σ
    /// cauchy    -2w / (w² + σ²)
    /// squared   -w
    /// ```
    ///
    /// The value points toward zero and is not clamped.
    #[must_use]
    pub fn log_prior_gradient(self, w: f64, variance: f64) -> f64 {
        match self {
            Prior::Uniform => 0.0,
            Prior::Gaussian => -w / (variance * variance),
            Prior::Laplace => -SQRT_2 * sign(w) / variance,
            Prior::Cauchy => -2.0 * w / (w * w + variance * variance),
            Prior::Squared => -w,
        }
    }

    /// Sign-safe shrinkage amount to subtract from `w`.
    ///
    /// Equal to the negated log-prior gradient, except when `w - g` would
    /// cross zero: then `g = w` and the step lands exactly on zero.
    ///
    /// # Example
    ///
    /// ```
    /// use streamlearn::regularization::Prior;
    ///
    /// // Small variance, huge Gaussian pull: clamped to land on zero
    /// let g = Prior::Gaussian.gradient(0.5, 0.1);
    /// assert_eq!(0.5 - g, 0.0);
    ///
    /// // Mild pull is left alone
    /// let g = Prior::Gaussian.gradient(0.5, 10.0);
    /// assert!((g - 0.005).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn gradient(self, w: f64, variance: f64) -> f64 {
        self.gradient_scaled(w, variance, 1.0)
    }

    /// Like [`Prior::gradient`] with the step pre-multiplied by a learning rate.
    ///
    /// The clamp is applied after scaling, so `w - g` never changes sign
    /// whatever the rate.
    #[must_use]
    pub fn gradient_scaled(self, w: f64, variance: f64, rate: f64) -> f64 {
        let loss = -rate * self.log_prior_gradient(w, variance);
        if sign(w) != sign(w - loss) {
            w
        } else {
            loss
        }
    }
}

/// A prior together with its variance, as supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorConfig {
    pub prior: Prior,
    pub variance: f64,
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            prior: Prior::Uniform,
            variance: 1.0,
        }
    }
}

impl PriorConfig {
    /// Validated prior configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` unless `variance` is finite and positive.
    pub fn new(prior: Prior, variance: f64) -> Result<Self> {
        let config = Self { prior, variance };
        config.validate()?;
        Ok(config)
    }

    /// Checks the variance range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` unless `variance` is finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !self.variance.is_finite() || self.variance <= 0.0 {
            return Err(StreamlearnError::invalid_configuration(
                "variance",
                self.variance,
                "finite and > 0",
            ));
        }
        Ok(())
    }

    /// Sign-safe shrinkage for `w` at learning rate `rate`.
    #[must_use]
    pub fn shrinkage(&self, w: f64, rate: f64) -> f64 {
        self.prior.gradient_scaled(w, self.variance, rate)
    }
}

/// Three-valued sign: `0.0` for zero (and NaN), unlike `f64::signum`.
pub(crate) fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

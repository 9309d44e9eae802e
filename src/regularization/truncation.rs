//! Periodic whole-vector truncation.
//!
//! A [`GradientTruncation`] counts epochs and, every `period` of them,
//! rewrites the parameter vector in place to enforce sparsity or a norm
//! bound. Between trigger epochs it leaves the vector untouched.
//!
//! # References
//!
//! - [Langford, Li & Zhang 2009] "Sparse Online Learning via Truncated Gradient"
//! - [Shalev-Shwartz et al. 2007] "Pegasos: Primal Estimated sub-GrAdient SOlver for SVM"
//! - [Duchi et al. 2008] "Efficient Projections onto the l1-Ball for Learning in High Dimensions"

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StreamlearnError};
use crate::primitives::SparseVector;

/// Truncation family selector, as named by external option layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TruncationType {
    #[default]
    None,
    Rounding,
    Truncating,
    Pegasos,
    #[serde(rename = "MODDUCHI")]
    ModDuchi,
}

/// Configuration for a [`GradientTruncation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationConfig {
    pub kind: TruncationType,
    /// Apply every `period` epochs (>= 1)
    pub period: u64,
    /// Shrink amount / ball parameter / L0 budget, depending on `kind`
    pub alpha: f64,
    /// Magnitude window for rounding and truncation
    pub theta: f64,
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            kind: TruncationType::None,
            period: 1,
            alpha: 0.0,
            theta: 0.0,
        }
    }
}

/// Whole-vector transform applied on trigger epochs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TruncationPolicy {
    /// Never changes the vector.
    Null,
    /// Zero every value with `|v| < theta`.
    Rounding { theta: f64 },
    /// Shrink values inside `[-theta, theta]` toward zero by `alpha`, never past it.
    TruncatedGradient { alpha: f64, theta: f64 },
    /// Project onto the L2 ball of radius `1 / sqrt(alpha)`.
    Pegasos { alpha: f64 },
    /// Truncated-gradient shrink by `tau = max(0, alpha - L0) / L0` inside `[-theta, theta]`.
    ModifiedDuchi { alpha: f64, theta: f64 },
}

impl TruncationPolicy {
    /// Policy for `kind` with the given parameters.
    #[must_use]
    pub fn from_kind(kind: TruncationType, alpha: f64, theta: f64) -> Self {
        match kind {
            TruncationType::None => Self::Null,
            TruncationType::Rounding => Self::Rounding { theta },
            TruncationType::Truncating => Self::TruncatedGradient { alpha, theta },
            TruncationType::Pegasos => Self::Pegasos { alpha },
            TruncationType::ModDuchi => Self::ModifiedDuchi { alpha, theta },
        }
    }

    /// Family this policy belongs to.
    #[must_use]
    pub fn kind(&self) -> TruncationType {
        match self {
            Self::Null => TruncationType::None,
            Self::Rounding { .. } => TruncationType::Rounding,
            Self::TruncatedGradient { .. } => TruncationType::Truncating,
            Self::Pegasos { .. } => TruncationType::Pegasos,
            Self::ModifiedDuchi { .. } => TruncationType::ModDuchi,
        }
    }

    /// `(alpha, theta)`, with 0.0 for parameters the policy does not use.
    fn parameters(&self) -> (f64, f64) {
        match *self {
            Self::Null => (0.0, 0.0),
            Self::Rounding { theta } => (0.0, theta),
            Self::TruncatedGradient { alpha, theta } | Self::ModifiedDuchi { alpha, theta } => {
                (alpha, theta)
            }
            Self::Pegasos { alpha } => (alpha, 0.0),
        }
    }

    /// Runs the transform unconditionally.
    pub fn apply(&self, v: &mut SparseVector) {
        match *self {
            Self::Null => {}
            Self::Rounding { theta } => {
                v.retain_map(|x| if x.abs() < theta { 0.0 } else { x });
            }
            Self::TruncatedGradient { alpha, theta } => truncate(v, alpha, theta),
            Self::Pegasos { alpha } => project_l2_ball(v, alpha),
            Self::ModifiedDuchi { alpha, theta } => {
                let l0 = v.norm_l0();
                if l0 == 0.0 {
                    return;
                }
                let c = (alpha - l0).max(0.0);
                if c == 0.0 {
                    return;
                }
                truncate(v, c / l0, theta);
            }
        }
    }
}

fn truncate(v: &mut SparseVector, shrink: f64, theta: f64) {
    v.retain_map(|x| {
        if (0.0..=theta).contains(&x) {
            (x - shrink).max(0.0)
        } else if x < 0.0 && x >= -theta {
            (x + shrink).min(0.0)
        } else {
            x
        }
    });
}

fn project_l2_ball(v: &mut SparseVector, alpha: f64) {
    if alpha <= 0.0 {
        return;
    }
    let norm = v.norm_l2();
    if norm == 0.0 {
        return;
    }
    let ratio = (1.0 / alpha.sqrt()) / norm;
    if ratio >= 1.0 {
        return;
    }
    v.scale(ratio);
}

/// Phase of a truncation counter at a given epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationState {
    /// `epoch mod period != 0`: the vector is left alone
    Waiting,
    /// `epoch mod period == 0`: the policy runs once
    Applying,
}

/// Epoch-counting truncation driver.
///
/// # Example
///
/// ```
/// use streamlearn::primitives::SparseVector;
/// use streamlearn::regularization::{GradientTruncation, TruncationType};
///
/// let mut truncation = GradientTruncation::new(TruncationType::Rounding, 2, 0.0, 0.5).unwrap();
/// let mut v = SparseVector::from_dense(&[0.3, 0.9, -0.4]);
///
/// truncation.truncate_parameters(&mut v); // epoch 1: waiting
/// assert_eq!(v.nnz(), 3);
///
/// truncation.truncate_parameters(&mut v); // epoch 2: applied
/// assert_eq!(v.nnz(), 1);
/// assert_eq!(v.get(1), 0.9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GradientTruncationRaw")]
pub struct GradientTruncation {
    policy: TruncationPolicy,
    period: u64,
    epoch: u64,
    last_applied: Option<u64>,
}

/// Saved truncation state, revalidated through [`GradientTruncation::new`].
#[derive(Deserialize)]
struct GradientTruncationRaw {
    policy: TruncationPolicy,
    period: u64,
    epoch: u64,
    last_applied: Option<u64>,
}

impl TryFrom<GradientTruncationRaw> for GradientTruncation {
    type Error = StreamlearnError;

    fn try_from(raw: GradientTruncationRaw) -> Result<Self> {
        let (alpha, theta) = raw.policy.parameters();
        let mut truncation = Self::new(raw.policy.kind(), raw.period, alpha, theta)?;
        truncation.epoch = raw.epoch;
        truncation.last_applied = raw.last_applied;
        Ok(truncation)
    }
}

impl Default for GradientTruncation {
    fn default() -> Self {
        Self {
            policy: TruncationPolicy::Null,
            period: 1,
            epoch: 0,
            last_applied: None,
        }
    }
}

impl GradientTruncation {
    /// Creates a truncation driver.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `period == 0` or `alpha`/`theta`
    /// are negative or non-finite.
    pub fn new(kind: TruncationType, period: u64, alpha: f64, theta: f64) -> Result<Self> {
        if period == 0 {
            return Err(StreamlearnError::invalid_configuration(
                "period", period, ">= 1",
            ));
        }
        for (name, value) in [("alpha", alpha), ("theta", theta)] {
            if !value.is_finite() || value < 0.0 {
                return Err(StreamlearnError::invalid_configuration(
                    name,
                    value,
                    "finite and >= 0",
                ));
            }
        }
        Ok(Self {
            policy: TruncationPolicy::from_kind(kind, alpha, theta),
            period,
            epoch: 0,
            last_applied: None,
        })
    }

    /// Creates a truncation driver from configuration.
    ///
    /// # Errors
    ///
    /// See [`GradientTruncation::new`].
    pub fn from_config(config: &TruncationConfig) -> Result<Self> {
        Self::new(config.kind, config.period, config.alpha, config.theta)
    }

    /// Transform run on trigger epochs.
    #[must_use]
    pub fn policy(&self) -> TruncationPolicy {
        self.policy
    }

    /// Number of epochs between two applications.
    #[must_use]
    pub fn period(&self) -> u64 {
        self.period
    }

    /// Epoch of the most recent call.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Phase at an arbitrary epoch.
    #[must_use]
    pub fn state_at(&self, epoch: u64) -> TruncationState {
        if epoch % self.period == 0 {
            TruncationState::Applying
        } else {
            TruncationState::Waiting
        }
    }

    /// Phase the next [`GradientTruncation::truncate_parameters`] call runs in.
    #[must_use]
    pub fn state(&self) -> TruncationState {
        self.state_at(self.epoch + 1)
    }

    /// Advances the epoch by one and truncates if it is a trigger epoch.
    pub fn truncate_parameters<'a>(&mut self, v: &'a mut SparseVector) -> &'a mut SparseVector {
        let next = self.epoch + 1;
        self.truncate_parameters_at(next, v)
    }

    /// Truncates at an explicit epoch.
    ///
    /// The policy runs at most once per trigger epoch: repeating the call
    /// with the same epoch leaves the vector unchanged.
    pub fn truncate_parameters_at<'a>(
        &mut self,
        epoch: u64,
        v: &'a mut SparseVector,
    ) -> &'a mut SparseVector {
        self.epoch = epoch;
        if self.state_at(epoch) == TruncationState::Waiting || self.last_applied == Some(epoch) {
            return v;
        }
        let before = v.nnz();
        self.policy.apply(v);
        self.last_applied = Some(epoch);
        debug!(
            policy = ?self.policy.kind(),
            epoch,
            nnz_before = before,
            nnz_after = v.nnz(),
            "applied truncation"
        );
        v
    }

    /// Runs the policy now, ignoring the epoch counter.
    pub fn apply(&self, v: &mut SparseVector) {
        self.policy.apply(v);
    }

    /// Rewinds the epoch counter.
    pub fn reset(&mut self) {
        self.epoch = 0;
        self.last_applied = None;
    }
}

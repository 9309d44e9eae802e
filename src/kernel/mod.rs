//! Kernel functions used as inner-product oracles by dual-space learners.
//!
//! ```text
//! Linear                   K(x, y) = <x, y>
//! Polynomial               K(x, y) = <x, y>^d
//! InhomogeneousPolynomial  K(x, y) = (<x, y> + c)^d
//! Rbf                      K(x, y) = exp(-γ ||x - y||²)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, StreamlearnError};
use crate::primitives::SparseVector;

/// Kernel selected once at construction.
///
/// # Example
///
/// ```
/// use streamlearn::kernel::Kernel;
/// use streamlearn::primitives::SparseVector;
///
/// let x = SparseVector::from_dense(&[1.0, 2.0]);
/// let y = SparseVector::from_dense(&[3.0, 0.0]);
///
/// let quadratic = Kernel::inhomogeneous_polynomial(2, 1.0).unwrap();
/// assert_eq!(quadratic.compute(&x, &y), 16.0);
/// assert_eq!(Kernel::Linear.compute(&x, &y), 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    try_from = "KernelRaw"
)]
pub enum Kernel {
    #[default]
    Linear,
    Polynomial {
        degree: u32,
    },
    InhomogeneousPolynomial {
        degree: u32,
        coef0: f64,
    },
    Rbf {
        gamma: f64,
    },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum KernelRaw {
    Linear,
    Polynomial { degree: u32 },
    InhomogeneousPolynomial { degree: u32, coef0: f64 },
    Rbf { gamma: f64 },
}

impl TryFrom<KernelRaw> for Kernel {
    type Error = StreamlearnError;

    fn try_from(raw: KernelRaw) -> Result<Self> {
        match raw {
            KernelRaw::Linear => Ok(Self::Linear),
            KernelRaw::Polynomial { degree } => Self::polynomial(degree),
            KernelRaw::InhomogeneousPolynomial { degree, coef0 } => {
                Self::inhomogeneous_polynomial(degree, coef0)
            }
            KernelRaw::Rbf { gamma } => Self::rbf(gamma),
        }
    }
}

impl Kernel {
    /// Homogeneous polynomial kernel.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `degree == 0`.
    pub fn polynomial(degree: u32) -> Result<Self> {
        let kernel = Self::Polynomial { degree };
        kernel.validate()?;
        Ok(kernel)
    }

    /// Inhomogeneous polynomial kernel.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `degree == 0` or `coef0` is negative.
    pub fn inhomogeneous_polynomial(degree: u32, coef0: f64) -> Result<Self> {
        let kernel = Self::InhomogeneousPolynomial { degree, coef0 };
        kernel.validate()?;
        Ok(kernel)
    }

    /// Gaussian RBF kernel.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` unless `gamma` is finite and positive.
    pub fn rbf(gamma: f64) -> Result<Self> {
        let kernel = Self::Rbf { gamma };
        kernel.validate()?;
        Ok(kernel)
    }

    /// Checks parameter ranges (also needed after deserialization).
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for out-of-range parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Linear => Ok(()),
            Self::Polynomial { degree } => check_degree(degree),
            Self::InhomogeneousPolynomial { degree, coef0 } => {
                check_degree(degree)?;
                if !coef0.is_finite() || coef0 < 0.0 {
                    return Err(StreamlearnError::invalid_configuration(
                        "coef0",
                        coef0,
                        "finite and >= 0",
                    ));
                }
                Ok(())
            }
            Self::Rbf { gamma } => {
                if !gamma.is_finite() || gamma <= 0.0 {
                    return Err(StreamlearnError::invalid_configuration(
                        "gamma",
                        gamma,
                        "finite and > 0",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Evaluates `K(x, y)`.
    #[must_use]
    pub fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        match *self {
            Self::Linear => x.dot(y),
            Self::Polynomial { degree } => pow(x.dot(y), degree),
            Self::InhomogeneousPolynomial { degree, coef0 } => pow(x.dot(y) + coef0, degree),
            Self::Rbf { gamma } => (-gamma * x.squared_distance(y)).exp(),
        }
    }
}

fn check_degree(degree: u32) -> Result<()> {
    if degree == 0 {
        return Err(StreamlearnError::invalid_configuration(
            "degree", degree, ">= 1",
        ));
    }
    Ok(())
}

fn pow(base: f64, degree: u32) -> f64 {
    i32::try_from(degree).map_or_else(|_| base.powf(f64::from(degree)), |d| base.powi(d))
}

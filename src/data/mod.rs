//! Labeled streaming examples.
//!
//! Ingestion (CSV, text, files) lives outside this crate; collaborators
//! hand learners fully-built [`Instance`] values.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StreamlearnError};
use crate::primitives::SparseVector;

/// A labeled, weighted sparse example.
///
/// # Examples
///
/// ```
/// use streamlearn::data::Instance;
/// use streamlearn::primitives::SparseVector;
///
/// let x = SparseVector::from_dense(&[1.0, 0.0, 2.0]);
/// let instance = Instance::new(x, -1.0).with_weight(2.0).unwrap();
/// assert_eq!(instance.weight(), 2.0);
/// assert_eq!(instance.label_sign(), -1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstanceRaw")]
pub struct Instance {
    features: SparseVector,
    label: f64,
    weight: f64,
}

#[derive(Deserialize)]
struct InstanceRaw {
    features: SparseVector,
    label: f64,
    weight: f64,
}

impl TryFrom<InstanceRaw> for Instance {
    type Error = StreamlearnError;

    fn try_from(raw: InstanceRaw) -> Result<Self> {
        Instance::new(raw.features, raw.label).with_weight(raw.weight)
    }
}

impl Instance {
    /// Creates an instance with the default weight of 1.0.
    #[must_use]
    pub fn new(features: SparseVector, label: f64) -> Self {
        Self {
            features,
            label,
            weight: 1.0,
        }
    }

    /// Sets the instance weight.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for negative or non-finite weights.
    pub fn with_weight(mut self, weight: f64) -> Result<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(StreamlearnError::invalid_configuration(
                "weight",
                weight,
                "finite and >= 0",
            ));
        }
        self.weight = weight;
        Ok(self)
    }

    /// Sparse feature vector, without any bias feature.
    #[must_use]
    pub fn features(&self) -> &SparseVector {
        &self.features
    }

    /// Raw label as supplied.
    #[must_use]
    pub fn label(&self) -> f64 {
        self.label
    }

    /// Importance weight, 1.0 unless set.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Logical dimension of the feature vector.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.features.dimension()
    }

    /// Binary class as `+1.0` for positive labels, `-1.0` otherwise.
    #[must_use]
    pub fn label_sign(&self) -> f64 {
        if self.label > 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Features as seen by a learner, with the bias feature appended when requested.
    pub(crate) fn model_features(&self, has_bias: bool) -> SparseVector {
        with_bias_feature(&self.features, has_bias)
    }
}

/// `features` in model space: a constant `1.0` appended at index `d` when
/// `has_bias`, an unchanged copy otherwise.
pub(crate) fn with_bias_feature(features: &SparseVector, has_bias: bool) -> SparseVector {
    if has_bias {
        features.augmented(1.0)
    } else {
        features.clone()
    }
}

/// Rejects an input whose dimension differs from the model's.
pub(crate) fn check_dimension(context: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(StreamlearnError::dimension_mismatch(context, expected, actual));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weight() {
        let instance = Instance::new(SparseVector::new(3), 1.0);
        assert_eq!(instance.weight(), 1.0);
        assert_eq!(instance.dimension(), 3);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let result = Instance::new(SparseVector::new(3), 1.0).with_weight(-0.5);
        assert!(matches!(
            result,
            Err(StreamlearnError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_nan_weight_rejected() {
        assert!(Instance::new(SparseVector::new(1), 1.0)
            .with_weight(f64::NAN)
            .is_err());
    }

    #[test]
    fn test_label_sign() {
        let x = SparseVector::new(1);
        assert_eq!(Instance::new(x.clone(), 1.0).label_sign(), 1.0);
        assert_eq!(Instance::new(x.clone(), 0.0).label_sign(), -1.0);
        assert_eq!(Instance::new(x, -3.0).label_sign(), -1.0);
    }

    #[test]
    fn test_model_features_bias() {
        let x = SparseVector::from_dense(&[2.0, 0.0]);
        let instance = Instance::new(x, 1.0);
        let plain = instance.model_features(false);
        let biased = instance.model_features(true);
        assert_eq!(plain.dimension(), 2);
        assert_eq!(biased.dimension(), 3);
        assert_eq!(biased.get(2), 1.0);
    }

    #[test]
    fn test_check_dimension() {
        assert!(check_dimension("features", 3, 3).is_ok());
        let err = check_dimension("features", 3, 4).unwrap_err();
        assert!(matches!(err, StreamlearnError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_deserialize_rejects_negative_weight() {
        let instance = Instance::new(SparseVector::from_dense(&[1.0]), 1.0);
        let mut value = serde_json::to_value(&instance).unwrap();
        value["weight"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<Instance>(value).is_err());
    }

    #[test]
    fn test_with_bias_feature() {
        let x = SparseVector::from_dense(&[0.0, 3.0]);
        assert_eq!(with_bias_feature(&x, false), x);
        let biased = with_bias_feature(&x, true);
        assert_eq!(biased.dimension(), 3);
        assert_eq!(biased.get(2), 1.0);
        assert_eq!(biased.get(1), 3.0);
    }
}

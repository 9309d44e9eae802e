use super::prior::sign;
use super::*;
use crate::error::StreamlearnError;
use crate::primitives::SparseVector;

const PRIORS: [Prior; 5] = [
    Prior::Uniform,
    Prior::Gaussian,
    Prior::Laplace,
    Prior::Cauchy,
    Prior::Squared,
];

// ==================== Priors ====================

#[test]
fn test_log_prior_gradient_formulas() {
    let (w, s) = (0.5, 2.0);
    assert_eq!(Prior::Uniform.log_prior_gradient(w, s), 0.0);
    assert!((Prior::Gaussian.log_prior_gradient(w, s) + 0.125).abs() < 1e-12);
    assert!((Prior::Laplace.log_prior_gradient(w, s) + 2.0_f64.sqrt() / 2.0).abs() < 1e-12);
    assert!((Prior::Cauchy.log_prior_gradient(w, s) + 1.0 / 4.25).abs() < 1e-12);
    assert_eq!(Prior::Squared.log_prior_gradient(w, s), -0.5);
}

#[test]
fn test_log_prior_gradient_points_toward_zero() {
    for prior in PRIORS {
        for w in [-3.0, -0.2, 0.2, 3.0] {
            let g = prior.log_prior_gradient(w, 1.5);
            assert!(g * w <= 0.0, "{prior:?} at {w} gave {g}");
        }
    }
}

#[test]
fn test_gradient_unclamped_when_small() {
    // Laplace with large variance: sqrt(2)/100 shrink on w = 1
    let g = Prior::Laplace.gradient(1.0, 100.0);
    assert!((g - 2.0_f64.sqrt() / 100.0).abs() < 1e-12);
    let g = Prior::Laplace.gradient(-1.0, 100.0);
    assert!((g + 2.0_f64.sqrt() / 100.0).abs() < 1e-12);
}

#[test]
fn test_gradient_clamps_to_zero_on_sign_flip() {
    for prior in [Prior::Gaussian, Prior::Laplace] {
        for w in [0.01, -0.01] {
            let g = prior.gradient(w, 0.01);
            assert_eq!(g, w, "{prior:?} should clamp at {w}");
            assert_eq!(w - g, 0.0);
        }
    }
}

#[test]
fn test_squared_prior_lands_exactly_on_zero() {
    // -w shrink subtracts the whole parameter
    let g = Prior::Squared.gradient(-0.75, 1.0);
    assert_eq!(-0.75 - g, 0.0);
}

#[test]
fn test_gradient_scaled_never_flips_sign() {
    for prior in PRIORS {
        for w in [-10.0, -1.0, -1e-6, 1e-6, 1.0, 10.0] {
            for rate in [0.001, 0.5, 1.0, 100.0] {
                let g = prior.gradient_scaled(w, 0.3, rate);
                assert!((w - g) * w >= 0.0, "{prior:?} w={w} rate={rate} g={g}");
            }
        }
    }
}

#[test]
fn test_zero_parameter_has_zero_gradient() {
    for prior in PRIORS {
        assert_eq!(prior.gradient(0.0, 1.0), 0.0);
    }
}

#[test]
fn test_prior_config_validation() {
    assert!(PriorConfig::new(Prior::Gaussian, 1.0).is_ok());
    let err = PriorConfig::new(Prior::Gaussian, 0.0).unwrap_err();
    assert!(matches!(err, StreamlearnError::InvalidConfiguration { .. }));
    assert!(PriorConfig::new(Prior::Cauchy, f64::INFINITY).is_err());
}

#[test]
fn test_prior_config_shrinkage_uses_rate() {
    let config = PriorConfig::new(Prior::Squared, 1.0).unwrap();
    assert!((config.shrinkage(2.0, 0.1) - 0.2).abs() < 1e-12);
}

#[test]
fn test_sign_helper() {
    assert_eq!(sign(2.0), 1.0);
    assert_eq!(sign(-2.0), -1.0);
    assert_eq!(sign(0.0), 0.0);
    assert_eq!(sign(-0.0), 0.0);
}

// ==================== Truncation policies ====================

fn applied(kind: TruncationType, alpha: f64, theta: f64, values: &[f64]) -> SparseVector {
    let mut v = SparseVector::from_dense(values);
    let mut t = GradientTruncation::new(kind, 1, alpha, theta).unwrap();
    t.truncate_parameters(&mut v);
    v
}

#[test]
fn test_rounding_scenario() {
    let v = applied(TruncationType::Rounding, 0.0, 0.5, &[0.3, 0.9, -0.4]);
    assert_eq!(v.nnz(), 1);
    assert_eq!(v.get(1), 0.9);
    assert_eq!(v.norm_l0(), 1.0);
}

#[test]
fn test_truncated_gradient_scenario() {
    let v = applied(TruncationType::Truncating, 0.2, 1.0, &[0.15, 0.5, -0.1]);
    assert_eq!(v.get(0), 0.0);
    assert!((v.get(1) - 0.3).abs() < 1e-12);
    assert_eq!(v.get(2), 0.0);
    assert_eq!(v.nnz(), 1);
}

#[test]
fn test_truncated_gradient_leaves_large_values() {
    let v = applied(TruncationType::Truncating, 0.2, 1.0, &[1.5, -2.0, -0.5]);
    assert_eq!(v.get(0), 1.5);
    assert_eq!(v.get(1), -2.0);
    assert!((v.get(2) + 0.3).abs() < 1e-12);
}

#[test]
fn test_pegasos_projects_onto_ball() {
    // radius 1/sqrt(0.04) = 5, vector norm 10
    let v = applied(TruncationType::Pegasos, 0.04, 0.0, &[6.0, 8.0]);
    assert!((v.norm_l2() - 5.0).abs() < 1e-9);
    assert!((v.get(0) - 3.0).abs() < 1e-9);
    assert!((v.get(1) - 4.0).abs() < 1e-9);
}

#[test]
fn test_pegasos_inside_ball_untouched() {
    let original = SparseVector::from_dense(&[0.1, -0.2, 0.3]);
    let v = applied(TruncationType::Pegasos, 1.0, 0.0, &[0.1, -0.2, 0.3]);
    assert_eq!(v, original);
}

#[test]
fn test_pegasos_degenerate_cases() {
    let zero = applied(TruncationType::Pegasos, 1.0, 0.0, &[0.0, 0.0]);
    assert!(zero.is_empty());
    let no_alpha = applied(TruncationType::Pegasos, 0.0, 0.0, &[100.0]);
    assert_eq!(no_alpha.get(0), 100.0);
}

#[test]
fn test_modified_duchi_noop_when_over_budget() {
    // alpha <= L0 gives c = 0
    let v = applied(TruncationType::ModDuchi, 2.0, 1.0, &[0.1, 0.2, 0.3]);
    assert_eq!(v, SparseVector::from_dense(&[0.1, 0.2, 0.3]));
}

#[test]
fn test_modified_duchi_shrinks_by_tau() {
    // L0 = 3 (the zero is not stored), alpha = 3 -> c = 0, unchanged
    let v = applied(TruncationType::ModDuchi, 3.0, 1.0, &[0.75, 0.0, -0.25, 4.0]);
    assert_eq!(v.nnz(), 3);

    // L0 = 2, alpha = 3 -> c = 1, tau = 0.5
    let v = applied(TruncationType::ModDuchi, 3.0, 1.0, &[0.75, -0.25]);
    assert!((v.get(0) - 0.25).abs() < 1e-12);
    assert_eq!(v.get(1), 0.0);
    assert_eq!(v.nnz(), 1);
}

#[test]
fn test_modified_duchi_preserves_sign() {
    let v = applied(TruncationType::ModDuchi, 10.0, 5.0, &[0.9, -0.9]);
    // tau = 8 / 2 = 4: both collapse to zero, never past it
    assert!(v.is_empty());
}

#[test]
fn test_null_policy_is_default_and_noop() {
    let t = GradientTruncation::default();
    assert_eq!(t.policy(), TruncationPolicy::Null);
    let v = applied(TruncationType::None, 1.0, 1.0, &[0.01, -5.0]);
    assert_eq!(v, SparseVector::from_dense(&[0.01, -5.0]));
}

// ==================== Truncation state machine ====================

#[test]
fn test_periodicity() {
    let mut t = GradientTruncation::new(TruncationType::Rounding, 3, 0.0, 1.0).unwrap();
    let mut v = SparseVector::from_dense(&[0.5]);

    assert_eq!(t.state(), TruncationState::Waiting);
    t.truncate_parameters(&mut v);
    t.truncate_parameters(&mut v);
    assert_eq!(v.nnz(), 1, "untouched on epochs 1 and 2");

    assert_eq!(t.state(), TruncationState::Applying);
    t.truncate_parameters(&mut v);
    assert!(v.is_empty(), "applied on epoch 3");
    assert_eq!(t.epoch(), 3);
    assert_eq!(t.state(), TruncationState::Waiting);
}

#[test]
fn test_idempotent_at_fixed_epoch() {
    let mut t = GradientTruncation::new(TruncationType::Truncating, 2, 0.2, 1.0).unwrap();
    let mut once = SparseVector::from_dense(&[0.5, -0.6]);
    t.truncate_parameters_at(4, &mut once);
    let snapshot = once.clone();
    t.truncate_parameters_at(4, &mut once);
    assert_eq!(once, snapshot);
    assert!((once.get(0) - 0.3).abs() < 1e-12);
}

#[test]
fn test_invalid_construction() {
    let err = GradientTruncation::new(TruncationType::Rounding, 0, 0.0, 0.1).unwrap_err();
    assert!(matches!(err, StreamlearnError::InvalidConfiguration { .. }));
    assert!(GradientTruncation::new(TruncationType::Truncating, 1, -0.1, 0.1).is_err());
    assert!(GradientTruncation::new(TruncationType::Truncating, 1, 0.1, f64::NAN).is_err());
}

#[test]
fn test_from_config_and_reset() {
    let config = TruncationConfig {
        kind: TruncationType::Pegasos,
        period: 5,
        alpha: 0.1,
        theta: 0.0,
    };
    let mut t = GradientTruncation::from_config(&config).unwrap();
    assert_eq!(t.policy().kind(), TruncationType::Pegasos);
    assert_eq!(t.period(), 5);
    let mut v = SparseVector::new(1);
    t.truncate_parameters(&mut v);
    assert_eq!(t.epoch(), 1);
    t.reset();
    assert_eq!(t.epoch(), 0);
}

#[test]
fn test_truncation_type_serde_names() {
    let kind: TruncationType = serde_json::from_str("\"MODDUCHI\"").unwrap();
    assert_eq!(kind, TruncationType::ModDuchi);
    let kind: TruncationType = serde_json::from_str("\"NONE\"").unwrap();
    assert_eq!(kind, TruncationType::None);
    assert_eq!(
        serde_json::to_string(&TruncationType::Truncating).unwrap(),
        "\"TRUNCATING\""
    );
}

#[test]
fn test_truncation_state_round_trips() {
    let mut t = GradientTruncation::new(TruncationType::Rounding, 4, 0.0, 0.1).unwrap();
    let mut v = SparseVector::new(2);
    for _ in 0..6 {
        t.truncate_parameters(&mut v);
    }
    let json = serde_json::to_string(&t).unwrap();
    let back: GradientTruncation = serde_json::from_str(&json).unwrap();
    assert_eq!(back, t);
    assert_eq!(back.epoch(), 6);
}

#[test]
fn test_deserialize_rejects_zero_period() {
    let t = GradientTruncation::new(TruncationType::Rounding, 3, 0.0, 0.5).unwrap();
    let mut value = serde_json::to_value(&t).unwrap();
    value["period"] = serde_json::json!(0);
    assert!(serde_json::from_value::<GradientTruncation>(value).is_err());

    let blob = r#"{"policy":"Null","period":0,"epoch":0,"last_applied":null}"#;
    assert!(serde_json::from_str::<GradientTruncation>(blob).is_err());
}

#[test]
fn test_deserialize_rejects_negative_policy_parameters() {
    let blob = r#"{"policy":{"TruncatedGradient":{"alpha":-0.5,"theta":1.0}},"period":1,"epoch":0,"last_applied":null}"#;
    assert!(serde_json::from_str::<GradientTruncation>(blob).is_err());
}

#[test]
fn test_deserialize_keeps_counters() {
    let mut t = GradientTruncation::new(TruncationType::Pegasos, 2, 0.5, 0.0).unwrap();
    let mut v = SparseVector::from_dense(&[3.0, 4.0]);
    t.truncate_parameters(&mut v);
    t.truncate_parameters(&mut v);
    let back: GradientTruncation =
        serde_json::from_str(&serde_json::to_string(&t).unwrap()).unwrap();
    assert_eq!(back, t);
    assert_eq!(back.epoch(), 2);
}

//! Simulate with known parameters, estimate, compare.
//!
//! Every path is drawn from a fixed Mersenne-Twister seed, so the recovered
//! values are deterministic.

use approx::assert_relative_eq;
use sr_models::calibration::{optimize, MleConfig};
use sr_models::parameters::{ModelKind, ModelParameters};
use sr_models::regression::{estimate_cir, estimate_vasicek};
use sr_models::series::{prepare, DomainShift};
use sr_models::simulation::simulate_seeded;

const SEED: u64 = 42;

fn assert_close_to(found: &ModelParameters, truth: &ModelParameters, tol: f64) {
    assert_relative_eq!(found.k, truth.k, max_relative = tol);
    assert_relative_eq!(found.theta, truth.theta, max_relative = tol);
    assert_relative_eq!(found.sigma, truth.sigma, max_relative = tol);
}

// ───────────────────────── Vasicek ─────────────────────────

#[test]
fn vasicek_regression_and_mle_recover_truth() {
    let truth = ModelParameters::new(3.0, 0.04, 0.02);
    let path = simulate_seeded(ModelKind::Vasicek, &truth, 0.03, 400.0, 40_000, SEED).unwrap();
    let dt = path.dt();
    let pairs = prepare(&path, DomainShift::NONE).unwrap();

    let reg = estimate_vasicek(&pairs, dt).unwrap();
    assert_close_to(&reg.params, &truth, 0.2);

    let mle = optimize(&reg.params, &pairs, dt, ModelKind::Vasicek, &MleConfig::default())
        .unwrap();
    assert_close_to(&mle.params, &truth, 0.2);
    assert!(mle.neg_log_likelihood <= mle.initial_neg_log_likelihood);
}

#[test]
fn vasicek_error_shrinks_with_sample_size() {
    let truth = ModelParameters::new(3.0, 0.04, 0.02);
    let error = |horizon: f64, steps: usize| {
        let path = simulate_seeded(ModelKind::Vasicek, &truth, 0.03, horizon, steps, SEED).unwrap();
        let pairs = prepare(&path, DomainShift::NONE).unwrap();
        let k = estimate_vasicek(&pairs, path.dt()).unwrap().params.k;
        (k - truth.k).abs() / truth.k
    };
    assert!(error(400.0, 40_000) < error(4.0, 400));
}

// ───────────────────────── CIR ─────────────────────────

#[test]
fn cir_regression_recovers_truth() {
    let truth = ModelParameters::new(2.0, 0.05, 0.1);
    let path = simulate_seeded(ModelKind::Cir, &truth, 0.04, 200.0, 20_000, SEED).unwrap();
    let pairs = prepare(&path, DomainShift::NONE).unwrap();

    let reg = estimate_cir(&pairs, path.dt()).unwrap();
    assert_close_to(&reg.params, &truth, 0.2);
    assert!(reg.params.feller_satisfied());
}

#[test]
fn cir_mle_recovers_truth() {
    let truth = ModelParameters::new(2.0, 0.05, 0.1);
    let path = simulate_seeded(ModelKind::Cir, &truth, 0.04, 50.0, 5_000, SEED).unwrap();
    let dt = path.dt();
    let pairs = prepare(&path, DomainShift::NONE).unwrap();

    let reg = estimate_cir(&pairs, dt).unwrap();
    let mle = optimize(&reg.params, &pairs, dt, ModelKind::Cir, &MleConfig::default()).unwrap();
    assert_close_to(&mle.params, &truth, 0.2);
    assert!(mle.neg_log_likelihood <= mle.initial_neg_log_likelihood);
}

#[test]
fn cir_error_shrinks_with_sample_size() {
    let truth = ModelParameters::new(2.0, 0.05, 0.1);
    let error = |horizon: f64, steps: usize| {
        let path = simulate_seeded(ModelKind::Cir, &truth, 0.04, horizon, steps, SEED).unwrap();
        let pairs = prepare(&path, DomainShift::NONE).unwrap();
        let k = estimate_cir(&pairs, path.dt()).unwrap().params.k;
        (k - truth.k).abs() / truth.k
    };
    assert!(error(200.0, 20_000) < error(2.0, 200));
}

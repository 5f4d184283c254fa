//! Maximum-likelihood calibration.
//!
//! [`optimize`] minimizes the negative transition log-likelihood starting
//! from a seed, normally the regression estimate. The surface is not
//! globally convex, so the seed matters: a poor start can drift into
//! non-physical regions (negative `k` or `σ`).
//!
//! The minimizer works in coordinates scaled by the magnitude of the seed,
//! so that one initial step suits `k ≈ 2` and `σ ≈ 0.02` alike. With
//! constraints on (the default), trial points with `k ≤ 0` or `σ ≤ 0`, and
//! for CIR also `θ ≤ 0`, are rejected without being evaluated.

use crate::likelihood::{neg_log_likelihood, BesselOrder};
use crate::parameters::{ModelKind, ModelParameters};
use crate::series::PairedSeries;
use sr_core::{ensure, errors::Error, errors::Result, Real, Time};
use sr_math::optimization::{
    Bfgs, Constraint, CostFunction, EndCriteria, EndCriteriaType, NoConstraint,
    PositiveComponents, Simplex,
};
use sr_math::Array;
use tracing::{debug, info, warn};

/// The minimizer driving the calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptimizerKind {
    /// Nelder–Mead, derivative-free.
    #[default]
    Simplex,
    /// Quasi-Newton with finite-difference gradients.
    Bfgs,
}

/// Settings for [`optimize`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MleConfig {
    /// Which minimizer to run.
    pub method: OptimizerKind,
    /// Stopping rules.
    pub end_criteria: EndCriteria,
    /// Reject trial points outside the positive region of the model.
    pub constrained: bool,
    /// Initial simplex size, relative to the seed.
    pub initial_step: Real,
    /// Bessel order used by the CIR likelihood.
    pub bessel_order: BesselOrder,
}

impl Default for MleConfig {
    fn default() -> Self {
        Self {
            method: OptimizerKind::Simplex,
            end_criteria: EndCriteria::default(),
            constrained: true,
            initial_step: 0.1,
            bessel_order: BesselOrder::Exact,
        }
    }
}

impl MleConfig {
    /// Use `method`.
    pub fn with_method(mut self, method: OptimizerKind) -> Self {
        self.method = method;
        self
    }

    /// Use `end_criteria`.
    pub fn with_end_criteria(mut self, end_criteria: EndCriteria) -> Self {
        self.end_criteria = end_criteria;
        self
    }

    /// Switch the positivity constraints on or off.
    pub fn with_constraints(mut self, constrained: bool) -> Self {
        self.constrained = constrained;
        self
    }

    /// Use a relative initial step of `step`.
    pub fn with_initial_step(mut self, step: Real) -> Self {
        self.initial_step = step;
        self
    }

    /// Use `order` for the CIR Bessel term.
    pub fn with_bessel_order(mut self, order: BesselOrder) -> Self {
        self.bessel_order = order;
        self
    }
}

/// Outcome of a converged calibration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MleEstimate {
    /// The refined parameters.
    pub params: ModelParameters,
    /// Negative log-likelihood at `params`.
    pub neg_log_likelihood: Real,
    /// Negative log-likelihood at the seed.
    pub initial_neg_log_likelihood: Real,
    /// Iterations used by the minimizer.
    pub iterations: usize,
    /// The convergence test that stopped the minimizer.
    pub end_type: EndCriteriaType,
}

/// The likelihood seen through coordinates `x_j = p_j / scale_j`.
struct ScaledLikelihood<'a> {
    kind: ModelKind,
    pairs: &'a PairedSeries,
    dt: Time,
    order: BesselOrder,
    scale: [Real; 3],
}

impl ScaledLikelihood<'_> {
    fn params(&self, x: &Array) -> ModelParameters {
        ModelParameters::new(
            x[0] * self.scale[0],
            x[1] * self.scale[1],
            x[2] * self.scale[2],
        )
    }
}

impl CostFunction for ScaledLikelihood<'_> {
    fn value(&self, x: &Array) -> Result<Real> {
        neg_log_likelihood(self.kind, &self.params(x), self.pairs, self.dt, self.order)
    }
}

/// Refine `initial` by maximizing the likelihood of `pairs`.
///
/// # Errors
/// * `InvalidInput` for a non-finite seed or a non-positive initial step;
/// * `OptimizationFailure` if the seed violates the constraints or the
///   minimizer exhausts its iteration budget; the last parameter vector is
///   attached;
/// * any error raised by the likelihood at a trial point, unchanged.
pub fn optimize(
    initial: &ModelParameters,
    pairs: &PairedSeries,
    dt: Time,
    kind: ModelKind,
    config: &MleConfig,
) -> Result<MleEstimate> {
    ensure!(initial.is_finite(), "seed parameters must be finite ({initial})");
    ensure!(
        config.initial_step.is_finite() && config.initial_step > 0.0,
        "initial step must be positive, got {}",
        config.initial_step
    );

    let seed = initial.to_vec();
    let scale = [scale_of(seed[0]), scale_of(seed[1]), scale_of(seed[2])];
    let cost = ScaledLikelihood {
        kind,
        pairs,
        dt,
        order: config.bessel_order,
        scale,
    };
    let start = Array::from_vec(seed.iter().zip(&scale).map(|(p, s)| p / s).collect());

    let constraint: Box<dyn Constraint> = if config.constrained {
        Box::new(PositiveComponents::new(kind.positive_components()))
    } else {
        Box::new(NoConstraint)
    };
    if !constraint.test(&start) {
        warn!(model = %kind, seed = %initial, "seed violates the positivity constraints");
        return Err(Error::OptimizationFailure {
            reason: format!("seed ({initial}) violates the positivity constraints"),
            iterations: 0,
            params: seed,
        });
    }

    let initial_nll = cost.value(&start)?;
    debug!(
        model = %kind,
        pairs = pairs.len(),
        dt,
        seed = %initial,
        nll = initial_nll,
        method = ?config.method,
        "starting maximum-likelihood calibration"
    );

    let result = match config.method {
        OptimizerKind::Simplex => Simplex::new(config.initial_step).minimize(
            &cost,
            constraint.as_ref(),
            &start,
            &config.end_criteria,
        )?,
        OptimizerKind::Bfgs => {
            Bfgs::new().minimize(&cost, constraint.as_ref(), &start, &config.end_criteria)?
        }
    };

    let params = cost.params(&result.x);
    if !result.end_type.is_converged() {
        warn!(
            model = %kind,
            iterations = result.iterations,
            last = %params,
            "maximum-likelihood calibration did not converge"
        );
        return Err(Error::OptimizationFailure {
            reason: result.end_type.to_string(),
            iterations: result.iterations,
            params: params.to_vec(),
        });
    }

    info!(
        model = %kind,
        params = %params,
        nll = result.value,
        iterations = result.iterations,
        end = %result.end_type,
        "maximum-likelihood calibration converged"
    );
    Ok(MleEstimate {
        params,
        neg_log_likelihood: result.value,
        initial_neg_log_likelihood: initial_nll,
        iterations: result.iterations,
        end_type: result.end_type,
    })
}

/// Coordinate scale for a seed component; zero keeps unit scale.
fn scale_of(p: Real) -> Real {
    if p == 0.0 {
        1.0
    } else {
        p.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::likelihood::vasicek_nll;
    use crate::regression::{estimate_cir, estimate_vasicek};
    use crate::series::{prepare, DomainShift};
    use crate::simulation::simulate_seeded;
    use approx::assert_relative_eq;

    fn vasicek_pairs() -> (PairedSeries, Time) {
        let truth = ModelParameters::new(2.0, 0.05, 0.02);
        let path = simulate_seeded(ModelKind::Vasicek, &truth, 0.03, 1.0, 100, 107).unwrap();
        (prepare(&path, DomainShift::NONE).unwrap(), path.dt())
    }

    #[test]
    fn vasicek_mle_recovers_least_squares() {
        // the Euler Gaussian likelihood is maximized by the OLS estimate
        let (pairs, dt) = vasicek_pairs();
        let ols = estimate_vasicek(&pairs, dt).unwrap().params;
        let seed = ModelParameters::new(ols.k * 1.3, ols.theta * 0.9, ols.sigma * 1.2);

        let mle = optimize(&seed, &pairs, dt, ModelKind::Vasicek, &MleConfig::default()).unwrap();
        assert!(mle.end_type.is_converged());
        assert_relative_eq!(mle.params.k, ols.k, max_relative = 0.02);
        assert_relative_eq!(mle.params.theta, ols.theta, max_relative = 0.005);
        assert_relative_eq!(mle.params.sigma, ols.sigma, max_relative = 0.005);
        assert!(mle.neg_log_likelihood <= mle.initial_neg_log_likelihood);
    }

    #[test]
    fn bfgs_agrees_with_simplex() {
        let (pairs, dt) = vasicek_pairs();
        let ols = estimate_vasicek(&pairs, dt).unwrap().params;
        let seed = ModelParameters::new(ols.k * 1.2, ols.theta, ols.sigma * 1.1);
        let config = MleConfig::default().with_method(OptimizerKind::Bfgs);

        let mle = optimize(&seed, &pairs, dt, ModelKind::Vasicek, &config).unwrap();
        assert_relative_eq!(mle.params.k, ols.k, max_relative = 0.02);
        assert_relative_eq!(mle.params.sigma, ols.sigma, max_relative = 0.005);
    }

    #[test]
    fn reported_value_matches_likelihood() {
        let (pairs, dt) = vasicek_pairs();
        let seed = estimate_vasicek(&pairs, dt).unwrap().params;
        let mle = optimize(&seed, &pairs, dt, ModelKind::Vasicek, &MleConfig::default()).unwrap();
        assert_eq!(
            mle.neg_log_likelihood,
            vasicek_nll(&mle.params, &pairs, dt).unwrap()
        );
        assert_eq!(
            mle.initial_neg_log_likelihood,
            vasicek_nll(&seed, &pairs, dt).unwrap()
        );
    }

    #[test]
    fn infeasible_seed_is_rejected_when_constrained() {
        let (pairs, dt) = vasicek_pairs();
        let seed = ModelParameters::new(-1.0, 0.05, 0.02);
        match optimize(&seed, &pairs, dt, ModelKind::Vasicek, &MleConfig::default()) {
            Err(Error::OptimizationFailure {
                iterations, params, ..
            }) => {
                assert_eq!(iterations, 0);
                assert_eq!(params, vec![-1.0, 0.05, 0.02]);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn unconstrained_domain_errors_propagate() {
        let (pairs, dt) = vasicek_pairs();
        let seed = ModelParameters::new(2.0, 0.05, 0.0);
        let config = MleConfig::default().with_constraints(false);
        match optimize(&seed, &pairs, dt, ModelKind::Vasicek, &config) {
            Err(Error::NumericalDomain { params, index, .. }) => {
                assert_eq!(params, vec![2.0, 0.05, 0.0]);
                assert_eq!(index, Some(0));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn exhausted_budget_is_a_failure() {
        let (pairs, dt) = vasicek_pairs();
        let seed = ModelParameters::new(3.0, 0.04, 0.03);
        let config = MleConfig::default()
            .with_end_criteria(EndCriteria::default().with_max_iterations(3));
        match optimize(&seed, &pairs, dt, ModelKind::Vasicek, &config) {
            Err(Error::OptimizationFailure {
                iterations, params, ..
            }) => {
                assert_eq!(iterations, 3);
                assert_eq!(params.len(), 3);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn bad_step_is_invalid_input() {
        let (pairs, dt) = vasicek_pairs();
        let seed = ModelParameters::new(2.0, 0.05, 0.02);
        let config = MleConfig::default().with_initial_step(0.0);
        assert!(matches!(
            optimize(&seed, &pairs, dt, ModelKind::Vasicek, &config),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn cir_calibration_improves_on_regression() {
        let truth = ModelParameters::new(2.0, 0.05, 0.1);
        let path = simulate_seeded(ModelKind::Cir, &truth, 0.04, 5.0, 1260, 42).unwrap();
        let pairs = prepare(&path, DomainShift::NONE).unwrap();
        let seed = estimate_cir(&pairs, path.dt()).unwrap().params;

        let mle = optimize(&seed, &pairs, path.dt(), ModelKind::Cir, &MleConfig::default())
            .unwrap();
        assert!(mle.neg_log_likelihood <= mle.initial_neg_log_likelihood);
        assert!(mle.params.k > 0.0 && mle.params.theta > 0.0 && mle.params.sigma > 0.0);
        // σ is pinned down by the quadratic variation
        assert_relative_eq!(mle.params.sigma, 0.1, max_relative = 0.1);
    }
}

//! BFGS (Broyden–Fletcher–Goldfarb–Shanno) quasi-Newton minimizer.

use crate::array::Array;
use crate::matrix::Matrix;
use crate::optimization::{
    feasible_value, Constraint, CostFunction, EndCriteria, EndCriteriaType, OptimizationResult,
};
use sr_core::{ensure, errors::Result, Real};

const ARMIJO: Real = 1e-4;
const MAX_BACKTRACKS: usize = 50;

/// BFGS quasi-Newton minimizer with a backtracking Armijo line search.
///
/// Maintains an approximation to the inverse Hessian, updated after every
/// accepted step. Trial points rejected by the constraint are treated as
/// having infinite cost, so the line search simply backs away from them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bfgs;

impl Bfgs {
    /// Create a new BFGS minimizer.
    pub fn new() -> Self {
        Self
    }

    /// Minimize `cost_fn` subject to `constraint`, starting from
    /// `initial_values`.
    ///
    /// When no step along the search direction decreases the objective the
    /// search stops at the current point with
    /// [`EndCriteriaType::StationaryPoint`].
    pub fn minimize<C>(
        &self,
        cost_fn: &C,
        constraint: &dyn Constraint,
        initial_values: &Array,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult>
    where
        C: CostFunction + ?Sized,
    {
        let n = initial_values.size();
        ensure!(n > 0, "cannot minimize over an empty parameter vector");
        ensure!(
            constraint.test(initial_values),
            "starting point {initial_values} violates the constraint"
        );

        let mut x = initial_values.clone();
        let mut value = cost_fn.value(&x)?;
        let mut grad = cost_fn.gradient(&x, constraint)?;
        let mut h_inv = Matrix::identity(n);
        let mut first_update = true;
        let mut stationary_count = 0;

        let done = |x: Array, value: Real, iterations: usize, end_type: EndCriteriaType| {
            OptimizationResult {
                x,
                value,
                iterations,
                end_type,
            }
        };

        for iteration in 0..end_criteria.max_iterations {
            tracing::trace!(iteration, value, grad_norm = grad.norm(), "bfgs iteration");

            if grad.norm() < end_criteria.gradient_norm_epsilon {
                return Ok(done(x, value, iteration, EndCriteriaType::GradientNormEpsilon));
            }

            // p = −H⁻¹ ∇f, falling back to steepest descent if H⁻¹ has lost
            // positive definiteness
            let mut direction = -&h_inv.mul_vec(&grad);
            let mut slope = grad.dot(&direction);
            if slope >= 0.0 || slope.is_nan() {
                h_inv = Matrix::identity(n);
                direction = -&grad;
                slope = grad.dot(&direction);
            }

            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let trial = &x + &(&direction * alpha);
                let trial_value = feasible_value(cost_fn, constraint, &trial)?;
                if trial_value <= value + ARMIJO * alpha * slope {
                    accepted = Some((trial, trial_value));
                    break;
                }
                alpha *= 0.5;
            }
            let Some((x_new, value_new)) = accepted else {
                return Ok(done(x, value, iteration, EndCriteriaType::StationaryPoint));
            };

            let grad_new = cost_fn.gradient(&x_new, constraint)?;
            let s = &x_new - &x;
            let y = &grad_new - &grad;
            let sy = s.dot(&y);
            if sy > Real::EPSILON * s.norm() * y.norm() {
                if first_update {
                    // scale the initial guess to the observed curvature
                    h_inv = Matrix::identity(n).scale(sy / y.dot(&y));
                    first_update = false;
                }
                h_inv = update_inverse_hessian(&h_inv, &s, &y, 1.0 / sy);
            }

            if end_criteria.is_stationary(value, value_new) {
                stationary_count += 1;
            } else {
                stationary_count = 0;
            }

            x = x_new;
            value = value_new;
            grad = grad_new;

            if stationary_count >= end_criteria.max_stationary_state_iterations {
                return Ok(done(x, value, iteration + 1, EndCriteriaType::StationaryPoint));
            }
        }

        Ok(done(
            x,
            value,
            end_criteria.max_iterations,
            EndCriteriaType::MaxIterations,
        ))
    }
}

/// `H⁺ = (I − ρ s yᵀ) H (I − ρ y sᵀ) + ρ s sᵀ`.
fn update_inverse_hessian(h: &Matrix, s: &Array, y: &Array, rho: Real) -> Matrix {
    let n = s.size();
    let identity = Matrix::identity(n);
    let left = &identity - &Matrix::outer(s, y).scale(rho);
    let right = left.transpose();
    &(&(&left * h) * &right) + &Matrix::outer(s, s).scale(rho)
}

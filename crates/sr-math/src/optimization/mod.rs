//! Optimization framework.
//!
//! Cost functions, constraints, end criteria and two minimizers: the
//! derivative-free Nelder–Mead [`Simplex`] and the quasi-Newton
//! [`Bfgs`](bfgs::Bfgs). Cost functions are fallible so that a
//! numerical-domain failure inside the objective reaches the caller instead of
//! being turned into a NaN the minimizer would happily compare against.

/// BFGS quasi-Newton minimizer.
pub mod bfgs;

pub use bfgs::Bfgs;

use crate::array::Array;
use sr_core::{ensure, errors::Error, errors::Result, Real};

// ── Cost function trait ───────────────────────────────────────────────────────

/// A scalar objective to be minimized.
pub trait CostFunction {
    /// Evaluate the objective at `x`.
    fn value(&self, x: &Array) -> Result<Real>;

    /// Gradient of the objective at the feasible point `x`.
    ///
    /// The default uses central differences with a step of
    /// `1e-6 · max(1, |x_j|)`. Near the boundary of `constraint` it falls
    /// back to a one-sided difference, halving the step until a neighbour
    /// is feasible; infeasible points are never evaluated.
    fn gradient(&self, x: &Array, constraint: &dyn Constraint) -> Result<Array> {
        let mut grad = Array::zeros(x.size());
        let mut trial = x.clone();
        let mut centre = None;
        for j in 0..x.size() {
            let mut h = 1e-6 * x[j].abs().max(1.0);
            let mut slope = None;
            for _ in 0..MAX_STEP_HALVINGS {
                trial[j] = x[j] + h;
                let up = constraint.test(&trial).then(|| trial.clone());
                trial[j] = x[j] - h;
                let down = constraint.test(&trial).then(|| trial.clone());
                trial[j] = x[j];
                slope = match (up, down) {
                    (Some(up), Some(down)) => {
                        Some((self.value(&up)? - self.value(&down)?) / (2.0 * h))
                    }
                    (Some(up), None) => {
                        let f0 = cached_value(self, x, &mut centre)?;
                        Some((self.value(&up)? - f0) / h)
                    }
                    (None, Some(down)) => {
                        let f0 = cached_value(self, x, &mut centre)?;
                        Some((f0 - self.value(&down)?) / h)
                    }
                    (None, None) => None,
                };
                if slope.is_some() {
                    break;
                }
                h *= 0.5;
            }
            grad[j] = slope.ok_or_else(|| {
                Error::domain("finite-difference gradient: no feasible neighbour", x.as_slice())
            })?;
        }
        Ok(grad)
    }
}

/// Halvings of the finite-difference step before giving up on a component.
const MAX_STEP_HALVINGS: usize = 40;

fn cached_value<C: CostFunction + ?Sized>(
    cost_fn: &C,
    x: &Array,
    cache: &mut Option<Real>,
) -> Result<Real> {
    match *cache {
        Some(v) => Ok(v),
        None => {
            let v = cost_fn.value(x)?;
            *cache = Some(v);
            Ok(v)
        }
    }
}

// ── Constraints ───────────────────────────────────────────────────────────────

/// A feasibility test on the parameter space.
///
/// Minimizers never evaluate the cost function at a point that fails the
/// test; such points are treated as having infinite cost.
pub trait Constraint {
    /// Return `true` if `x` is feasible.
    fn test(&self, x: &Array) -> bool;
}

/// Every point is feasible.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConstraint;

impl Constraint for NoConstraint {
    fn test(&self, _x: &Array) -> bool {
        true
    }
}

/// The listed components must be strictly positive; the rest are free.
#[derive(Debug, Clone, Default)]
pub struct PositiveComponents {
    indices: Vec<usize>,
}

impl PositiveComponents {
    /// Constrain the components at `indices`.
    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Self {
            indices: indices.into(),
        }
    }
}

impl Constraint for PositiveComponents {
    fn test(&self, x: &Array) -> bool {
        self.indices
            .iter()
            .all(|&i| i < x.size() && x[i] > 0.0)
    }
}

// ── End criteria ──────────────────────────────────────────────────────────────

/// Criteria to stop an optimization.
///
/// There is deliberately no absolute "root" threshold on the objective: a
/// negative log-likelihood can take any sign.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndCriteria {
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Consecutive iterations without relative improvement above
    /// `function_epsilon` after which the search is declared stationary.
    pub max_stationary_state_iterations: usize,
    /// Relative tolerance on the objective.
    pub function_epsilon: Real,
    /// Absolute tolerance on the gradient norm (gradient methods only).
    pub gradient_norm_epsilon: Real,
}

impl EndCriteria {
    /// Create new end criteria.
    pub fn new(
        max_iterations: usize,
        max_stationary_state_iterations: usize,
        function_epsilon: Real,
        gradient_norm_epsilon: Real,
    ) -> Self {
        Self {
            max_iterations,
            max_stationary_state_iterations,
            function_epsilon,
            gradient_norm_epsilon,
        }
    }

    /// Replace the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Replace the relative objective tolerance.
    pub fn with_function_epsilon(mut self, function_epsilon: Real) -> Self {
        self.function_epsilon = function_epsilon;
        self
    }

    /// Whether two successive objective values agree to `function_epsilon`,
    /// relative to their magnitude.
    pub fn is_stationary(&self, previous: Real, current: Real) -> bool {
        let scale = previous.abs().max(current.abs()).max(1.0);
        (previous - current).abs() <= self.function_epsilon * scale
    }
}

impl Default for EndCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            max_stationary_state_iterations: 200,
            function_epsilon: 1e-10,
            gradient_norm_epsilon: 1e-8,
        }
    }
}

/// The reason an optimization terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndCriteriaType {
    /// Iteration budget exhausted without convergence.
    MaxIterations,
    /// Objective spread below `function_epsilon`.
    FunctionEpsilon,
    /// Gradient norm below `gradient_norm_epsilon`.
    GradientNormEpsilon,
    /// No further progress possible (stalled improvement or failed line
    /// search).
    StationaryPoint,
}

impl EndCriteriaType {
    /// Whether the minimizer met one of its convergence tests.
    pub fn is_converged(self) -> bool {
        !matches!(self, Self::MaxIterations)
    }
}

impl std::fmt::Display for EndCriteriaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MaxIterations => "iteration budget exhausted",
            Self::FunctionEpsilon => "objective tolerance reached",
            Self::GradientNormEpsilon => "gradient tolerance reached",
            Self::StationaryPoint => "stationary point",
        };
        f.write_str(s)
    }
}

/// Result of an optimization.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Final parameter values.
    pub x: Array,
    /// Final function value.
    pub value: Real,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Reason for termination.
    pub end_type: EndCriteriaType,
}

/// Evaluate `cost_fn` only where `constraint` allows it.
fn feasible_value<C, K>(cost_fn: &C, constraint: &K, x: &Array) -> Result<Real>
where
    C: CostFunction + ?Sized,
    K: Constraint + ?Sized,
{
    if constraint.test(x) {
        cost_fn.value(x)
    } else {
        Ok(Real::INFINITY)
    }
}

// ── Simplex (Nelder–Mead) ─────────────────────────────────────────────────────

/// Nelder–Mead simplex minimizer.
#[derive(Debug, Clone)]
pub struct Simplex {
    lambda: Real,
}

impl Simplex {
    /// Create a simplex minimizer whose initial vertices sit `lambda` away
    /// from the starting point along each axis.
    pub fn new(lambda: Real) -> Self {
        Self { lambda }
    }

    /// Minimize `cost_fn` subject to `constraint`, starting from
    /// `initial_values`.
    ///
    /// The starting point must be feasible. Errors raised by the cost
    /// function abort the search and are returned unchanged.
    pub fn minimize<C, K>(
        &self,
        cost_fn: &C,
        constraint: &K,
        initial_values: &Array,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult>
    where
        C: CostFunction + ?Sized,
        K: Constraint + ?Sized,
    {
        let n = initial_values.size();
        ensure!(n > 0, "cannot minimize over an empty parameter vector");
        ensure!(
            constraint.test(initial_values),
            "starting point {initial_values} violates the constraint"
        );
        let np1 = n + 1;

        let mut vertices: Vec<Array> = Vec::with_capacity(np1);
        vertices.push(initial_values.clone());
        for i in 0..n {
            let mut v = initial_values.clone();
            v[i] += self.lambda;
            if !constraint.test(&v) {
                v[i] = initial_values[i] - self.lambda;
            }
            vertices.push(v);
        }

        let mut values = vertices
            .iter()
            .map(|v| feasible_value(cost_fn, constraint, v))
            .collect::<Result<Vec<_>>>()?;

        let mut iterations = 0;
        let mut stationary_count = 0;
        let mut prev_best = Real::INFINITY;

        loop {
            let (ilo, ihi, inhi) = rank_vertices(&values);
            iterations += 1;

            let (best, worst) = (values[ilo], values[ihi]);
            tracing::trace!(iterations, best, worst, "simplex iteration");

            let spread = (worst - best).abs();
            let scale = best.abs() + worst.abs();
            if best.is_finite()
                && worst.is_finite()
                && 2.0 * spread <= end_criteria.function_epsilon * scale + Real::MIN_POSITIVE
            {
                let end = EndCriteriaType::FunctionEpsilon;
                return Ok(finish(&vertices, &values, ilo, iterations, end));
            }

            if prev_best.is_finite() && end_criteria.is_stationary(prev_best, best) {
                stationary_count += 1;
                if stationary_count >= end_criteria.max_stationary_state_iterations {
                    let end = EndCriteriaType::StationaryPoint;
                    return Ok(finish(&vertices, &values, ilo, iterations, end));
                }
            } else {
                stationary_count = 0;
            }
            prev_best = best;

            if iterations >= end_criteria.max_iterations {
                let end = EndCriteriaType::MaxIterations;
                return Ok(finish(&vertices, &values, ilo, iterations, end));
            }

            // centroid of every vertex but the worst
            let mut centroid = Array::zeros(n);
            for (i, v) in vertices.iter().enumerate() {
                if i != ihi {
                    centroid = &centroid + v;
                }
            }
            let centroid = &centroid / n as Real;

            let reflected = &(&centroid * 2.0) - &vertices[ihi];
            let fr = feasible_value(cost_fn, constraint, &reflected)?;

            if fr < values[ilo] {
                let expanded = &(&reflected * 2.0) - &centroid;
                let fe = feasible_value(cost_fn, constraint, &expanded)?;
                if fe < fr {
                    vertices[ihi] = expanded;
                    values[ihi] = fe;
                } else {
                    vertices[ihi] = reflected;
                    values[ihi] = fr;
                }
            } else if fr < values[inhi] {
                vertices[ihi] = reflected;
                values[ihi] = fr;
            } else {
                let contracted = if fr < values[ihi] {
                    &(&centroid + &reflected) / 2.0
                } else {
                    &(&centroid + &vertices[ihi]) / 2.0
                };
                let fc = feasible_value(cost_fn, constraint, &contracted)?;
                if fc < values[ihi].min(fr) {
                    vertices[ihi] = contracted;
                    values[ihi] = fc;
                } else {
                    // shrink towards the best vertex
                    for i in 0..np1 {
                        if i != ilo {
                            vertices[i] = &(&vertices[ilo] + &vertices[i]) / 2.0;
                            values[i] = feasible_value(cost_fn, constraint, &vertices[i])?;
                        }
                    }
                }
            }
        }
    }
}

/// Indices of the best, worst and second-worst vertex.
fn rank_vertices(values: &[Real]) -> (usize, usize, usize) {
    let mut ilo = 0;
    let (mut ihi, mut inhi) = if values[0] > values[1] { (0, 1) } else { (1, 0) };
    for (i, &v) in values.iter().enumerate() {
        if v < values[ilo] {
            ilo = i;
        }
        if v > values[ihi] {
            inhi = ihi;
            ihi = i;
        } else if i != ihi && v > values[inhi] {
            inhi = i;
        }
    }
    (ilo, ihi, inhi)
}

fn finish(
    vertices: &[Array],
    values: &[Real],
    ilo: usize,
    iterations: usize,
    end_type: EndCriteriaType,
) -> OptimizationResult {
    OptimizationResult {
        x: vertices[ilo].clone(),
        value: values[ilo],
        iterations,
        end_type,
    }
}

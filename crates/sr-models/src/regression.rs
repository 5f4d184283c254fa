//! Closed-form regression estimators.
//!
//! Both models are fitted through their Euler discretization.
//!
//! **Vasicek** regresses `r_t` on `r_{t−1}` with an intercept:
//!
//! ```text
//! r_t = a + b r_{t−1} + ε,   k = (1 − b)/dt,   θ = a/(1 − b)
//! ```
//!
//! **CIR** divides the increment by `√r_{t−1}` so the noise is homoskedastic
//! and regresses without an intercept:
//!
//! ```text
//! (r_t − r_{t−1})/√r_{t−1} = β₁ dt/√r_{t−1} + β₂ dt √r_{t−1} + ε,
//! k = −β₂,   θ = β₁/k
//! ```
//!
//! In both cases `σ` is the population standard deviation of the residuals
//! divided by `√dt`. The estimates are mainly used to seed the likelihood
//! optimizer.

use crate::parameters::{ModelKind, ModelParameters};
use crate::series::PairedSeries;
use sr_core::{ensure, ensure_fit, errors::Error, errors::Result, Real, Time};
use sr_math::{Array, LinearLeastSquaresRegression, Statistics};

/// Smallest `|k|` for which the long-run mean is considered identified.
const MIN_SPEED: Real = 1e-10;

/// Parameters recovered by a regression, with fit diagnostics.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegressionEstimate {
    /// The recovered `(k, θ, σ)`.
    pub params: ModelParameters,
    /// Raw coefficients: `[a, b]` for Vasicek, `[β₁, β₂]` for CIR.
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_array"))]
    pub coefficients: Array,
    /// Standard errors of the raw coefficients.
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_array"))]
    pub standard_errors: Array,
    /// Population standard deviation of the regression residuals.
    pub residual_std_dev: Real,
    /// Coefficient of determination of the transformed regression.
    pub r_squared: Real,
    /// Number of pairs fitted.
    pub observations: usize,
}

#[cfg(feature = "serde")]
fn serialize_array<S: serde::Serializer>(a: &Array, s: S) -> std::result::Result<S::Ok, S::Error> {
    serde::Serialize::serialize(a.as_slice(), s)
}

/// Fit the Vasicek model by ordinary least squares.
///
/// # Errors
/// * `InvalidInput` for a bad `dt` or fewer than two pairs;
/// * `DegenerateFit` when the lagged rates do not vary or the fitted slope
///   is one (a random walk, no mean reversion to measure).
pub fn estimate_vasicek(pairs: &PairedSeries, dt: Time) -> Result<RegressionEstimate> {
    check_dt(dt)?;
    let ones = vec![1.0; pairs.len()];
    let fit =
        LinearLeastSquaresRegression::from_columns(&[ones.as_slice(), pairs.prev()], pairs.curr())?;
    ensure_fit!(
        fit.is_full_rank(),
        "lagged rates show no variation; slope and intercept are not identified"
    );

    let a = fit.coefficients()[0];
    let b = fit.coefficients()[1];
    let k = (1.0 - b) / dt;
    ensure_fit!(
        k.is_finite() && k.abs() > MIN_SPEED,
        "fitted slope {b} is one; the series shows no mean reversion"
    );
    let theta = a / (1.0 - b);
    finish(ModelParameters::new(k, theta, 0.0), &fit, dt)
}

/// Fit the CIR model by the heteroskedasticity-corrected regression.
///
/// # Errors
/// * `NonPositiveRate` if any rate is `≤ 0` (shift the series first);
/// * `InvalidInput` for a bad `dt` or fewer than two pairs;
/// * `DegenerateFit` when the regressors are collinear (constant lagged
///   rates) or the fitted `k` is numerically zero.
pub fn estimate_cir(pairs: &PairedSeries, dt: Time) -> Result<RegressionEstimate> {
    check_dt(dt)?;
    pairs.require_positive()?;

    let n = pairs.len();
    let mut y = Vec::with_capacity(n);
    let mut z1 = Vec::with_capacity(n);
    let mut z2 = Vec::with_capacity(n);
    for (prev, curr) in pairs.iter() {
        let root = prev.sqrt();
        y.push((curr - prev) / root);
        z1.push(dt / root);
        z2.push(dt * root);
    }

    let fit = LinearLeastSquaresRegression::from_columns(&[&z1, &z2], &y)?;
    ensure_fit!(
        fit.is_full_rank(),
        "lagged rates show no variation; drift terms are not identified"
    );

    let beta1 = fit.coefficients()[0];
    let beta2 = fit.coefficients()[1];
    let k = -beta2;
    ensure_fit!(
        k.is_finite() && k.abs() > MIN_SPEED,
        "fitted mean-reversion speed {k} is zero; long-run mean is undefined"
    );
    let theta = beta1 / k;
    finish(ModelParameters::new(k, theta, 0.0), &fit, dt)
}

/// Dispatch to [`estimate_vasicek`] or [`estimate_cir`].
pub fn estimate_regression(
    kind: ModelKind,
    pairs: &PairedSeries,
    dt: Time,
) -> Result<RegressionEstimate> {
    match kind {
        ModelKind::Vasicek => estimate_vasicek(pairs, dt),
        ModelKind::Cir => estimate_cir(pairs, dt),
    }
}

fn check_dt(dt: Time) -> Result<()> {
    ensure!(
        dt.is_finite() && dt > 0.0,
        "time step must be positive and finite, got {dt}"
    );
    Ok(())
}

/// Attach `σ` and the diagnostics.
fn finish(
    mut params: ModelParameters,
    fit: &LinearLeastSquaresRegression,
    dt: Time,
) -> Result<RegressionEstimate> {
    let residual_std_dev = fit
        .residuals()
        .iter()
        .collect::<Statistics>()
        .population_std_dev()
        .ok_or_else(|| Error::DegenerateFit("no residuals to measure volatility".into()))?;
    params.sigma = residual_std_dev / dt.sqrt();

    if !params.is_finite() {
        return Err(Error::DegenerateFit(format!(
            "regression produced non-finite parameters ({params})"
        )));
    }

    Ok(RegressionEstimate {
        params,
        coefficients: fit.coefficients().clone(),
        standard_errors: fit.standard_errors().clone(),
        residual_std_dev,
        r_squared: fit.r_squared(),
        observations: fit.residuals().size(),
    })
}

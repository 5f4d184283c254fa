//! Transition log-likelihoods.
//!
//! Each function returns the **negative** log-likelihood of a paired series,
//! so that minimizing it maximizes the likelihood.
//!
//! # Vasicek
//!
//! The transition over one step is taken Gaussian with the Euler mean and
//! variance:
//!
//! ```text
//! m = r_{t−1} + k(θ − r_{t−1}) dt,   s² = σ² dt
//! ln p = ln(1/√(2π s²)) − (r_t − m)² / (2 s²)
//! ```
//!
//! # CIR
//!
//! `2c r_t` given `r_{t−1}` is noncentral chi-square. With
//!
//! ```text
//! c = 2k / (σ²(1 − e^{−k dt})),   q = 2kθ/σ² − 1,
//! u = c r_{t−1} e^{−k dt},         v = c r_t,
//! ```
//!
//! the log-density is
//!
//! ```text
//! ln p = ln c − u − v + (q/2) ln(v/u) + ln I_q(2√(uv))
//! ```
//!
//! For daily data `2√(uv)` runs into the thousands and `I_q` overflows, so
//! the Bessel term is always evaluated through [`scaled_bessel_term`].

use crate::parameters::{ModelKind, ModelParameters};
use crate::series::PairedSeries;
use sr_core::{ensure, errors::Error, errors::Result, Rate, Real, Time};
use sr_math::{ln_bessel_i_scaled, Matrix};
use std::f64::consts::PI;

/// Order of the modified Bessel function in the CIR density.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BesselOrder {
    /// `q = 2kθ/σ² − 1`, recomputed from the trial parameters on every
    /// evaluation.
    #[default]
    Exact,
    /// A fixed order independent of the parameters. The resulting function
    /// is not the CIR likelihood; it exists to reproduce fits made that way.
    Fixed(Real),
}

impl BesselOrder {
    /// The order to use given the exact order `q`.
    pub fn resolve(self, q: Real) -> Real {
        match self {
            Self::Exact => q,
            Self::Fixed(nu) => nu,
        }
    }
}

/// `ln I_ν(2√(uv))`, computed as `ln(e^{−z} I_ν(z)) + z` with `z = 2√(uv)`.
///
/// The exponentially scaled Bessel value stays representable for any
/// argument; the `+z` is added back in log space.
pub fn scaled_bessel_term(order: Real, u: Real, v: Real) -> Result<Real> {
    if !(u >= 0.0 && v >= 0.0) {
        return Err(Error::domain("scaled Bessel term", &[order, u, v]));
    }
    let z = 2.0 * (u * v).sqrt();
    Ok(ln_bessel_i_scaled(order, z)? + z)
}

// ── Per-pair densities ────────────────────────────────────────────────────────

/// Log-density of one Vasicek transition `prev → curr` over `dt`.
pub fn vasicek_log_density(
    params: &ModelParameters,
    prev: Rate,
    curr: Rate,
    dt: Time,
) -> Result<Real> {
    let ModelParameters { k, theta, sigma } = *params;
    let variance = sigma * sigma * dt;
    if !(variance > 0.0 && variance.is_finite()) {
        return Err(Error::domain("Vasicek transition variance", &params.to_vec()));
    }
    let mean = prev + k * (theta - prev) * dt;
    let value = (1.0 / (2.0 * PI * variance).sqrt()).ln()
        - (curr - mean) * (curr - mean) / (2.0 * variance);
    if !value.is_finite() {
        return Err(Error::domain("Vasicek log-density", &params.to_vec()));
    }
    Ok(value)
}

/// Log-density of one CIR transition `prev → curr` over `dt`.
pub fn cir_log_density(
    params: &ModelParameters,
    prev: Rate,
    curr: Rate,
    dt: Time,
    order: BesselOrder,
) -> Result<Real> {
    let ModelParameters { k, theta, sigma } = *params;
    let domain = |what: &str| Error::domain(what, &params.to_vec());

    let s2 = sigma * sigma;
    // 1 − e^{−k dt}
    let one_minus = -(-k * dt).exp_m1();
    let c = 2.0 * k / (s2 * one_minus);
    let q = 2.0 * k * theta / s2 - 1.0;
    if !(c > 0.0 && c.is_finite() && q.is_finite()) {
        return Err(domain("CIR density scale"));
    }

    let u = c * prev * (-k * dt).exp();
    let v = c * curr;
    if !(u > 0.0 && v > 0.0 && u.is_finite() && v.is_finite()) {
        return Err(domain("CIR density arguments"));
    }

    let bessel = scaled_bessel_term(order.resolve(q), u, v)
        .map_err(|_| domain("CIR Bessel term"))?;
    let value = c.ln() - u - v + 0.5 * q * (v / u).ln() + bessel;
    if !value.is_finite() {
        return Err(domain("CIR log-density"));
    }
    Ok(value)
}

// ── Series likelihoods ────────────────────────────────────────────────────────

/// Negative Vasicek log-likelihood of `pairs`.
///
/// Domain errors carry the trial parameters and the offending pair.
pub fn vasicek_nll(params: &ModelParameters, pairs: &PairedSeries, dt: Time) -> Result<Real> {
    check_dt(dt)?;
    let mut total = 0.0;
    for (i, (prev, curr)) in pairs.iter().enumerate() {
        total += vasicek_log_density(params, prev, curr, dt).map_err(|e| e.at_pair(i))?;
    }
    Ok(-total)
}

/// Negative CIR log-likelihood of `pairs`.
///
/// Fails with `NonPositiveRate` before any evaluation if the series has not
/// been shifted onto the positive half-line.
pub fn cir_nll(
    params: &ModelParameters,
    pairs: &PairedSeries,
    dt: Time,
    order: BesselOrder,
) -> Result<Real> {
    check_dt(dt)?;
    pairs.require_positive()?;
    let mut total = 0.0;
    for (i, (prev, curr)) in pairs.iter().enumerate() {
        total += cir_log_density(params, prev, curr, dt, order).map_err(|e| e.at_pair(i))?;
    }
    Ok(-total)
}

/// Negative log-likelihood of `pairs` under `kind`.
///
/// `order` only affects CIR.
pub fn neg_log_likelihood(
    kind: ModelKind,
    params: &ModelParameters,
    pairs: &PairedSeries,
    dt: Time,
    order: BesselOrder,
) -> Result<Real> {
    match kind {
        ModelKind::Vasicek => vasicek_nll(params, pairs, dt),
        ModelKind::Cir => cir_nll(params, pairs, dt, order),
    }
}

/// Negative log-likelihood over a `(k, θ)` grid with `σ` held fixed.
///
/// Entry `(i, j)` is evaluated at `(k_grid[i], theta_grid[j], sigma)`.
pub fn likelihood_surface(
    kind: ModelKind,
    pairs: &PairedSeries,
    dt: Time,
    k_grid: &[Real],
    theta_grid: &[Real],
    sigma: Real,
    order: BesselOrder,
) -> Result<Matrix> {
    ensure!(
        !k_grid.is_empty() && !theta_grid.is_empty(),
        "likelihood grid must have at least one point per axis"
    );
    let mut values = Vec::with_capacity(k_grid.len() * theta_grid.len());
    for &k in k_grid {
        for &theta in theta_grid {
            let params = ModelParameters::new(k, theta, sigma);
            values.push(neg_log_likelihood(kind, &params, pairs, dt, order)?);
        }
    }
    Ok(Matrix::from_row_slice(k_grid.len(), theta_grid.len(), &values))
}

fn check_dt(dt: Time) -> Result<()> {
    ensure!(
        dt.is_finite() && dt > 0.0,
        "time step must be positive and finite, got {dt}"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use sr_math::ln_bessel_i;

    fn series(pairs: &[(Rate, Rate)]) -> PairedSeries {
        PairedSeries::from_pairs(pairs).unwrap()
    }

    #[test]
    fn vasicek_density_is_gaussian() {
        let p = ModelParameters::new(2.0, 0.05, 0.02);
        let dt: Real = 0.01;
        let (prev, curr) = (0.03, 0.0315);
        let mean = prev + 2.0 * (0.05 - prev) * dt;
        let sd = 0.02 * dt.sqrt();
        let z: Real = (curr - mean) / sd;
        let expected = -0.5 * z * z - (sd * (2.0 * PI).sqrt()).ln();
        assert_abs_diff_eq!(
            vasicek_log_density(&p, prev, curr, dt).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn vasicek_nll_sums_pairs() {
        let p = ModelParameters::new(1.0, 0.04, 0.01);
        let s = series(&[(0.03, 0.031), (0.031, 0.0305), (0.0305, 0.033)]);
        let by_hand: Real = s
            .iter()
            .map(|(a, b)| vasicek_log_density(&p, a, b, 0.1).unwrap())
            .sum();
        assert_abs_diff_eq!(vasicek_nll(&p, &s, 0.1).unwrap(), -by_hand, epsilon = 1e-12);
    }

    #[test]
    fn vasicek_zero_volatility_is_a_domain_error() {
        let p = ModelParameters::new(1.0, 0.04, 0.0);
        let s = series(&[(0.03, 0.031), (0.031, 0.03)]);
        match vasicek_nll(&p, &s, 0.1).unwrap_err() {
            Error::NumericalDomain { params, index, .. } => {
                assert_eq!(params, vec![1.0, 0.04, 0.0]);
                assert_eq!(index, Some(0));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn scaled_term_matches_direct_logarithm() {
        // ln I_1.5(2√6)
        assert_abs_diff_eq!(
            scaled_bessel_term(1.5, 2.0, 3.0).unwrap(),
            2.957_299_491_762_230_7,
            epsilon = 1e-12
        );
        let z = 2.0 * (40.0_f64 * 55.0).sqrt();
        assert_abs_diff_eq!(
            scaled_bessel_term(3.0, 40.0, 55.0).unwrap(),
            ln_bessel_i(3.0, z).unwrap(),
            epsilon = 1e-12
        );
        assert!(scaled_bessel_term(1.0, -1.0, 2.0).is_err());
    }

    #[test]
    fn scaled_term_survives_huge_arguments() {
        // e^{4000} overflows an f64; the logarithm does not
        let value = scaled_bessel_term(19.0, 2000.0, 2000.0).unwrap();
        assert!(value.is_finite());
        assert_relative_eq!(value, 4000.0, max_relative = 0.01);
    }

    #[test]
    fn cir_density_reference_values() {
        let daily = ModelParameters::new(2.0, 0.05, 0.1);
        assert_abs_diff_eq!(
            cir_log_density(&daily, 0.04, 0.0405, 1.0 / 252.0, BesselOrder::Exact).unwrap(),
            5.697_400_897_468_592,
            epsilon = 1e-8
        );

        let coarse = ModelParameters::new(0.5, 0.04, 0.2);
        assert_abs_diff_eq!(
            cir_log_density(&coarse, 0.03, 0.05, 0.5, BesselOrder::Exact).unwrap(),
            2.237_960_936_219_063_5,
            epsilon = 1e-10
        );
        assert_abs_diff_eq!(
            cir_log_density(&coarse, 0.03, 0.05, 0.5, BesselOrder::Fixed(2.5)).unwrap(),
            1.807_991_621_365_333_3,
            epsilon = 1e-10
        );
    }

    #[test]
    fn cir_density_integrates_to_one() {
        let p = ModelParameters::new(2.0, 0.05, 0.1);
        let (dt, prev) = (0.1, 0.04);
        let n = 3000;
        let h = 0.3 / n as Real;
        let mut mass = 0.0;
        let mut mean = 0.0;
        for i in 1..n {
            let x = i as Real * h;
            let f = cir_log_density(&p, prev, x, dt, BesselOrder::Exact)
                .unwrap()
                .exp();
            mass += f * h;
            mean += x * f * h;
        }
        assert_abs_diff_eq!(mass, 1.0, epsilon = 1e-6);
        // exact conditional mean θ + (r − θ) e^{−k dt}
        assert_abs_diff_eq!(mean, 0.041_812_692_469_220_18, epsilon = 1e-7);
    }

    #[test]
    fn cir_rejects_non_positive_rates() {
        let p = ModelParameters::new(2.0, 0.05, 0.1);
        let s = series(&[(0.02, 0.01), (0.01, -0.001)]);
        assert_eq!(
            cir_nll(&p, &s, 0.1, BesselOrder::Exact).unwrap_err(),
            Error::NonPositiveRate {
                index: 1,
                rate: -0.001
            }
        );
    }

    #[test]
    fn cir_invalid_order_is_a_domain_error() {
        // θ < 0 pushes q below −1, outside the Bessel domain
        let p = ModelParameters::new(2.0, -0.05, 0.1);
        let s = series(&[(0.02, 0.021), (0.021, 0.02)]);
        match cir_nll(&p, &s, 0.1, BesselOrder::Exact).unwrap_err() {
            Error::NumericalDomain { params, index, .. } => {
                assert_eq!(params, vec![2.0, -0.05, 0.1]);
                assert_eq!(index, Some(0));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn cir_zero_volatility_is_a_domain_error() {
        let p = ModelParameters::new(2.0, 0.05, 0.0);
        let s = series(&[(0.02, 0.021)]);
        assert!(matches!(
            cir_nll(&p, &s, 0.1, BesselOrder::Exact),
            Err(Error::NumericalDomain { .. })
        ));
    }

    #[test]
    fn exact_order_prefers_true_parameters() {
        // pairs sitting on the conditional mean favour the true θ
        let p = ModelParameters::new(1.0, 0.06, 0.05);
        let dt: Real = 0.25;
        let mut pairs = Vec::new();
        let mut r: Real = 0.03;
        for _ in 0..20 {
            let next = 0.06 + (r - 0.06) * (-dt).exp();
            pairs.push((r, next));
            r = next;
        }
        let s = series(&pairs);
        let at_truth = cir_nll(&p, &s, dt, BesselOrder::Exact).unwrap();
        let off = ModelParameters::new(1.0, 0.02, 0.05);
        assert!(at_truth < cir_nll(&off, &s, dt, BesselOrder::Exact).unwrap());
    }

    #[test]
    fn surface_layout() {
        let s = series(&[(0.03, 0.031), (0.031, 0.0305), (0.0305, 0.033)]);
        let ks = [0.5, 1.0, 2.0];
        let thetas = [0.02, 0.04];
        let m = likelihood_surface(
            ModelKind::Vasicek,
            &s,
            0.1,
            &ks,
            &thetas,
            0.01,
            BesselOrder::Exact,
        )
        .unwrap();
        assert_eq!((m.rows(), m.cols()), (3, 2));
        let direct = vasicek_nll(&ModelParameters::new(2.0, 0.02, 0.01), &s, 0.1).unwrap();
        assert_eq!(m[(2, 0)], direct);
        assert!(likelihood_surface(
            ModelKind::Vasicek,
            &s,
            0.1,
            &[],
            &thetas,
            0.01,
            BesselOrder::Exact
        )
        .is_err());
    }
}

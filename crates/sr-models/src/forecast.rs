//! Closed-form forecasts.
//!
//! Both models share the conditional mean
//!
//! ```text
//! E[r_{t+h}] = r_t e^{−k h dt} + θ (1 − e^{−k h dt})
//! ```
//!
//! and differ only in the conditional variance, which comes from the exact
//! moments of the underlying process. Negative `k` is accepted and gives a
//! diverging but well-defined forecast.
//!
//! [`ForecastPoint::interval`] and [`ForecastPoint::probability_below`] read
//! the point as a normal distribution. That is exact for Vasicek; for CIR it
//! matches the first two moments of the non-central χ² transition.

use crate::parameters::{ModelKind, ModelParameters};
use crate::series::DomainShift;
use sr_core::{ensure, errors::Error, errors::Result, Rate, Real, Time};
use sr_math::{normal_cdf, normal_cdf_inverse};

/// One forecast horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastPoint {
    /// Steps ahead of the last observation.
    pub horizon: usize,
    /// `horizon · dt` in years.
    pub time: Time,
    /// Conditional mean, on the original scale.
    pub mean: Rate,
    /// Conditional standard deviation.
    pub std_dev: Real,
}

impl ForecastPoint {
    /// Two-sided band holding the rate with probability `level`.
    pub fn interval(&self, level: Real) -> Result<(Rate, Rate)> {
        let upper = 0.5 + 0.5 * level;
        ensure!(
            level > 0.0 && upper < 1.0,
            "confidence level must lie in (0, 1), got {level}"
        );
        let half = normal_cdf_inverse(upper) * self.std_dev;
        Ok((self.mean - half, self.mean + half))
    }

    /// Probability that the rate at this horizon ends below `rate`.
    pub fn probability_below(&self, rate: Rate) -> Real {
        if self.std_dev > 0.0 {
            normal_cdf((rate - self.mean) / self.std_dev)
        } else if rate > self.mean {
            1.0
        } else {
            0.0
        }
    }
}

/// Forecasts for a set of horizons, in the order they were requested.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Forecast {
    points: Vec<ForecastPoint>,
}

impl Forecast {
    /// All points in request order.
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// The point for `horizon`, if it was requested.
    pub fn get(&self, horizon: usize) -> Option<&ForecastPoint> {
        self.points.iter().find(|p| p.horizon == horizon)
    }

    /// The conditional mean at `horizon`, if it was requested.
    pub fn mean(&self, horizon: usize) -> Option<Rate> {
        self.get(horizon).map(|p| p.mean)
    }

    /// Number of horizons.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no horizon was requested.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, ForecastPoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a Forecast {
    type Item = &'a ForecastPoint;
    type IntoIter = std::slice::Iter<'a, ForecastPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Forecast `horizons` steps of `dt` ahead of `r_last`.
///
/// `r_last` is on the fitting scale, i.e. already shifted by `shift`; the
/// returned means have the shift removed again. Horizons must be positive.
pub fn forecast(
    kind: ModelKind,
    params: &ModelParameters,
    r_last: Rate,
    dt: Time,
    horizons: &[usize],
    shift: DomainShift,
) -> Result<Forecast> {
    ensure!(params.is_finite(), "forecast parameters must be finite ({params})");
    ensure!(r_last.is_finite(), "last observed rate must be finite, got {r_last}");
    ensure!(
        dt.is_finite() && dt > 0.0,
        "time step must be positive and finite, got {dt}"
    );
    if let Some(h) = horizons.iter().find(|&&h| h == 0) {
        return Err(Error::InvalidInput(format!(
            "forecast horizons must be positive, got {h}"
        )));
    }

    let ModelParameters { k, theta, .. } = *params;
    let process = kind.process(params, r_last);
    let points = horizons
        .iter()
        .map(|&horizon| {
            let tau = horizon as Real * dt;
            let decay = (-k * tau).exp();
            let mean = r_last * decay + theta * (1.0 - decay);
            ForecastPoint {
                horizon,
                time: tau,
                mean: shift.remove(mean),
                std_dev: process.variance(0.0, r_last, tau).max(0.0).sqrt(),
            }
        })
        .collect();
    Ok(Forecast { points })
}

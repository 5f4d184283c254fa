//! End-to-end estimation: shift, pair, regress, refine.
//!
//! [`estimate`] runs the whole chain on one rate path and keeps every
//! intermediate result, so a caller can compare the regression and
//! likelihood fits or forecast from either.

use crate::calibration::{optimize, MleConfig, MleEstimate};
use crate::forecast::{forecast, Forecast};
use crate::parameters::{ModelKind, ModelParameters};
use crate::regression::{estimate_regression, RegressionEstimate};
use crate::series::{prepare, DomainShift};
use sr_core::{errors::Result, Rate, RatePath, Real, Time};
use tracing::{debug, warn};

/// How a CIR series is moved onto positive rates before fitting.
///
/// Vasicek lives on the whole real line and is never shifted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShiftPolicy {
    /// Fit the series as observed.
    None,
    /// Shift by `−min + margin` if the series has a non-positive value.
    Auto {
        /// Distance kept between the shifted minimum and zero.
        margin: Real,
    },
    /// Shift by a fixed amount, which must lift every observation above zero.
    Fixed(Real),
    /// Shift by the given quantile (`0 ≤ p ≤ 1`) of the observations.
    Percentile(Real),
}

impl Default for ShiftPolicy {
    fn default() -> Self {
        Self::Auto { margin: 1e-4 }
    }
}

impl ShiftPolicy {
    /// The shift this policy picks for `path` under `kind`.
    pub fn resolve(&self, kind: ModelKind, path: &RatePath) -> Result<DomainShift> {
        if !kind.requires_positive_rates() {
            return Ok(DomainShift::NONE);
        }
        match *self {
            Self::None => Ok(DomainShift::NONE),
            Self::Auto { margin } => DomainShift::covering(path, margin),
            Self::Fixed(s) => {
                let shift = DomainShift::new(s)?;
                shift.validate(path)?;
                Ok(shift)
            }
            Self::Percentile(p) => DomainShift::from_percentile(path, p),
        }
    }
}

/// Settings for [`estimate`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EstimationConfig {
    /// Domain shift applied to CIR series.
    pub shift: ShiftPolicy,
    /// Likelihood refinement settings.
    pub mle: MleConfig,
    /// Whether to refine the regression estimate by maximum likelihood.
    pub run_mle: bool,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            shift: ShiftPolicy::default(),
            mle: MleConfig::default(),
            run_mle: true,
        }
    }
}

impl EstimationConfig {
    /// Set the shift policy.
    pub fn with_shift(mut self, shift: ShiftPolicy) -> Self {
        self.shift = shift;
        self
    }

    /// Set the likelihood refinement settings.
    pub fn with_mle(mut self, mle: MleConfig) -> Self {
        self.mle = mle;
        self
    }

    /// Stop after the regression.
    pub fn regression_only(mut self) -> Self {
        self.run_mle = false;
        self
    }
}

/// Everything one estimation run produced.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Estimation {
    /// The fitted model family.
    pub kind: ModelKind,
    /// Observation spacing in years.
    pub dt: Time,
    /// The shift the series was fitted under.
    pub shift: DomainShift,
    /// Last observation, on the original scale.
    pub last_rate: Rate,
    /// The closed-form fit.
    pub regression: RegressionEstimate,
    /// The likelihood refinement, if it was requested.
    pub mle: Option<MleEstimate>,
}

impl Estimation {
    /// The refined parameters when available, the regression ones otherwise.
    ///
    /// For a shifted CIR fit these live on the shifted scale.
    pub fn params(&self) -> &ModelParameters {
        self.mle
            .as_ref()
            .map_or(&self.regression.params, |mle| &mle.params)
    }

    /// Forecast from the last observation, on the original scale.
    pub fn forecast(&self, horizons: &[usize]) -> Result<Forecast> {
        forecast(
            self.kind,
            self.params(),
            self.shift.apply(self.last_rate),
            self.dt,
            horizons,
            self.shift,
        )
    }
}

/// Fit `kind` to `path`.
///
/// # Errors
/// Whatever the stage that failed reports: `InvalidInput` for a bad shift
/// or a too-short path, `NonPositiveRate` for an unshifted CIR series that
/// touches zero, `DegenerateFit` from the regression, and
/// `OptimizationFailure` or `NumericalDomain` from the refinement.
pub fn estimate(kind: ModelKind, path: &RatePath, config: &EstimationConfig) -> Result<Estimation> {
    let shift = config.shift.resolve(kind, path)?;
    if !shift.is_zero() {
        warn!(
            model = %kind,
            shift = shift.value(),
            min = path.min_rate(),
            "applying a domain shift before fitting"
        );
    }

    let dt = path.dt();
    let pairs = prepare(path, shift)?;
    let regression = estimate_regression(kind, &pairs, dt)?;
    debug!(model = %kind, params = %regression.params, r2 = regression.r_squared, "regression fit");

    let mle = if config.run_mle {
        Some(optimize(&regression.params, &pairs, dt, kind, &config.mle)?)
    } else {
        None
    };

    let estimation = Estimation {
        kind,
        dt,
        shift,
        last_rate: path.last(),
        regression,
        mle,
    };
    let params = estimation.params();
    if kind == ModelKind::Cir && !params.feller_satisfied() {
        warn!(params = %params, "fitted CIR parameters violate the Feller condition 2kθ ≥ σ²");
    }
    Ok(estimation)
}

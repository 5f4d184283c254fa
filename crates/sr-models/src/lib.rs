//! # sr-models
//!
//! Estimation of the Vasicek and Cox–Ingersoll–Ross short-rate models.
//!
//! ## Data flow
//!
//! ```text
//! RatePath ──prepare──▶ PairedSeries ──regression──▶ seed ──optimize──▶ MLE
//!                                                                     │
//!                                               forecast ◀────────────┘
//! ```
//!
//! [`simulation`] produces synthetic paths from known parameters, and
//! [`estimator::estimate`] chains the whole pipeline.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Model definitions ────────────────────────────────────────────────────
pub mod parameters;
pub mod series;

// ── Estimation ───────────────────────────────────────────────────────────
pub mod calibration;
pub mod likelihood;
pub mod regression;

// ── Pipeline, forecasting, simulation ────────────────────────────────────
pub mod estimator;
pub mod forecast;
pub mod simulation;

// ── Re-exports ───────────────────────────────────────────────────────────
pub use calibration::{optimize, MleConfig, MleEstimate, OptimizerKind};
pub use estimator::{estimate, Estimation, EstimationConfig, ShiftPolicy};
pub use forecast::{forecast, Forecast, ForecastPoint};
pub use likelihood::{
    cir_log_density, cir_nll, likelihood_surface, neg_log_likelihood, scaled_bessel_term,
    vasicek_log_density, vasicek_nll, BesselOrder,
};
pub use parameters::{ModelKind, ModelParameters};
pub use regression::{estimate_cir, estimate_regression, estimate_vasicek, RegressionEstimate};
pub use series::{prepare, DomainShift, PairedSeries};
pub use simulation::{simulate, simulate_seeded};

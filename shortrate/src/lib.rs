//! # shortrate
//!
//! Estimation of the Vasicek and Cox–Ingersoll–Ross short-rate models from a
//! series of rate observations.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `sr-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use shortrate::models::{estimate, simulate_seeded, EstimationConfig, ModelKind, ModelParameters};
//!
//! let truth = ModelParameters::new(2.0, 0.05, 0.02);
//! let path = simulate_seeded(ModelKind::Vasicek, &truth, 0.03, 1.0, 100, 107).unwrap();
//!
//! let fit = estimate(ModelKind::Vasicek, &path, &EstimationConfig::default()).unwrap();
//! let next = fit.forecast(&[1]).unwrap();
//! assert!(next.mean(1).unwrap().is_finite());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, rate paths, and error definitions.
pub use sr_core as core;

/// Mathematical utilities: linear algebra, Bessel functions, optimisation, RNG.
pub use sr_math as math;

/// Short-rate stochastic processes.
pub use sr_processes as processes;

/// Numerical methods (Monte Carlo).
pub use sr_methods as methods;

/// Estimation, calibration, and forecasting.
pub use sr_models as models;

pub use sr_core::{Error, RatePath, Result};
pub use sr_models::{
    estimate, forecast, optimize, prepare, simulate, simulate_seeded, DomainShift, Estimation,
    EstimationConfig, ModelKind, ModelParameters, ShiftPolicy,
};

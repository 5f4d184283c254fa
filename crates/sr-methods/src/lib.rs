//! # sr-methods
//!
//! Numerical methods over the short-rate processes. Currently Monte Carlo
//! path generation on a uniform time grid.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Monte Carlo simulation: Euler path generation.
pub mod monte_carlo;

pub use monte_carlo::PathGenerator;

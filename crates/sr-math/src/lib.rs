//! # sr-math
//!
//! Numerical building blocks: array/matrix newtypes over nalgebra, SVD least
//! squares, sample statistics, the scaled modified Bessel function, the
//! normal distribution, seeded Gaussian random streams, and the Simplex and
//! BFGS minimizers.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// One-dimensional real arrays.
pub mod array;

/// Modified Bessel functions of the first kind.
pub mod bessel;

/// Probability distributions.
pub mod distributions;

/// Linear least-squares regression.
pub mod linear_least_squares;

/// Two-dimensional real matrices.
pub mod matrix;

/// Matrix decompositions.
pub mod matrix_utilities;

/// Minimizers, cost functions and constraints.
pub mod optimization;

/// Random number generators.
pub mod random_numbers;

/// Statistics accumulators.
pub mod statistics;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::Array;
pub use bessel::{bessel_i_scaled, ln_bessel_i, ln_bessel_i_scaled};
pub use distributions::{normal_cdf, normal_cdf_inverse};
pub use linear_least_squares::LinearLeastSquaresRegression;
pub use matrix::Matrix;
pub use random_numbers::{InverseCumulativeNormalRng, NormalSequence, StandardNormalRng};
pub use statistics::Statistics;

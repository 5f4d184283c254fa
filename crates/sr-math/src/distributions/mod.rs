//! Probability distributions.

/// The standard normal distribution.
pub mod normal;

pub use normal::{normal_cdf, normal_cdf_inverse};

//! Error types for shortrate-rs.
//!
//! Every fallible operation in the workspace reports one of the kinds below.
//! Variants carry enough state (offending index, trial parameter vector) to
//! diagnose a failed estimation run without re-running it. The
//! [`ensure!`](crate::ensure) and [`ensure_fit!`](crate::ensure_fit) macros
//! cover the common precondition / postcondition checks.
//!
//! # Error kinds
//!
//! | Kind | Variants | [`Error::is_invalid_input`] |
//! |------|----------|-----------------------------|
//! | invalid input | [`Error::InvalidInput`], [`Error::MissingValue`], [`Error::NonPositiveRate`] | `true` |
//! | degenerate fit | [`Error::DegenerateFit`] | `false` |
//! | numerical domain | [`Error::NumericalDomain`] | `false` |
//! | optimization failure | [`Error::OptimizationFailure`] | `false` |
//!
//! The invalid-input kind is split over three variants so that a missing
//! observation or a rate outside the CIR domain reports its position. Match
//! on [`Error::is_invalid_input`] to handle the kind as a whole.

use crate::Real;
use thiserror::Error;

/// The top-level error type used throughout shortrate-rs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Precondition violated: bad horizon, step count, time step, shift, or a
    /// series too short to work with.
    ///
    /// Invalid-input kind; see also [`Error::MissingValue`] and
    /// [`Error::NonPositiveRate`].
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An observation is missing (absent or NaN). Invalid-input kind.
    #[error("missing value at index {index}")]
    MissingValue {
        /// Position of the missing observation in the raw series.
        index: usize,
    },

    /// A rate that must be strictly positive (CIR) is not. Invalid-input kind.
    #[error("non-positive rate {rate} at pair {index}; apply a domain shift first")]
    NonPositiveRate {
        /// Index of the offending pair.
        index: usize,
        /// The offending value.
        rate: Real,
    },

    /// The regression cannot identify the model parameters.
    #[error("degenerate fit: {0}")]
    DegenerateFit(String),

    /// A log, square root, or Bessel evaluation left its domain.
    #[error("numerical domain error in {context} (params = {params:?}, pair = {index:?})")]
    NumericalDomain {
        /// What was being evaluated.
        context: String,
        /// The trial parameter vector at the time of failure.
        params: Vec<Real>,
        /// The pair being evaluated, if the failure is tied to one.
        index: Option<usize>,
    },

    /// The minimizer stopped without meeting its convergence test.
    #[error("optimization failed after {iterations} iterations: {reason} (last params = {params:?})")]
    OptimizationFailure {
        /// Why the minimizer stopped.
        reason: String,
        /// Iterations performed.
        iterations: usize,
        /// The last parameter vector the minimizer held.
        params: Vec<Real>,
    },
}

impl Error {
    /// Build a [`Error::NumericalDomain`] not tied to a particular pair.
    pub fn domain(context: impl Into<String>, params: &[Real]) -> Self {
        Self::NumericalDomain {
            context: context.into(),
            params: params.to_vec(),
            index: None,
        }
    }

    /// Attach a pair index to a [`Error::NumericalDomain`]; other kinds pass
    /// through unchanged.
    pub fn at_pair(self, pair: usize) -> Self {
        match self {
            Self::NumericalDomain {
                context, params, ..
            } => Self::NumericalDomain {
                context,
                params,
                index: Some(pair),
            },
            other => other,
        }
    }

    /// Whether the caller's input was at fault: a bad argument, a missing
    /// observation, or a rate outside the model's domain.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::MissingValue { .. } | Self::NonPositiveRate { .. }
        )
    }
}

/// Shorthand `Result` type used throughout shortrate-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::InvalidInput(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use sr_core::{ensure, errors::Error};
/// fn positive(x: f64) -> sr_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::InvalidInput(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidInput(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::DegenerateFit(...))` if `$cond` is false.
///
/// Used as a postcondition on fitted regression coefficients.
///
/// # Example
/// ```
/// use sr_core::{ensure_fit, errors::Error};
/// fn reversion(slope: f64) -> sr_core::errors::Result<f64> {
///     ensure_fit!(slope != 1.0, "unit slope, no mean reversion");
///     Ok(1.0 - slope)
/// }
/// assert!(reversion(0.9).is_ok());
/// assert!(matches!(reversion(1.0), Err(Error::DegenerateFit(_))));
/// ```
#[macro_export]
macro_rules! ensure_fit {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::DegenerateFit(
                format!($($msg)*)
            ));
        }
    };
}

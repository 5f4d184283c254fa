//! Model families and their parameter triple.
//!
//! ```text
//! Vasicek:  dr = k(θ − r) dt + σ dW
//! CIR:      dr = k(θ − r) dt + σ √r dW
//! ```

use sr_core::{ensure, errors::Result, Rate, Real};
use sr_math::Array;
use sr_processes::{OrnsteinUhlenbeckProcess, SquareRootProcess, StochasticProcess1D};
use std::fmt;

/// The short-rate model family being estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModelKind {
    /// Gaussian mean reversion.
    Vasicek,
    /// Cox–Ingersoll–Ross square-root diffusion.
    Cir,
}

impl ModelKind {
    /// Whether the model lives on strictly positive rates.
    pub fn requires_positive_rates(self) -> bool {
        matches!(self, Self::Cir)
    }

    /// Indices into `[k, θ, σ]` that must stay strictly positive when
    /// calibration is constrained.
    pub fn positive_components(self) -> &'static [usize] {
        match self {
            Self::Vasicek => &[0, 2],
            Self::Cir => &[0, 1, 2],
        }
    }

    /// The diffusion this model describes, started at `r0`.
    pub fn process(self, params: &ModelParameters, r0: Rate) -> Box<dyn StochasticProcess1D> {
        let ModelParameters { k, theta, sigma } = *params;
        match self {
            Self::Vasicek => Box::new(OrnsteinUhlenbeckProcess::new(k, theta, sigma, r0)),
            Self::Cir => Box::new(SquareRootProcess::new(k, theta, sigma, r0)),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vasicek => "Vasicek",
            Self::Cir => "CIR",
        })
    }
}

/// Mean-reversion speed `k`, long-run mean `θ` and volatility `σ`.
///
/// A plain value: nothing here enforces positivity or the Feller condition.
/// Fitted parameters should be checked by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelParameters {
    /// Mean-reversion speed.
    pub k: Real,
    /// Long-run mean.
    pub theta: Real,
    /// Volatility.
    pub sigma: Real,
}

impl ModelParameters {
    /// Bundle `(k, θ, σ)`.
    pub fn new(k: Real, theta: Real, sigma: Real) -> Self {
        Self { k, theta, sigma }
    }

    /// Read `[k, θ, σ]` back from an optimizer vector.
    pub fn from_array(x: &Array) -> Result<Self> {
        ensure!(
            x.size() == 3,
            "expected a [k, θ, σ] vector, got {} components",
            x.size()
        );
        Ok(Self::new(x[0], x[1], x[2]))
    }

    /// `[k, θ, σ]` as an optimizer vector.
    pub fn to_array(&self) -> Array {
        Array::from_slice(&self.to_vec())
    }

    /// `[k, θ, σ]`.
    pub fn to_vec(&self) -> Vec<Real> {
        vec![self.k, self.theta, self.sigma]
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.k.is_finite() && self.theta.is_finite() && self.sigma.is_finite()
    }

    /// Whether `2kθ ≥ σ²`.
    pub fn feller_satisfied(&self) -> bool {
        2.0 * self.k * self.theta >= self.sigma * self.sigma
    }
}

impl fmt::Display for ModelParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "k = {:.6}, θ = {:.6}, σ = {:.6}",
            self.k, self.theta, self.sigma
        )
    }
}

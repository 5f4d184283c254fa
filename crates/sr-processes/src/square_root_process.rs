//! Square-root process, the Cox–Ingersoll–Ross short-rate dynamics.
//!
//! ```text
//! dr = k(θ − r) dt + σ √r dW
//! ```

use crate::stochastic_process::StochasticProcess1D;
use sr_core::{Real, Time};

const SPEED_EPSILON: Real = 1e-15;

/// A square-root (CIR) process.
///
/// The diffusion coefficient is `σ√max(0, r)`: an Euler path that dips below
/// zero keeps its value but stops diffusing until the drift pulls it back.
///
/// Closed-form conditional moments:
/// ```text
/// E[r(t+τ) | r]   = θ + (r − θ) e^{−kτ}
/// Var[r(t+τ) | r] = r σ²/k (e^{−kτ} − e^{−2kτ}) + θ σ²/(2k) (1 − e^{−kτ})²
/// ```
#[derive(Debug, Clone)]
pub struct SquareRootProcess {
    x0: Real,
    speed: Real,
    mean: Real,
    volatility: Real,
}

impl SquareRootProcess {
    /// Create a new square-root process.
    ///
    /// * `speed`: mean-reversion speed `k`
    /// * `mean`: long-run level `θ`
    /// * `volatility`: volatility `σ`
    /// * `x0`: initial rate
    pub fn new(speed: Real, mean: Real, volatility: Real, x0: Real) -> Self {
        Self {
            x0,
            speed,
            mean,
            volatility,
        }
    }
}

impl StochasticProcess1D for SquareRootProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.mean - x)
    }

    fn diffusion(&self, _t: Time, x: Real) -> Real {
        self.volatility * x.max(0.0).sqrt()
    }

    fn expectation(&self, _t: Time, x: Real, dt: Time) -> Real {
        self.mean + (x - self.mean) * (-self.speed * dt).exp()
    }

    fn variance(&self, _t: Time, x: Real, dt: Time) -> Real {
        let s2 = self.volatility * self.volatility;
        let x = x.max(0.0);
        if self.speed.abs() < SPEED_EPSILON {
            return x * s2 * dt;
        }
        let k = self.speed;
        let decay = (-k * dt).exp();
        // 1 − e^{−kτ}
        let one_minus = -(-k * dt).exp_m1();
        x * s2 / k * decay * one_minus + self.mean * s2 / (2.0 * k) * one_minus * one_minus
    }
}

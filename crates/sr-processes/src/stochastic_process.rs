//! `StochasticProcess1D`: the one-dimensional SDE interface.
//!
//! A process `dX = μ(t,X) dt + σ(t,X) dW` is described by its drift (`μ`)
//! and diffusion (`σ`). Implementors may override the conditional moments with
//! exact expressions; the defaults are first-order Euler approximations.

use sr_core::{Real, Time};

/// A 1-dimensional stochastic process `dX = μ(t,X) dt + σ(t,X) dW`.
pub trait StochasticProcess1D: std::fmt::Debug + Send + Sync {
    /// Initial value of the process.
    fn x0(&self) -> Real;

    /// Drift `μ(t, x)`.
    fn drift(&self, t: Time, x: Real) -> Real;

    /// Diffusion `σ(t, x)`.
    fn diffusion(&self, t: Time, x: Real) -> Real;

    /// Expected value `E[x(t+Δt) | x(t) = x]`.
    fn expectation(&self, t: Time, x: Real, dt: Time) -> Real {
        x + self.drift(t, x) * dt
    }

    /// Variance `Var[x(t+Δt) | x(t) = x]`.
    fn variance(&self, t: Time, x: Real, dt: Time) -> Real {
        let s = self.diffusion(t, x);
        s * s * dt
    }

    /// Standard deviation `√Var[x(t+Δt) | x(t) = x]`.
    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.variance(t, x, dt).sqrt()
    }

    /// One Euler–Maruyama step driven by the standard-normal draw `dw`:
    /// `x + μ(t,x)·Δt + σ(t,x)·√Δt·dw`.
    ///
    /// Always the plain discretization, even when the conditional moments
    /// are overridden with exact expressions.
    fn euler_step(&self, t: Time, x: Real, dt: Time, dw: Real) -> Real {
        x + self.drift(t, x) * dt + self.diffusion(t, x) * dt.sqrt() * dw
    }
}

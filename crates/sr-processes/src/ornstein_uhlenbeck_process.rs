//! Ornstein–Uhlenbeck process, the Vasicek short-rate dynamics.
//!
//! ```text
//! dr = k(θ − r) dt + σ dW
//! ```

use crate::stochastic_process::StochasticProcess1D;
use sr_core::{Real, Time};

/// Below this `|k|` the process is treated as a Brownian motion.
const SPEED_EPSILON: Real = 1e-15;

/// An Ornstein–Uhlenbeck mean-reverting process.
///
/// Closed-form conditional moments:
/// ```text
/// E[r(t+τ) | r(t)]   = θ + (r(t) − θ) · e^{−kτ}
/// Var[r(t+τ) | r(t)] = σ² / (2k) · (1 − e^{−2kτ})
/// ```
///
/// A negative `k` is accepted: the moments stay well defined and diverge.
#[derive(Debug, Clone)]
pub struct OrnsteinUhlenbeckProcess {
    x0: Real,
    speed: Real,
    level: Real,
    volatility: Real,
}

impl OrnsteinUhlenbeckProcess {
    /// Create a new Ornstein–Uhlenbeck process.
    ///
    /// * `speed`: mean-reversion speed `k`
    /// * `level`: long-run mean `θ`
    /// * `volatility`: diffusion coefficient `σ`
    /// * `x0`: initial rate
    pub fn new(speed: Real, level: Real, volatility: Real, x0: Real) -> Self {
        Self {
            x0,
            speed,
            level,
            volatility,
        }
    }
}

impl StochasticProcess1D for OrnsteinUhlenbeckProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.level - x)
    }

    fn diffusion(&self, _t: Time, _x: Real) -> Real {
        self.volatility
    }

    fn expectation(&self, _t: Time, x: Real, dt: Time) -> Real {
        self.level + (x - self.level) * (-self.speed * dt).exp()
    }

    fn variance(&self, _t: Time, _x: Real, dt: Time) -> Real {
        let s2 = self.volatility * self.volatility;
        if self.speed.abs() < SPEED_EPSILON {
            s2 * dt
        } else {
            // (1 − e^{−2kτ}) / (2k), via expm1 for small kτ
            -s2 * (-2.0 * self.speed * dt).exp_m1() / (2.0 * self.speed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    #[test]
    fn drift_and_diffusion() {
        let p = OrnsteinUhlenbeckProcess::new(2.0, 1.0, 0.3, 0.5);
        assert_abs_diff_eq!(p.x0(), 0.5, epsilon = 1e-15);
        // k (θ − x) = 2 (1.0 − 0.5)
        assert_abs_diff_eq!(p.drift(0.0, 0.5), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.diffusion(0.0, 0.5), 0.3, epsilon = 1e-15);
        assert_abs_diff_eq!(p.diffusion(0.0, -4.0), 0.3, epsilon = 1e-15);
    }

    #[test]
    fn expectation_mean_reversion() {
        let p = OrnsteinUhlenbeckProcess::new(1.0, 0.0, 0.2, 0.5);
        let e = p.expectation(0.0, 0.5, 1.0);
        assert_abs_diff_eq!(e, 0.5 * (-1.0_f64).exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(p.expectation(0.0, 0.0, 3.0), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn variance_formula() {
        let (speed, sigma, dt) = (2.0, 0.3, 0.5);
        let p = OrnsteinUhlenbeckProcess::new(speed, 0.0, sigma, 0.5);
        let expected = sigma * sigma * (1.0 - (-2.0 * speed * dt).exp()) / (2.0 * speed);
        assert_relative_eq!(p.variance(0.0, 0.5, dt), expected, max_relative = 1e-14);
        assert_relative_eq!(
            p.std_deviation(0.0, 0.5, dt).powi(2),
            p.variance(0.0, 0.5, dt),
            max_relative = 1e-14
        );
    }

    #[test]
    fn zero_speed_degenerates_to_brownian() {
        let p = OrnsteinUhlenbeckProcess::new(0.0, 0.0, 0.3, 1.0);
        assert_abs_diff_eq!(p.expectation(0.0, 1.0, 0.25), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.variance(0.0, 1.0, 0.25), 0.09 * 0.25, epsilon = 1e-15);
    }

    #[test]
    fn euler_step_is_not_the_exact_mean() {
        let p = OrnsteinUhlenbeckProcess::new(2.0, 0.05, 0.02, 0.03);
        let dt = 0.01;
        let euler = p.euler_step(0.0, 0.03, dt, 0.0);
        assert_abs_diff_eq!(euler, 0.03 + 2.0 * 0.02 * dt, epsilon = 1e-15);
        assert!((euler - p.expectation(0.0, 0.03, dt)).abs() > 0.0);
    }

    #[test]
    fn negative_speed_diverges() {
        let p = OrnsteinUhlenbeckProcess::new(-0.5, 0.05, 0.01, 0.03);
        let e = p.expectation(0.0, 0.03, 2.0);
        assert!(e < 0.03);
        assert!(p.variance(0.0, 0.03, 2.0) > 0.01 * 0.01 * 2.0);
    }

    #[test]
    fn variance_saturates_at_stationary_level() {
        let p = OrnsteinUhlenbeckProcess::new(3.0, 0.0, 0.2, 0.0);
        let stationary = 0.04 / 6.0;
        assert_relative_eq!(p.variance(0.0, 0.0, 10.0), stationary, max_relative = 1e-15);
        assert_eq!(p.variance(0.0, 0.0, 20.0), p.variance(0.0, 0.0, 10.0));
    }

    proptest! {
        #[test]
        fn variance_is_positive_and_increasing(
            speed in -3.0f64..3.0,
            sigma in 0.001f64..1.0,
            tau in 0.01f64..10.0,
        ) {
            let p = OrnsteinUhlenbeckProcess::new(speed, 0.0, sigma, 0.0);
            let v1 = p.variance(0.0, 0.0, tau);
            let v2 = p.variance(0.0, 0.0, 2.0 * tau);
            prop_assert!(v1 > 0.0);
            prop_assert!(v2 >= v1);
            // beyond a few relaxation times both sit at σ²/2k to machine precision
            if speed * tau <= 5.0 {
                prop_assert!(v2 > v1);
            }
        }
    }
}

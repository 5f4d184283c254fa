//! Monte Carlo path generation.
//!
//! [`PathGenerator`] advances a [`StochasticProcess1D`] through a uniform
//! grid with Euler–Maruyama steps, drawing one standard-normal shock per step
//! from a [`NormalSequence`]. The stream is consumed in step order, so a fixed
//! seed reproduces the path exactly.

use sr_core::{ensure, errors::Error, errors::Result, RatePath, Real, Size, Time};
use sr_math::random_numbers::NormalSequence;
use sr_processes::StochasticProcess1D;

/// Generates sample paths of a 1-D process on the grid `0, dt, …, N·dt`.
#[derive(Debug)]
pub struct PathGenerator<'a, P: ?Sized, R> {
    process: &'a P,
    dt: Time,
    steps: Size,
    rng: R,
}

impl<'a, P, R> PathGenerator<'a, P, R>
where
    P: StochasticProcess1D + ?Sized,
    R: NormalSequence,
{
    /// Create a generator covering `horizon` years in `steps` equal steps.
    ///
    /// Fails with `InvalidInput` unless `horizon > 0` and `steps > 0`.
    pub fn new(process: &'a P, horizon: Time, steps: Size, rng: R) -> Result<Self> {
        ensure!(
            horizon.is_finite() && horizon > 0.0,
            "simulation horizon must be positive, got {horizon}"
        );
        ensure!(steps > 0, "number of simulation steps must be positive");
        Ok(Self {
            process,
            dt: horizon / steps as Real,
            steps,
            rng,
        })
    }

    /// The grid spacing `T / N`.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Generate one path of `N + 1` rates starting at the process's `x0`.
    pub fn next_path(&mut self) -> Result<RatePath> {
        let mut rates = Vec::with_capacity(self.steps + 1);
        let mut x = self.process.x0();
        rates.push(x);

        for i in 0..self.steps {
            let t = i as Real * self.dt;
            let dw = self.rng.next_normal();
            let next = self.process.euler_step(t, x, self.dt, dw);
            if !next.is_finite() {
                return Err(Error::domain("Euler step", &[t, x, dw]).at_pair(i));
            }
            x = next;
            rates.push(x);
        }

        RatePath::new(self.dt, rates)
    }
}

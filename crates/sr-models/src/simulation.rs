//! Synthetic rate paths with known parameters.
//!
//! Paths are generated with the Euler scheme on `N` equal steps over
//! `[0, T]`:
//!
//! ```text
//! Vasicek:  r_t = r_{t−1} + k(θ − r_{t−1}) dt + σ √dt Z
//! CIR:      r_t = r_{t−1} + k(θ − r_{t−1}) dt + σ √dt √max(0, r_{t−1}) Z
//! ```
//!
//! The CIR clamp only affects the diffusion coefficient; a discretized path
//! may still dip below zero.

use crate::parameters::{ModelKind, ModelParameters};
use sr_core::{ensure, errors::Result, Rate, RatePath, Size, Time};
use sr_math::random_numbers::{InverseCumulativeNormalRng, NormalSequence};
use sr_methods::PathGenerator;

/// Simulate one path of `steps + 1` rates, drawing shocks from `rng`.
///
/// # Errors
/// `InvalidInput` unless `horizon > 0`, `steps > 0`, and the parameters and
/// `r0` are finite.
pub fn simulate<R: NormalSequence>(
    kind: ModelKind,
    params: &ModelParameters,
    r0: Rate,
    horizon: Time,
    steps: Size,
    rng: R,
) -> Result<RatePath> {
    ensure!(params.is_finite(), "simulation parameters must be finite ({params})");
    ensure!(r0.is_finite(), "initial rate must be finite, got {r0}");
    let process = kind.process(params, r0);
    PathGenerator::new(process.as_ref(), horizon, steps, rng)?.next_path()
}

/// [`simulate`] with a Mersenne-Twister stream fixed by `seed`.
pub fn simulate_seeded(
    kind: ModelKind,
    params: &ModelParameters,
    r0: Rate,
    horizon: Time,
    steps: Size,
    seed: u64,
) -> Result<RatePath> {
    simulate(
        kind,
        params,
        r0,
        horizon,
        steps,
        InverseCumulativeNormalRng::new(seed),
    )
}

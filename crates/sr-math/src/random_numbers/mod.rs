//! Random number generators.
//!
//! The simulator draws its Gaussian shocks through the [`NormalSequence`]
//! trait. Two sources are provided: a Mersenne Twister pushed through the
//! inverse normal CDF, whose stream is fixed by the seed alone, and a
//! `rand`-backed generator sampling `rand_distr::StandardNormal`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_mt::Mt19937GenRand64;
use sr_core::Real;

/// A source of independent standard-normal deviates.
pub trait NormalSequence {
    /// Draw the next `N(0, 1)` deviate.
    fn next_normal(&mut self) -> Real;

    /// Fill `out` with successive deviates.
    fn fill_normals(&mut self, out: &mut [Real]) {
        for z in out.iter_mut() {
            *z = self.next_normal();
        }
    }
}

impl<T: NormalSequence + ?Sized> NormalSequence for &mut T {
    fn next_normal(&mut self) -> Real {
        (**self).next_normal()
    }
}

/// A uniform pseudo-random number generator based on MT19937-64.
#[derive(Debug, Clone)]
pub struct MersenneTwisterUniformRng {
    rng: Mt19937GenRand64,
}

impl MersenneTwisterUniformRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mt19937GenRand64::new(seed),
        }
    }

    /// Generate the next uniform deviate in `[0, 1]`.
    ///
    /// Both ends can occur through rounding of the 64-bit draw.
    pub fn next_real(&mut self) -> Real {
        self.rng.next_u64() as Real / (u64::MAX as Real + 1.0)
    }
}

/// Gaussian deviates from a Mersenne Twister via the inverse normal CDF.
#[derive(Debug, Clone)]
pub struct InverseCumulativeNormalRng {
    inner: MersenneTwisterUniformRng,
}

impl InverseCumulativeNormalRng {
    /// Create a generator backed by a Mersenne Twister with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: MersenneTwisterUniformRng::new(seed),
        }
    }

    /// Generate the next standard-normal deviate.
    pub fn next_real(&mut self) -> Real {
        // exact 0 or 1 would map to ±∞
        let u = loop {
            let u = self.inner.next_real();
            if u > 0.0 && u < 1.0 {
                break u;
            }
        };
        crate::distributions::normal_cdf_inverse(u)
    }
}

impl NormalSequence for InverseCumulativeNormalRng {
    fn next_normal(&mut self) -> Real {
        self.next_real()
    }
}

/// Gaussian deviates sampled from `rand_distr::StandardNormal` over any
/// `rand` generator.
#[derive(Debug, Clone)]
pub struct StandardNormalRng<R> {
    rng: R,
}

impl<R: Rng> StandardNormalRng<R> {
    /// Wrap an existing generator.
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Consume the wrapper and return the underlying generator.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl StandardNormalRng<StdRng> {
    /// A reproducible stream determined by `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// A stream seeded from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> NormalSequence for StandardNormalRng<R> {
    fn next_normal(&mut self) -> Real {
        self.rng.sample(StandardNormal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::Statistics;

    #[test]
    fn mt_range() {
        let mut rng = MersenneTwisterUniformRng::new(42);
        for _ in 0..1_000 {
            let x = rng.next_real();
            assert!((0.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn mt_stream_is_fixed_by_seed() {
        let mut a = InverseCumulativeNormalRng::new(7);
        let mut b = InverseCumulativeNormalRng::new(7);
        let mut c = InverseCumulativeNormalRng::new(8);
        let xa: Vec<Real> = (0..20).map(|_| a.next_normal()).collect();
        let xb: Vec<Real> = (0..20).map(|_| b.next_normal()).collect();
        let xc: Vec<Real> = (0..20).map(|_| c.next_normal()).collect();
        assert_eq!(xa, xb);
        assert_ne!(xa, xc);
    }

    #[test]
    fn icn_moments() {
        let mut rng = InverseCumulativeNormalRng::new(42);
        let stats: Statistics = (0..20_000).map(|_| rng.next_normal()).collect();
        assert!(stats.mean().unwrap().abs() < 0.05);
        assert!((stats.std_dev().unwrap() - 1.0).abs() < 0.05);
    }

    #[test]
    fn standard_normal_moments() {
        let mut rng = StandardNormalRng::seeded(42);
        let mut buf = vec![0.0; 20_000];
        rng.fill_normals(&mut buf);
        let stats: Statistics = buf.iter().collect();
        assert!(stats.mean().unwrap().abs() < 0.05);
        assert!((stats.std_dev().unwrap() - 1.0).abs() < 0.05);
    }

    #[test]
    fn seeded_streams_repeat() {
        let mut a = StandardNormalRng::seeded(11);
        let mut b = StandardNormalRng::seeded(11);
        for _ in 0..10 {
            assert_eq!(a.next_normal(), b.next_normal());
        }
    }

    #[test]
    fn entropy_stream_is_finite() {
        let mut rng = StandardNormalRng::from_entropy();
        assert!(rng.next_normal().is_finite());
    }

    #[test]
    fn borrowed_sequence_advances_owner() {
        fn draw<N: NormalSequence>(mut n: N) -> Real {
            n.next_normal()
        }
        let mut owner = InverseCumulativeNormalRng::new(3);
        let first = draw(&mut owner);
        let mut fresh = InverseCumulativeNormalRng::new(3);
        assert_eq!(first, fresh.next_normal());
        assert_eq!(owner.next_normal(), fresh.next_normal());
    }
}

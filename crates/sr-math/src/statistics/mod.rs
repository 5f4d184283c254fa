//! Sample statistics.
//!
//! [`Statistics`] accumulates samples one at a time with Welford's update, so
//! residuals of a few basis points around zero keep their precision.

use sr_core::{ensure, errors::Result, Real};
use statrs::statistics::{Data, OrderStatistics};

/// Incremental statistics accumulator.
#[derive(Debug, Clone)]
pub struct Statistics {
    count: usize,
    mean: Real,
    m2: Real,
    min: Real,
    max: Real,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Statistics {
    /// Create a new empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: Real::INFINITY,
            max: Real::NEG_INFINITY,
        }
    }

    /// Add a single sample.
    pub fn add(&mut self, x: Real) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as Real;
        self.m2 += delta * (x - self.mean);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    /// Number of samples.
    pub fn samples(&self) -> usize {
        self.count
    }

    /// Sample mean.  Returns `None` if no samples have been added.
    pub fn mean(&self) -> Option<Real> {
        (self.count > 0).then_some(self.mean)
    }

    /// Unbiased (Bessel-corrected) variance.  Returns `None` for fewer than
    /// 2 samples.
    pub fn variance(&self) -> Option<Real> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as Real)
    }

    /// Unbiased standard deviation.
    pub fn std_dev(&self) -> Option<Real> {
        self.variance().map(Real::sqrt)
    }

    /// Population variance (divisor `n`).  Returns `None` if empty.
    pub fn population_variance(&self) -> Option<Real> {
        (self.count > 0).then(|| self.m2 / self.count as Real)
    }

    /// Population standard deviation (divisor `n`).
    pub fn population_std_dev(&self) -> Option<Real> {
        self.population_variance().map(Real::sqrt)
    }

    /// Minimum sample value.
    pub fn minimum(&self) -> Option<Real> {
        (self.count > 0).then_some(self.min)
    }

    /// Maximum sample value.
    pub fn maximum(&self) -> Option<Real> {
        (self.count > 0).then_some(self.max)
    }

    /// Reset the accumulator to its initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Extend<Real> for Statistics {
    fn extend<I: IntoIterator<Item = Real>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}

impl<'a> Extend<&'a Real> for Statistics {
    fn extend<I: IntoIterator<Item = &'a Real>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl FromIterator<Real> for Statistics {
    fn from_iter<I: IntoIterator<Item = Real>>(iter: I) -> Self {
        let mut s = Self::new();
        s.extend(iter);
        s
    }
}

impl<'a> FromIterator<&'a Real> for Statistics {
    fn from_iter<I: IntoIterator<Item = &'a Real>>(iter: I) -> Self {
        iter.into_iter().copied().collect()
    }
}

/// Empirical `p`-quantile (`0 ≤ p ≤ 1`) with linear interpolation between
/// order statistics.
pub fn percentile(samples: &[Real], p: Real) -> Result<Real> {
    ensure!(!samples.is_empty(), "percentile of an empty sample");
    ensure!(
        (0.0..=1.0).contains(&p),
        "percentile level must lie in [0, 1], got {p}"
    );
    ensure!(
        samples.iter().all(|x| x.is_finite()),
        "percentile of a sample with non-finite values"
    );
    let mut data = Data::new(samples.to_vec());
    let pos = p * (samples.len() - 1) as Real;
    let below = pos.floor() as usize;
    let w = pos - below as Real;
    // order statistics are 1-based
    let lo = data.order_statistic(below + 1);
    if w == 0.0 {
        return Ok(lo);
    }
    let hi = data.order_statistic(below + 2);
    Ok(lo + w * (hi - lo))
}

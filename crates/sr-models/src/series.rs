//! Series preparation: domain shifts and lagged pairs.
//!
//! Every estimator consumes a [`PairedSeries`], the `(r_{t−1}, r_t)` pairs
//! of a [`RatePath`]. Pairing is done once, here, so no estimator relies on
//! positional alignment of two raw arrays.

use sr_core::{ensure, errors::Error, errors::Result, Rate, RatePath, Real};
use sr_math::statistics::percentile;
use std::fmt;

// ── Domain shift ──────────────────────────────────────────────────────────────

/// A constant added to every observation before fitting.
///
/// CIR only lives on positive rates, so series that touch zero or go
/// negative are lifted by `s` before fitting and every forecast has `s`
/// removed again.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DomainShift(Real);

impl DomainShift {
    /// No shift.
    pub const NONE: Self = Self(0.0);

    /// A shift of `s`, which must be finite and non-negative.
    pub fn new(s: Real) -> Result<Self> {
        ensure!(
            s.is_finite() && s >= 0.0,
            "domain shift must be finite and non-negative, got {s}"
        );
        Ok(Self(s))
    }

    /// The smallest shift that lifts `path` above zero with `margin` to
    /// spare. Already positive paths are not shifted.
    pub fn covering(path: &RatePath, margin: Real) -> Result<Self> {
        ensure!(
            margin.is_finite() && margin > 0.0,
            "shift margin must be positive, got {margin}"
        );
        let min = path.min_rate();
        if min > 0.0 {
            return Ok(Self::NONE);
        }
        Self::new(-min + margin)
    }

    /// Shift by the `p`-quantile (`0 ≤ p ≤ 1`) of the path's values.
    pub fn from_percentile(path: &RatePath, p: Real) -> Result<Self> {
        let s = percentile(path.rates(), p)?;
        let shift = Self::new(s)?;
        shift.validate(path)?;
        Ok(shift)
    }

    /// Check that every shifted observation of `path` is strictly positive.
    pub fn validate(&self, path: &RatePath) -> Result<()> {
        let min = path.min_rate();
        ensure!(
            min + self.0 > 0.0,
            "shift {} leaves the minimum observation {min} non-positive",
            self.0
        );
        Ok(())
    }

    /// The shift amount.
    pub fn value(&self) -> Real {
        self.0
    }

    /// Whether this is the zero shift.
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Move a rate onto the fitting scale.
    pub fn apply(&self, r: Rate) -> Rate {
        r + self.0
    }

    /// Move a rate back onto the original scale.
    pub fn remove(&self, r: Rate) -> Rate {
        r - self.0
    }
}

impl fmt::Display for DomainShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

// ── Paired series ─────────────────────────────────────────────────────────────

/// Lagged pairs `(r_{t−1}, r_t)` taken from a rate path.
///
/// Invariants: one pair fewer than the source path, at least one pair, every
/// value finite, and `prev()[i + 1] == curr()[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedSeries {
    prev: Vec<Rate>,
    curr: Vec<Rate>,
    shift: DomainShift,
}

/// Pair the observations of `path`, adding `shift` to every value.
///
/// The first observation has no predecessor and only appears as a
/// previous rate. Paths with a single observation cannot form pairs.
pub fn prepare(path: &RatePath, shift: DomainShift) -> Result<PairedSeries> {
    ensure!(
        path.len() >= 2,
        "a series of {} observation(s) cannot form pairs",
        path.len()
    );
    let shifted: Vec<Rate> = path.rates().iter().map(|&r| shift.apply(r)).collect();
    let n = shifted.len();
    Ok(PairedSeries {
        prev: shifted[..n - 1].to_vec(),
        curr: shifted[1..].to_vec(),
        shift,
    })
}

impl PairedSeries {
    /// Build a series directly from pairs, for data that does not come
    /// from a single path.
    pub fn from_pairs(pairs: &[(Rate, Rate)]) -> Result<Self> {
        ensure!(!pairs.is_empty(), "at least one pair is required");
        if let Some(index) = pairs
            .iter()
            .position(|(p, c)| !p.is_finite() || !c.is_finite())
        {
            return Err(Error::MissingValue { index });
        }
        let (prev, curr) = pairs.iter().copied().unzip();
        Ok(Self {
            prev,
            curr,
            shift: DomainShift::NONE,
        })
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.prev.len()
    }

    /// Always `false`: a series holds at least one pair.
    pub fn is_empty(&self) -> bool {
        self.prev.is_empty()
    }

    /// The lagged rates `r_{t−1}`.
    pub fn prev(&self) -> &[Rate] {
        &self.prev
    }

    /// The current rates `r_t`.
    pub fn curr(&self) -> &[Rate] {
        &self.curr
    }

    /// Pair `i`, if present.
    pub fn get(&self, i: usize) -> Option<(Rate, Rate)> {
        Some((*self.prev.get(i)?, *self.curr.get(i)?))
    }

    /// Iterate over `(r_{t−1}, r_t)`.
    pub fn iter(&self) -> impl Iterator<Item = (Rate, Rate)> + '_ {
        self.prev.iter().copied().zip(self.curr.iter().copied())
    }

    /// The shift already applied to every value.
    pub fn shift(&self) -> DomainShift {
        self.shift
    }

    /// The most recent rate, on the fitting scale.
    pub fn last_rate(&self) -> Rate {
        self.curr[self.curr.len() - 1]
    }

    /// Fail with [`Error::NonPositiveRate`] at the first pair holding a rate
    /// `≤ 0`.
    pub fn require_positive(&self) -> Result<()> {
        for (index, (p, c)) in self.iter().enumerate() {
            let bad = if p <= 0.0 {
                Some(p)
            } else if c <= 0.0 {
                Some(c)
            } else {
                None
            };
            if let Some(rate) = bad {
                return Err(Error::NonPositiveRate { index, rate });
            }
        }
        Ok(())
    }
}

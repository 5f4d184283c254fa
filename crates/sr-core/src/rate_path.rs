//! Equally spaced rate observations.
//!
//! `RatePath` is the input every estimator starts from: an ordered sequence
//! of rates sampled on a uniform time grid `t_i = start + i · dt`. It is
//! produced either by the simulator or by loading market observations, and is
//! immutable once built.

use crate::errors::{Error, Result};
use crate::{Rate, Time};

/// An ordered, equally spaced sequence of `(time, rate)` samples.
///
/// Invariants (checked on construction): `dt > 0`, at least one sample, and
/// every rate is finite. Times are implied by the grid and therefore strictly
/// increasing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RatePath {
    start: Time,
    dt: Time,
    rates: Vec<Rate>,
}

impl RatePath {
    // ── Constructors ─────────────────────────────────────────────────────

    /// Build a path starting at `t = 0`.
    pub fn new(dt: Time, rates: Vec<Rate>) -> Result<Self> {
        Self::with_start(0.0, dt, rates)
    }

    /// Build a path whose first sample sits at `start`.
    pub fn with_start(start: Time, dt: Time, rates: Vec<Rate>) -> Result<Self> {
        crate::ensure!(
            dt.is_finite() && dt > 0.0,
            "time step must be positive and finite, got {dt}"
        );
        crate::ensure!(start.is_finite(), "start time must be finite, got {start}");
        crate::ensure!(
            !rates.is_empty(),
            "a rate path needs at least one observation"
        );
        if let Some(index) = rates.iter().position(|r| !r.is_finite()) {
            return Err(Error::MissingValue { index });
        }
        Ok(Self { start, dt, rates })
    }

    /// Build a path from observations that may have gaps.
    ///
    /// A gap anywhere in the input is fatal: the series is never silently
    /// truncated or interpolated.
    pub fn from_observations(dt: Time, observations: &[Option<Rate>]) -> Result<Self> {
        let rates = observations
            .iter()
            .enumerate()
            .map(|(index, obs)| obs.ok_or(Error::MissingValue { index }))
            .collect::<Result<Vec<_>>>()?;
        Self::new(dt, rates)
    }

    // ── Inspectors ───────────────────────────────────────────────────────

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the path is empty (never true for a constructed path).
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Grid spacing.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Time of the first sample.
    pub fn start(&self) -> Time {
        self.start
    }

    /// Time span covered, `(len − 1) · dt`.
    pub fn horizon(&self) -> Time {
        (self.len() - 1) as Time * self.dt
    }

    /// Time of sample `i`.
    pub fn time(&self, i: usize) -> Time {
        self.start + i as Time * self.dt
    }

    /// The rate values in time order.
    pub fn rates(&self) -> &[Rate] {
        &self.rates
    }

    /// The sample times in order.
    pub fn times(&self) -> Vec<Time> {
        (0..self.len()).map(|i| self.time(i)).collect()
    }

    /// Rate at sample `i`, or `None` if out of range.
    pub fn get(&self, i: usize) -> Option<Rate> {
        self.rates.get(i).copied()
    }

    /// The first rate.
    pub fn first(&self) -> Rate {
        self.rates[0]
    }

    /// The most recent rate.
    pub fn last(&self) -> Rate {
        self.rates[self.rates.len() - 1]
    }

    /// Smallest rate on the path.
    pub fn min_rate(&self) -> Rate {
        self.rates.iter().copied().fold(Rate::INFINITY, Rate::min)
    }

    /// Largest rate on the path.
    pub fn max_rate(&self) -> Rate {
        self.rates.iter().copied().fold(Rate::NEG_INFINITY, Rate::max)
    }

    /// Iterate over `(time, rate)` in time order.
    pub fn iter(&self) -> impl Iterator<Item = (Time, Rate)> + '_ {
        self.rates
            .iter()
            .enumerate()
            .map(move |(i, &r)| (self.time(i), r))
    }
}

impl std::ops::Index<usize> for RatePath {
    type Output = Rate;

    fn index(&self, i: usize) -> &Rate {
        &self.rates[i]
    }
}

impl std::fmt::Display for RatePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (t, r) in self.iter() {
            writeln!(f, "{t:.6} => {r}")?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

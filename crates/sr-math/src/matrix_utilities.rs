//! Matrix decompositions.
//!
//! Wraps nalgebra's SVD for the least-squares solver and the rank test that
//! guards it against collinear regressors.

use crate::array::Array;
use crate::matrix::Matrix;
use sr_core::{
    errors::{Error, Result},
    Real,
};

/// Singular value decomposition `A = U · diag(S) · Vᵀ`.
#[derive(Debug, Clone)]
pub struct Svd {
    /// Left singular vectors.
    pub u: Matrix,
    /// Singular values, one per column of `A` (thin decomposition).
    pub singular_values: Array,
    /// Right singular vectors, transposed.
    pub v_t: Matrix,
}

impl Svd {
    /// Compute the thin SVD of `m`.
    pub fn new(m: &Matrix) -> Result<Self> {
        let svd = m.inner().clone().svd(true, true);
        let u = svd
            .u
            .ok_or_else(|| Error::domain("SVD left singular vectors", &[]))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| Error::domain("SVD right singular vectors", &[]))?;
        Ok(Self {
            u: Matrix::from(u),
            singular_values: Array::from(svd.singular_values.clone_owned()),
            v_t: Matrix::from(v_t),
        })
    }

    /// Largest singular value.
    pub fn max_singular_value(&self) -> Real {
        self.singular_values.iter().copied().fold(0.0, Real::max)
    }

    /// Number of singular values above `tolerance`.
    pub fn rank(&self, tolerance: Real) -> usize {
        self.singular_values
            .iter()
            .filter(|&&s| s > tolerance)
            .count()
    }

    /// The LAPACK-style cutoff `max(rows, cols) · ε · s_max` for a matrix
    /// of the given shape.
    pub fn default_tolerance(&self, rows: usize, cols: usize) -> Real {
        rows.max(cols) as Real * Real::EPSILON * self.max_singular_value()
    }
}

/// Numerical rank of `m` using the default SVD cutoff.
pub fn rank(m: &Matrix) -> Result<usize> {
    let svd = Svd::new(m)?;
    Ok(svd.rank(svd.default_tolerance(m.rows(), m.cols())))
}

//! Ordinary least-squares regression.
//!
//! Solves $\mathbf{y} = \mathbf{A}\,\boldsymbol{\beta} + \boldsymbol{\varepsilon}$
//! through the SVD of the design matrix, thresholding small singular values.
//! The numerical rank is kept so callers can reject collinear regressors
//! instead of silently receiving the minimum-norm solution.

use crate::array::Array;
use crate::matrix::Matrix;
use crate::matrix_utilities::Svd;
use nalgebra::DVector;
use sr_core::{ensure, errors::Result, Real};

/// Result of a linear least-squares fit.
#[derive(Debug, Clone)]
pub struct LinearLeastSquaresRegression {
    coefficients: Array,
    standard_errors: Array,
    residuals: Array,
    rank: usize,
    total_sum_of_squares: Real,
}

impl LinearLeastSquaresRegression {
    /// Fit against regressor columns, one slice per coefficient.
    ///
    /// No intercept is added; pass a column of ones for one.
    pub fn from_columns(columns: &[&[Real]], y: &[Real]) -> Result<Self> {
        ensure!(!columns.is_empty(), "at least one regressor is required");
        ensure!(
            columns.iter().all(|c| c.len() == y.len()),
            "every regressor must have {} observations",
            y.len()
        );
        Self::from_design_matrix(&Matrix::from_columns(columns), y)
    }

    /// Fit given a pre-built *n × m* design matrix.
    pub fn from_design_matrix(a: &Matrix, y: &[Real]) -> Result<Self> {
        let n = a.rows();
        let m = a.cols();
        ensure!(
            y.len() == n,
            "response has {} observations but design matrix has {n} rows",
            y.len()
        );
        ensure!(
            n >= m,
            "{n} observations cannot identify {m} coefficients"
        );
        ensure!(
            y.iter().all(|v| v.is_finite()) && a.inner().iter().all(|v| v.is_finite()),
            "regression inputs must be finite"
        );

        let svd = Svd::new(a)?;
        let threshold = svd.default_tolerance(n, m);
        let sv = &svd.singular_values;
        let y_vec = DVector::from_column_slice(y);
        let ut_y = svd.u.inner().transpose() * &y_vec;

        // β = V · diag(1/s) · Uᵀ y over the retained singular values
        let mut coefficients = vec![0.0; m];
        let mut var_diag = vec![0.0; m];
        for k in 0..sv.size() {
            let s = sv[k];
            if s <= threshold {
                continue;
            }
            let ratio = ut_y[k] / s;
            let s2_inv = 1.0 / (s * s);
            for j in 0..m {
                let v = svd.v_t[(k, j)];
                coefficients[j] += ratio * v;
                var_diag[j] += s2_inv * v * v;
            }
        }

        let coefficients = Array::from_vec(coefficients);
        let residuals = Array::from(&y_vec - a.inner() * coefficients.inner());

        let resid_ss: Real = residuals.iter().map(|r| r * r).sum();
        let sigma2 = if n > m {
            resid_ss / (n - m) as Real
        } else {
            0.0
        };
        let standard_errors =
            Array::from_vec(var_diag.iter().map(|v| (v * sigma2).sqrt()).collect());

        let y_mean = y.iter().sum::<Real>() / n as Real;
        let total_sum_of_squares = y.iter().map(|v| (v - y_mean).powi(2)).sum();

        Ok(Self {
            coefficients,
            standard_errors,
            residuals,
            rank: svd.rank(threshold),
            total_sum_of_squares,
        })
    }

    /// Fitted coefficients β.
    pub fn coefficients(&self) -> &Array {
        &self.coefficients
    }

    /// Standard errors of the coefficients, using `n − m` degrees of freedom.
    pub fn standard_errors(&self) -> &Array {
        &self.standard_errors
    }

    /// Residuals `y − A β`.
    pub fn residuals(&self) -> &Array {
        &self.residuals
    }

    /// Numerical rank of the design matrix.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Whether every coefficient is identified.
    pub fn is_full_rank(&self) -> bool {
        self.rank == self.coefficients.size()
    }

    /// Residual sum of squares.
    pub fn residual_sum_of_squares(&self) -> Real {
        self.residuals.iter().map(|r| r * r).sum()
    }

    /// Coefficient of determination, relative to the mean of `y`.
    ///
    /// For a model without an intercept this can be negative.
    pub fn r_squared(&self) -> Real {
        if self.total_sum_of_squares == 0.0 {
            return 1.0;
        }
        1.0 - self.residual_sum_of_squares() / self.total_sum_of_squares
    }
}

//! Combinatoric and Ryser permanents, the permanent derivative and the adjugate

extern crate nalgebra as na;

use color_eyre::eyre::{ensure, eyre, Result};
use itertools::Itertools;
use na::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SINGULAR_THRESHOLD: f64 = 1e-12;

/// Permanent evaluator used by the overlap engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermanentMethod {
    Combinatoric,
    #[default]
    Ryser,
}

impl PermanentMethod {
    pub fn evaluate(&self, matrix: &DMatrix<f64>) -> Result<f64> {
        match self {
            PermanentMethod::Combinatoric => permanent_combinatoric(matrix),
            PermanentMethod::Ryser => permanent_ryser(matrix),
        }
    }
}

impl FromStr for PermanentMethod {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "combinatoric" => Ok(Self::Combinatoric),
            "ryser" => Ok(Self::Ryser),
            _ => Err(eyre!("Unknown permanent method: {}", s)),
        }
    }
}

impl fmt::Display for PermanentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermanentMethod::Combinatoric => write!(f, "combinatoric"),
            PermanentMethod::Ryser => write!(f, "ryser"),
        }
    }
}

/// Orient a matrix so that it has no more rows than columns
fn wide(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    if matrix.nrows() > matrix.ncols() {
        matrix.transpose()
    } else {
        matrix.clone()
    }
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

/// Permanent by explicit summation over all injective maps from rows to columns
///
/// # Arguments
/// * `matrix` - Any non-empty matrix; tall matrices are transposed first
pub fn permanent_combinatoric(matrix: &DMatrix<f64>) -> Result<f64> {
    ensure!(
        matrix.nrows() > 0 && matrix.ncols() > 0,
        "Cannot compute the permanent of an empty matrix"
    );
    let m = wide(matrix);
    let perm = (0..m.ncols())
        .permutations(m.nrows())
        .map(|cols| {
            cols.iter()
                .enumerate()
                .map(|(row, &col)| m[(row, col)])
                .product::<f64>()
        })
        .sum::<f64>();
    Ok(perm)
}

/// Permanent by Ryser's inclusion-exclusion formula
///
/// Column subsets are visited in Gray code order so that each step updates the row
/// sums with a single column. Rectangular `m x n` input is padded with `n - m` rows
/// of ones and the result divided by `(n - m)!`.
pub fn permanent_ryser(matrix: &DMatrix<f64>) -> Result<f64> {
    ensure!(
        matrix.nrows() > 0 && matrix.ncols() > 0,
        "Cannot compute the permanent of an empty matrix"
    );
    let m = wide(matrix);
    let (nrows, n) = m.shape();
    ensure!(n < 64, "Matrix with {} columns is too large for Ryser's formula", n);

    let padded = if nrows < n {
        let mut square = DMatrix::from_element(n, n, 1.0);
        square.rows_mut(0, nrows).copy_from(&m);
        square
    } else {
        m
    };

    let mut row_sums = vec![0.0; n];
    let mut in_subset = vec![false; n];
    let mut subset_size = 0usize;
    let mut total = 0.0;
    for k in 1u64..(1u64 << n) {
        let col = k.trailing_zeros() as usize;
        let delta = if in_subset[col] { -1.0 } else { 1.0 };
        in_subset[col] = !in_subset[col];
        if in_subset[col] {
            subset_size += 1;
        } else {
            subset_size -= 1;
        }
        for (row, sum) in row_sums.iter_mut().enumerate() {
            *sum += delta * padded[(row, col)];
        }
        let product: f64 = row_sums.iter().product();
        if subset_size % 2 == 1 {
            total -= product;
        } else {
            total += product;
        }
    }
    if n % 2 == 1 {
        total = -total;
    }

    Ok(total / factorial(n - nrows))
}

/// Derivative of the permanent with respect to the entry `(row, col)`
///
/// The permanent is linear in every entry, so the derivative is the permanent of the
/// minor with `row` and `col` removed. A minor without rows or columns contributes 1.
pub fn permanent_derivative(matrix: &DMatrix<f64>, row: usize, col: usize) -> Result<f64> {
    let (nrows, ncols) = matrix.shape();
    ensure!(
        row < nrows && col < ncols,
        "Entry ({}, {}) is outside of a {}x{} matrix",
        row,
        col,
        nrows,
        ncols
    );
    if nrows == 1 || ncols == 1 {
        return Ok(1.0);
    }
    let minor = matrix.clone().remove_row(row).remove_column(col);
    permanent_ryser(&minor)
}

/// Adjugate of a square matrix, `det(A) A^{-1}`
pub fn adjugate(matrix: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    ensure!(
        matrix.is_square(),
        "Adjugate requires a square matrix, got {}x{}",
        matrix.nrows(),
        matrix.ncols()
    );
    let det = matrix.determinant();
    ensure!(det.abs() > SINGULAR_THRESHOLD, "Matrix is singular");
    let inverse = matrix
        .clone()
        .try_inverse()
        .ok_or_else(|| eyre!("Matrix is singular"))?;
    Ok(inverse * det)
}

//! Borchardt's theorem for permanents of Cauchy matrices
//!
//! For a Cauchy matrix `C_ij = 1 / (lambda_i - epsilon_j)` Borchardt's identity gives
//! `perm(C) = det(C∘C) / det(C)`, so the permanent is available in polynomial time.
//! Row scalings `eta` and column scalings `zeta` factor out of every product.

extern crate nalgebra as na;

use color_eyre::eyre::{ensure, Result};
use itertools::Itertools;
use na::{DMatrix, DVector};

const SINGULAR_THRESHOLD: f64 = 1e-12;

/// Permanent of `A_ij = eta_i zeta_j / (lambda_i - epsilon_j)`
///
/// # Arguments
/// * `lambdas` - Row parameters, one per row
/// * `epsilons` - Column parameters, one per column
/// * `zetas` - Column scalings, one per column
/// * `etas` - Row scalings, one per row; all ones when `None`
///
/// # Returns
/// The permanent, summing `det(C∘C)/det(C)` over every square column selection of the
/// rectangular Cauchy matrix.
pub fn permanent_borchardt(
    lambdas: &DVector<f64>,
    epsilons: &DVector<f64>,
    zetas: &DVector<f64>,
    etas: Option<&DVector<f64>>,
) -> Result<f64> {
    ensure!(
        zetas.len() == epsilons.len(),
        "The number of zetas ({}) and epsilons ({}) must be equal",
        zetas.len(),
        epsilons.len()
    );
    if let Some(etas) = etas {
        ensure!(
            etas.len() == lambdas.len(),
            "The number of etas ({}) and lambdas ({}) must be equal",
            etas.len(),
            lambdas.len()
        );
    }
    ensure!(
        !lambdas.is_empty() && !epsilons.is_empty(),
        "Cannot compute the permanent of an empty matrix"
    );

    let row_scale = etas
        .cloned()
        .unwrap_or_else(|| DVector::from_element(lambdas.len(), 1.0));

    let mut cauchy = DMatrix::zeros(lambdas.len(), epsilons.len());
    for (i, lambda) in lambdas.iter().enumerate() {
        for (j, epsilon) in epsilons.iter().enumerate() {
            let gap = lambda - epsilon;
            ensure!(
                gap.abs() > SINGULAR_THRESHOLD,
                "lambda[{}] and epsilon[{}] coincide, the Cauchy matrix is undefined",
                i,
                j
            );
            cauchy[(i, j)] = 1.0 / gap;
        }
    }

    let (cauchy, col_scale, row_scale) = if cauchy.nrows() > cauchy.ncols() {
        (cauchy.transpose(), row_scale, zetas.clone())
    } else {
        (cauchy, zetas.clone(), row_scale)
    };

    let (nrows, ncols) = cauchy.shape();
    let mut perm_cauchy = 0.0;
    for cols in (0..ncols).combinations(nrows) {
        let sub = cauchy.select_columns(cols.iter());
        let det = sub.determinant();
        ensure!(
            det.abs() > SINGULAR_THRESHOLD,
            "Cauchy submatrix on columns {:?} is singular",
            cols
        );
        let det_squared = sub.component_mul(&sub).determinant();
        let perm_zetas: f64 = cols.iter().map(|&c| col_scale[c]).product();
        perm_cauchy += det_squared / det * perm_zetas;
    }

    Ok(perm_cauchy * row_scale.iter().product::<f64>())
}

//! Overlap of geminal wavefunctions with closed-shell determinants
//!
//! Both functions receive the doubly occupied spatial orbitals of a determinant that
//! already passed the electron count and pairing checks, together with the full
//! `npairs x norbs` coefficient matrix.

extern crate nalgebra as na;

use super::Mode;
use crate::permanent_impl::{permanent_derivative, PermanentMethod};
use color_eyre::eyre::{bail, Result};
use na::DMatrix;

/// APIG overlap: the permanent of the occupied columns of the coefficient matrix
pub fn apig_overlap(
    occupied: &[usize],
    coeffs: &DMatrix<f64>,
    mode: Mode,
    _: usize,
    method: PermanentMethod,
) -> Result<f64> {
    let columns = coeffs.select_columns(occupied.iter());
    match mode {
        Mode::Value => method.evaluate(&columns),
        Mode::Derivative(row, col) => match occupied.iter().position(|&orb| orb == col) {
            Some(position) => permanent_derivative(&columns, row, position),
            None => Ok(0.0),
        },
    }
}

/// AP1roG overlap in closed form
///
/// With the identity on the reference block, only the excited rows contribute. The
/// overlap depends on how many reference pairs were excited: none gives 1, one gives
/// the coefficient of that excitation, two give the 2x2 cross difference.
pub fn ap1rog_overlap(
    occupied: &[usize],
    coeffs: &DMatrix<f64>,
    mode: Mode,
    npairs: usize,
    _: PermanentMethod,
) -> Result<f64> {
    let from: Vec<usize> = (0..npairs).filter(|i| !occupied.contains(i)).collect();
    let to: Vec<usize> = occupied.iter().copied().filter(|&a| a >= npairs).collect();

    let overlap = match (from.as_slice(), to.as_slice()) {
        ([], []) => match mode {
            Mode::Value => 1.0,
            Mode::Derivative(i, j) if i == j => 1.0,
            Mode::Derivative(..) => 0.0,
        },
        (&[f], &[t]) => match mode {
            Mode::Value => coeffs[(f, t)],
            Mode::Derivative(i, j) if (i, j) == (f, t) => 1.0,
            Mode::Derivative(..) => 0.0,
        },
        (&[f0, f1], &[t0, t1]) => match mode {
            Mode::Value => coeffs[(f0, t0)] * coeffs[(f1, t1)] - coeffs[(f0, t1)] * coeffs[(f1, t0)],
            Mode::Derivative(i, j) if (i, j) == (f0, t0) => coeffs[(f1, t1)],
            Mode::Derivative(i, j) if (i, j) == (f1, t1) => coeffs[(f0, t0)],
            Mode::Derivative(i, j) if (i, j) == (f0, t1) => -coeffs[(f1, t0)],
            Mode::Derivative(i, j) if (i, j) == (f1, t0) => -coeffs[(f0, t1)],
            Mode::Derivative(..) => 0.0,
        },
        _ => bail!(
            "AP1roG overlap supports at most two pair excitations, got {}",
            from.len()
        ),
    };
    Ok(overlap)
}

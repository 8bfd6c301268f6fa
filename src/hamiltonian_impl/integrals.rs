//! Validated one- and two-electron integrals over spatial orbitals

extern crate nalgebra as na;

use color_eyre::eyre::{ensure, Result};
use na::DMatrix;

/// Integrals of the electronic Hamiltonian in an orthonormal spatial orbital basis
///
/// The two-electron integrals are stored flat in row-major order and use physicist's
/// notation, `g(i, j, k, l) = <ij|kl>`.
#[derive(Debug, Clone)]
pub struct IntegralSet {
    norbs: usize,
    one_electron: DMatrix<f64>,
    two_electron: Vec<f64>,
    nuclear_repulsion: f64,
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}

impl IntegralSet {
    /// Build and validate an integral set
    ///
    /// # Arguments
    /// * `one_electron` - Symmetric `K x K` core Hamiltonian
    /// * `two_electron` - `K^4` values of `<ij|kl>`, row-major
    /// * `nuclear_repulsion` - Constant added to electronic energies
    ///
    /// # Errors
    /// Fails on shape mismatches, a non-symmetric one-electron matrix, or two-electron
    /// integrals violating `<ij|kl> = <ji|lk>` or `<ij|kl> = <kl|ij>`.
    pub fn new(
        one_electron: DMatrix<f64>,
        two_electron: Vec<f64>,
        nuclear_repulsion: f64,
    ) -> Result<Self> {
        ensure!(
            one_electron.is_square(),
            "One-electron integrals must be square, got {}x{}",
            one_electron.nrows(),
            one_electron.ncols()
        );
        let norbs = one_electron.nrows();
        ensure!(norbs > 0, "Integrals over zero orbitals");
        ensure!(
            two_electron.len() == norbs.pow(4),
            "Expected {} two-electron integrals for {} orbitals, got {}",
            norbs.pow(4),
            norbs,
            two_electron.len()
        );

        for i in 0..norbs {
            for j in 0..i {
                ensure!(
                    is_close(one_electron[(i, j)], one_electron[(j, i)]),
                    "One-electron integrals are not Hermitian at ({}, {})",
                    i,
                    j
                );
            }
        }

        let integrals = Self {
            norbs,
            one_electron,
            two_electron,
            nuclear_repulsion,
        };
        for i in 0..norbs {
            for j in 0..norbs {
                for k in 0..norbs {
                    for l in 0..norbs {
                        let value = integrals.g(i, j, k, l);
                        ensure!(
                            is_close(value, integrals.g(j, i, l, k)),
                            "Two-electron integrals break <ij|kl> = <ji|lk> at ({}, {}, {}, {})",
                            i,
                            j,
                            k,
                            l
                        );
                        ensure!(
                            is_close(value, integrals.g(k, l, i, j)),
                            "Two-electron integrals break <ij|kl> = <kl|ij> at ({}, {}, {}, {})",
                            i,
                            j,
                            k,
                            l
                        );
                    }
                }
            }
        }

        Ok(integrals)
    }

    pub fn norbs(&self) -> usize {
        self.norbs
    }

    pub fn one_electron(&self) -> &DMatrix<f64> {
        &self.one_electron
    }

    pub fn two_electron(&self) -> &[f64] {
        &self.two_electron
    }

    pub fn nuclear_repulsion(&self) -> f64 {
        self.nuclear_repulsion
    }

    #[inline]
    pub fn h(&self, i: usize, j: usize) -> f64 {
        self.one_electron[(i, j)]
    }

    /// Two-electron integral `<ij|kl>`
    #[inline]
    pub fn g(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        let n = self.norbs;
        self.two_electron[((i * n + j) * n + k) * n + l]
    }
}

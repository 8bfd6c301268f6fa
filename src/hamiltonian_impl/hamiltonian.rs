//! Integration of the electronic Hamiltonian against a geminal wavefunction

extern crate nalgebra as na;

use crate::slater_impl::SlaterDeterminant;
use crate::wavefunction_impl::{Geminal, Mode};
use color_eyre::eyre::Result;
use na::DMatrix;
use std::ops::{Add, AddAssign, Div};

/// Contributions to `<sd|H|Psi>`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HamiltonianTerms {
    pub one_electron: f64,
    pub coulomb: f64,
    pub exchange: f64,
}

impl HamiltonianTerms {
    pub fn total(&self) -> f64 {
        self.one_electron + self.coulomb + self.exchange
    }
}

impl Add for HamiltonianTerms {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            one_electron: self.one_electron + other.one_electron,
            coulomb: self.coulomb + other.coulomb,
            exchange: self.exchange + other.exchange,
        }
    }
}

impl AddAssign for HamiltonianTerms {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Div<f64> for HamiltonianTerms {
    type Output = Self;

    fn div(self, scale: f64) -> Self {
        Self {
            one_electron: self.one_electron / scale,
            coulomb: self.coulomb / scale,
            exchange: self.exchange / scale,
        }
    }
}

impl Geminal {
    /// `<sd|H|Psi>` for the coefficient matrix `coeffs`, or its derivative
    ///
    /// Determinants occupying orbitals outside the basis do not couple to `Psi`.
    pub fn integrate(
        &self,
        sd: &SlaterDeterminant,
        coeffs: &DMatrix<f64>,
        mode: Mode,
    ) -> Result<HamiltonianTerms> {
        if !self.in_basis(sd) {
            return Ok(HamiltonianTerms::default());
        }
        if sd.is_closed_shell() {
            integrate_closed_shell(self, sd, coeffs, mode)
        } else {
            integrate_general(self, sd, coeffs, mode)
        }
    }
}

/// Hamiltonian integral for a closed-shell determinant
///
/// For a seniority-zero wavefunction the only surviving matrix elements are the
/// diagonal ones and the pair excitations `i -> a`, weighted by `<ii|aa>`.
pub fn integrate_closed_shell(
    geminal: &Geminal,
    sd: &SlaterDeterminant,
    coeffs: &DMatrix<f64>,
    mode: Mode,
) -> Result<HamiltonianTerms> {
    let ints = geminal.integrals();
    let olp = geminal.overlap(sd, coeffs, mode)?;
    let occupied = sd.occupied_pairs();
    let virtuals: Vec<usize> = (0..geminal.norbs())
        .filter(|&a| !sd.is_pair_occupied(a))
        .collect();

    let mut terms = HamiltonianTerms::default();
    for (n, &i) in occupied.iter().enumerate() {
        terms.one_electron += 2.0 * ints.h(i, i) * olp;
        terms.coulomb += ints.g(i, i, i, i) * olp;
        for &j in &occupied[n + 1..] {
            terms.coulomb += 4.0 * ints.g(i, j, i, j) * olp;
            terms.exchange -= 2.0 * ints.g(i, j, j, i) * olp;
        }
        for &a in &virtuals {
            let excited = sd.excite_pair(i, a);
            terms.coulomb += ints.g(i, i, a, a) * geminal.excited_overlap(excited.as_ref(), coeffs, mode)?;
        }
    }
    Ok(terms)
}

/// Phase of `a+_c ... a_a ...` applied to `det`, annihilating first then creating
fn operator_phase(det: &SlaterDeterminant, annihilate: &[usize], create: &[usize]) -> Option<f64> {
    let mut current = det.clone();
    let mut sign = 1.0;
    for &p in annihilate {
        sign *= current.creation_annihilation_sign(p);
        current = current.remove_orbs(&[p])?;
    }
    for &p in create {
        sign *= current.creation_annihilation_sign(p);
        current = current.add_orbs(&[p])?;
    }
    Some(sign)
}

fn same_spin(p: usize, q: usize) -> bool {
    p % 2 == q % 2
}

/// Hamiltonian integral for an arbitrary determinant by Slater-Condon rules
///
/// Every single excitation `i -> k` and every double excitation `(i, j) -> (k, l)` out
/// of `sd` is visited, including the diagonal and spectator cases where targets
/// coincide with removed orbitals. Determinants with zero overlap are skipped.
pub fn integrate_general(
    geminal: &Geminal,
    sd: &SlaterDeterminant,
    coeffs: &DMatrix<f64>,
    mode: Mode,
) -> Result<HamiltonianTerms> {
    let ints = geminal.integrals();
    let nspin = 2 * geminal.norbs();
    let occupied = sd.occupied_indices();
    let virtuals: Vec<usize> = (0..nspin).filter(|&p| !sd.is_occupied(p)).collect();

    let mut terms = HamiltonianTerms::default();

    for &i in &occupied {
        let targets = std::iter::once(i).chain(virtuals.iter().copied());
        for k in targets.filter(|&k| same_spin(i, k)) {
            let Some(excited) = sd.excite(i, k) else {
                continue;
            };
            let olp = geminal.overlap(&excited, coeffs, mode)?;
            if olp == 0.0 {
                continue;
            }
            let Some(phase) = operator_phase(&excited, &[k], &[i]) else {
                continue;
            };
            terms.one_electron += ints.h(i / 2, k / 2) * phase * olp;
        }
    }

    for (n, &i) in occupied.iter().enumerate() {
        for &j in &occupied[n + 1..] {
            let mut targets: Vec<usize> = virtuals.iter().copied().chain([i, j]).collect();
            targets.sort_unstable();
            let Some(removed) = sd.remove_orbs(&[i, j]) else {
                continue;
            };
            for (m, &k) in targets.iter().enumerate() {
                for &l in &targets[m + 1..] {
                    let coulomb_allowed = same_spin(i, k) && same_spin(j, l);
                    let exchange_allowed = same_spin(i, l) && same_spin(j, k);
                    if !coulomb_allowed && !exchange_allowed {
                        continue;
                    }
                    let Some(excited) = removed.add_orbs(&[k, l]) else {
                        continue;
                    };
                    let olp = geminal.overlap(&excited, coeffs, mode)?;
                    if olp == 0.0 {
                        continue;
                    }
                    let Some(phase) = operator_phase(&excited, &[k, l], &[j, i]) else {
                        continue;
                    };
                    if coulomb_allowed {
                        terms.coulomb += ints.g(i / 2, j / 2, k / 2, l / 2) * phase * olp;
                    }
                    if exchange_allowed {
                        terms.exchange -= ints.g(i / 2, j / 2, l / 2, k / 2) * phase * olp;
                    }
                }
            }
        }
    }

    Ok(terms)
}

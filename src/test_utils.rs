//! Shared fixtures for unit tests

use crate::hamiltonian_impl::IntegralSet;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random integrals with the full eightfold symmetry of real orbitals
pub fn random_integrals(norbs: usize, seed: u64) -> IntegralSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let raw_h = DMatrix::from_fn(norbs, norbs, |_, _| rng.gen_range(-1.0..1.0));
    let h = (&raw_h + raw_h.transpose()) * 0.5;

    let n = norbs;
    let index = |i: usize, j: usize, k: usize, l: usize| ((i * n + j) * n + k) * n + l;
    let raw: Vec<f64> = (0..n.pow(4)).map(|_| rng.gen_range(-0.5..0.5)).collect();
    let mut g = vec![0.0; n.pow(4)];
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                for l in 0..n {
                    let orbit = [
                        index(i, j, k, l),
                        index(j, i, l, k),
                        index(k, l, i, j),
                        index(l, k, j, i),
                        index(k, j, i, l),
                        index(l, i, j, k),
                        index(i, l, k, j),
                        index(j, k, l, i),
                    ];
                    g[index(i, j, k, l)] = orbit.iter().map(|&p| raw[p]).sum::<f64>() / 8.0;
                }
            }
        }
    }

    IntegralSet::new(h, g, 0.5).unwrap()
}

/// Minimal basis H2 at 1.4 bohr in the molecular orbital basis
pub fn h2_integrals() -> IntegralSet {
    let h = DMatrix::from_row_slice(2, 2, &[-1.2528, 0.0, 0.0, -0.4756]);
    let mut g = vec![0.0; 16];
    let index = |i: usize, j: usize, k: usize, l: usize| ((i * 2 + j) * 2 + k) * 2 + l;
    g[index(0, 0, 0, 0)] = 0.6746;
    g[index(1, 1, 1, 1)] = 0.6975;
    g[index(0, 1, 0, 1)] = 0.6636;
    g[index(1, 0, 1, 0)] = 0.6636;
    for (i, j, k, l) in [(0, 0, 1, 1), (1, 1, 0, 0), (0, 1, 1, 0), (1, 0, 0, 1)] {
        g[index(i, j, k, l)] = 0.1813;
    }
    IntegralSet::new(h, g, 1.0 / 1.4).unwrap()
}

/// Lowest eigenvalue of the two-determinant H2 Hamiltonian plus nuclear repulsion
pub fn h2_exact_energy() -> f64 {
    let ints = h2_integrals();
    let ground = 2.0 * ints.h(0, 0) + ints.g(0, 0, 0, 0);
    let excited = 2.0 * ints.h(1, 1) + ints.g(1, 1, 1, 1);
    let coupling = ints.g(0, 0, 1, 1);
    let mean = 0.5 * (ground + excited);
    let half_gap = 0.5 * (ground - excited);
    mean - (half_gap * half_gap + coupling * coupling).sqrt() + ints.nuclear_repulsion()
}

//! Tests for the Hamiltonian integrator and integral validation

#[cfg(test)]
mod tests {
    use super::super::{integrate_closed_shell, integrate_general, IntegralSet};
    use crate::slater_impl::SlaterDeterminant;
    use crate::test_utils::{h2_integrals, random_integrals};
    use crate::wavefunction_impl::{Coefficients, Geminal, Mode, WavefunctionModel};
    use approx::assert_relative_eq;
    use itertools::Itertools;
    use nalgebra::DMatrix;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn closed_shell_determinants(npairs: usize, norbs: usize) -> Vec<SlaterDeterminant> {
        (0..norbs)
            .combinations(npairs)
            .filter_map(|pairs| SlaterDeterminant::from_pairs(&pairs))
            .collect()
    }

    fn assert_paths_agree(geminal: &Geminal, coeffs: &DMatrix<f64>, mode: Mode) {
        for sd in closed_shell_determinants(geminal.npairs(), geminal.norbs()) {
            let fast = integrate_closed_shell(geminal, &sd, coeffs, mode).unwrap();
            let general = integrate_general(geminal, &sd, coeffs, mode).unwrap();
            assert!(
                (fast.total() - general.total()).abs() < 1e-7,
                "{} ({:?}): fast {:?} vs general {:?}",
                sd,
                mode,
                fast,
                general
            );
            assert!((fast.one_electron - general.one_electron).abs() < 1e-7);
            assert!((fast.coulomb - general.coulomb).abs() < 1e-7);
            assert!((fast.exchange - general.exchange).abs() < 1e-7);
        }
    }

    #[test]
    fn test_paths_agree_apig() {
        let integrals = Arc::new(random_integrals(4, 17));
        let mut rng = StdRng::seed_from_u64(5);
        let geminal = Geminal::new(WavefunctionModel::apig(), 2, 4, integrals).unwrap();
        let coeffs = DMatrix::from_fn(2, 4, |_, _| rng.gen_range(-1.0..1.0));

        assert_paths_agree(&geminal, &coeffs, Mode::Value);
        assert_paths_agree(&geminal, &coeffs, Mode::Derivative(1, 2));
        assert_paths_agree(&geminal, &coeffs, Mode::Derivative(0, 0));
    }

    #[test]
    fn test_paths_agree_ap1rog() {
        let integrals = Arc::new(random_integrals(4, 23));
        let mut rng = StdRng::seed_from_u64(9);
        let geminal = Geminal::new(WavefunctionModel::ap1rog(), 2, 4, integrals).unwrap();
        let free_block = DMatrix::from_fn(2, 2, |_, _| rng.gen_range(-0.5..0.5));
        let coeffs = Coefficients::PairRestricted { free_block }.materialize(2, 4);

        assert_paths_agree(&geminal, &coeffs, Mode::Value);
        assert_paths_agree(&geminal, &coeffs, Mode::Derivative(0, 3));
    }

    #[test]
    fn test_reference_energy_h2() {
        let integrals = Arc::new(h2_integrals());
        let geminal = Geminal::new(WavefunctionModel::apig(), 1, 2, integrals).unwrap();
        let terms = geminal.energy_terms().unwrap();
        assert_relative_eq!(terms.one_electron, 2.0 * -1.2528, epsilon = 1e-12);
        assert_relative_eq!(terms.coulomb, 0.6746, epsilon = 1e-12);
        assert_relative_eq!(terms.exchange, 0.0, epsilon = 1e-12);
        assert_relative_eq!(
            geminal.energy().unwrap(),
            2.0 * -1.2528 + 0.6746 + 1.0 / 1.4,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_pair_excitation_coupling_h2() {
        let integrals = Arc::new(h2_integrals());
        let geminal = Geminal::new(WavefunctionModel::apig(), 1, 2, integrals).unwrap();
        let coeffs = DMatrix::from_row_slice(1, 2, &[0.9, -0.1]);
        let reference = SlaterDeterminant::from_bits(0b0011);
        let excited = SlaterDeterminant::from_bits(0b1100);

        let h_ref = geminal.integrate(&reference, &coeffs, Mode::Value).unwrap();
        let expected = (2.0 * -1.2528 + 0.6746) * 0.9 + 0.1813 * -0.1;
        assert_relative_eq!(h_ref.total(), expected, epsilon = 1e-12);

        let h_exc = geminal.integrate(&excited, &coeffs, Mode::Value).unwrap();
        let expected = (2.0 * -0.4756 + 0.6975) * -0.1 + 0.1813 * 0.9;
        assert_relative_eq!(h_exc.total(), expected, epsilon = 1e-12);

        // Derivative mode differentiates the overlaps only
        let d_ref = geminal.integrate(&reference, &coeffs, Mode::Derivative(0, 1)).unwrap();
        assert_relative_eq!(d_ref.total(), 0.1813, epsilon = 1e-12);
    }

    #[test]
    fn test_open_shell_determinant_h2() {
        let integrals = Arc::new(h2_integrals());
        let geminal = Geminal::new(WavefunctionModel::apig(), 1, 2, integrals).unwrap();
        let coeffs = DMatrix::from_row_slice(1, 2, &[0.9, -0.1]);
        let open = SlaterDeterminant::from_bits(0b0101);
        let terms = geminal.integrate(&open, &coeffs, Mode::Value).unwrap();
        assert_eq!(terms.total(), 0.0);
    }

    #[test]
    fn test_open_shell_single_excitation_phase() {
        // Open-shell determinant coupled to closed shells by single and double excitations
        let integrals = Arc::new(random_integrals(3, 31));
        let geminal = Geminal::new(WavefunctionModel::apig(), 1, 3, integrals.clone()).unwrap();
        let coeffs = DMatrix::from_row_slice(1, 3, &[0.7, 0.2, -0.4]);

        // |0a 1b>: excitation 0a -> 1a lands on |1a 1b>, 1b -> 0b lands on |0a 0b>
        let open = SlaterDeterminant::from_spin_orbitals(&[0, 3]).unwrap();
        let terms = geminal.integrate(&open, &coeffs, Mode::Value).unwrap();

        let h = |i, j| integrals.h(i, j);
        let g = |i, j, k, l| integrals.g(i, j, k, l);
        // <0a 1b|H|1a 1b> = h01 + <01|11>, phase +1
        // <0a 1b|H|0a 0b> = h10 + <01|00>, phase +1
        // <0a 1b|H|2a 2b> = <01|22>, phase +1
        let expected = (h(0, 1) + g(0, 1, 1, 1)) * 0.2
            + (h(1, 0) + g(0, 1, 0, 0)) * 0.7
            + g(0, 1, 2, 2) * -0.4;
        assert_relative_eq!(terms.total(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_integral_validation() {
        let h = DMatrix::from_row_slice(2, 2, &[-1.0, 0.1, 0.2, -0.5]);
        assert!(IntegralSet::new(h, vec![0.0; 16], 0.0).is_err());

        let h = DMatrix::from_row_slice(2, 2, &[-1.0, 0.1, 0.1, -0.5]);
        assert!(IntegralSet::new(h.clone(), vec![0.0; 15], 0.0).is_err());
        assert!(IntegralSet::new(DMatrix::zeros(2, 3), vec![0.0; 16], 0.0).is_err());

        // <01|00> without its partner <10|00>
        let mut g = vec![0.0; 16];
        g[4] = 0.3;
        assert!(IntegralSet::new(h.clone(), g, 0.0).is_err());

        let ints = IntegralSet::new(h, vec![0.0; 16], 0.25).unwrap();
        assert_eq!(ints.norbs(), 2);
        assert_eq!(ints.nuclear_repulsion(), 0.25);
        assert!(h2_integrals().g(0, 1, 1, 0) > 0.0);
    }
}

//! Tests for projection space generation and validation

#[cfg(test)]
mod tests {
    use super::super::{generate_ap1rog, generate_apig, ProjectionSpace};
    use crate::slater_impl::SlaterDeterminant;
    use std::collections::HashSet;

    fn dets(bits: &[u128]) -> Vec<SlaterDeterminant> {
        bits.iter().map(|&b| SlaterDeterminant::from_bits(b)).collect()
    }

    #[test]
    fn test_apig_h2_like() {
        let pspace = generate_apig(1, 2).unwrap();
        assert_eq!(pspace, dets(&[0b0011, 0b1100, 0b0101]));
    }

    #[test]
    fn test_apig_two_pairs() {
        let pspace = generate_apig(2, 4).unwrap();
        let expected = dets(&[
            0b00001111, 0b00110011, 0b11000011, 0b00111100, 0b11001100, 0b11110000, 0b00010111,
            0b01000111, 0b00011101,
        ]);
        assert_eq!(pspace, expected);
    }

    #[test]
    fn test_apig_size_and_uniqueness() {
        for (npairs, norbs) in [(1, 2), (1, 5), (2, 4), (2, 6), (3, 6), (4, 7)] {
            let pspace = generate_apig(npairs, norbs).unwrap();
            assert_eq!(pspace.len(), npairs * norbs + 1);
            assert_eq!(pspace[0], SlaterDeterminant::ground(npairs));
            let unique: HashSet<_> = pspace.iter().collect();
            assert_eq!(unique.len(), pspace.len());
            for sd in &pspace {
                assert_eq!(sd.count_electrons(), 2 * npairs);
                assert!(sd.highest_set_bit().unwrap() / 2 < norbs);
                if npairs > 2 {
                    assert!(sd.is_closed_shell());
                }
            }
        }
    }

    #[test]
    fn test_apig_three_pairs_six_orbitals() {
        let pspace = generate_apig(3, 6).unwrap();
        assert_eq!(pspace.len(), 19);
        assert!(pspace.iter().all(|sd| sd.is_closed_shell()));
    }

    #[test]
    fn test_apig_insufficient_space() {
        let err = generate_apig(3, 4).unwrap_err();
        assert!(err.to_string().contains("Could not generate enough"));
        assert!(generate_apig(0, 4).is_err());
        assert!(generate_apig(3, 2).is_err());
    }

    #[test]
    fn test_ap1rog_space() {
        let pspace = generate_ap1rog(2, 4).unwrap();
        assert_eq!(
            pspace,
            dets(&[0b1111, 0b111100, 0b110011, 0b11001100, 0b11000011])
        );
        for (npairs, norbs) in [(1, 2), (2, 5), (3, 7)] {
            let pspace = generate_ap1rog(npairs, norbs).unwrap();
            assert_eq!(pspace.len(), 1 + npairs * (norbs - npairs));
            assert_eq!(pspace[0], SlaterDeterminant::ground(npairs));
        }
    }

    #[test]
    fn test_projection_space_accessors() {
        let space = ProjectionSpace::from_determinants(dets(&[0b1100, 0b0011, 0b0101]), 1, 2).unwrap();
        assert_eq!(space.len(), 3);
        assert_eq!(*space.reference(), SlaterDeterminant::from_bits(0b0011));
        assert_eq!(space.projected(), dets(&[0b1100, 0b0101]).as_slice());
        assert!(space.contains(&SlaterDeterminant::from_bits(0b0101)));
        assert!(!space.contains(&SlaterDeterminant::from_bits(0b1010)));
        assert_eq!(space.iter().count(), 3);
    }

    #[test]
    fn test_projection_space_validation() {
        // Wrong electron count
        assert!(ProjectionSpace::from_determinants(dets(&[0b0011, 0b0111]), 1, 2).is_err());
        // Orbital outside of the basis
        assert!(ProjectionSpace::from_determinants(dets(&[0b0011, 0b110000]), 1, 2).is_err());
        // Duplicates
        assert!(ProjectionSpace::from_determinants(dets(&[0b0011, 0b1100, 0b1100]), 1, 2).is_err());
        // Missing ground state
        assert!(ProjectionSpace::from_determinants(dets(&[0b1100, 0b0101]), 1, 2).is_err());
        // Open-shell determinants are rejected beyond two pairs
        assert!(ProjectionSpace::from_determinants(dets(&[0b111111, 0b1011111]), 3, 4).is_err());
        assert!(ProjectionSpace::from_determinants(dets(&[0b1111, 0b10111]), 2, 4).is_ok());
    }
}

//! Generation and validation of projection spaces

use crate::slater_impl::SlaterDeterminant;
use color_eyre::eyre::{bail, ensure, eyre, Result};
use itertools::Itertools;
use std::collections::HashSet;
use tracing::{debug, info};

/// Ordered, duplicate-free set of determinants with the reference first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionSpace {
    determinants: Vec<SlaterDeterminant>,
}

impl ProjectionSpace {
    /// Validate a user supplied projection space
    ///
    /// Every determinant must hold `2 * npairs` electrons within `norbs` spatial
    /// orbitals, and must be closed-shell when `npairs > 2` (below that, single
    /// excitations are needed to obtain enough equations). The ground determinant must
    /// be present and is moved to the front.
    pub fn from_determinants(
        determinants: Vec<SlaterDeterminant>,
        npairs: usize,
        norbs: usize,
    ) -> Result<Self> {
        let nelec = 2 * npairs;
        let mut seen = HashSet::with_capacity(determinants.len());
        for sd in &determinants {
            ensure!(
                sd.count_electrons() == nelec,
                "Slater determinant {} does not contain {} electrons",
                sd,
                nelec
            );
            if npairs > 2 {
                ensure!(sd.is_closed_shell(), "Slater determinant {} is unrestricted", sd);
            }
            if let Some(last) = sd.highest_set_bit() {
                ensure!(
                    last / 2 < norbs,
                    "Slater determinant {} uses orbitals beyond the {} spatial orbitals",
                    sd,
                    norbs
                );
            }
            ensure!(seen.insert(sd.clone()), "Slater determinant {} appears twice", sd);
        }

        let ground = SlaterDeterminant::ground(npairs);
        let position = determinants
            .iter()
            .position(|sd| *sd == ground)
            .ok_or_else(|| eyre!("Projection space does not contain the ground state {}", ground))?;
        let mut determinants = determinants;
        let reference = determinants.remove(position);
        determinants.insert(0, reference);

        Ok(Self { determinants })
    }

    /// The reference (ground) determinant
    pub fn reference(&self) -> &SlaterDeterminant {
        &self.determinants[0]
    }

    /// All determinants except the reference
    pub fn projected(&self) -> &[SlaterDeterminant] {
        &self.determinants[1..]
    }

    pub fn determinants(&self) -> &[SlaterDeterminant] {
        &self.determinants
    }

    pub fn len(&self) -> usize {
        self.determinants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.determinants.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlaterDeterminant> {
        self.determinants.iter()
    }

    pub fn contains(&self, sd: &SlaterDeterminant) -> bool {
        self.determinants.contains(sd)
    }
}

fn pair_excitation(
    ground: &SlaterDeterminant,
    occs: &[usize],
    virs: &[usize],
) -> Result<SlaterDeterminant> {
    ground
        .excite_pairs(occs, virs)
        .ok_or_else(|| eyre!("Pair excitation {:?} -> {:?} of {} is invalid", occs, virs, ground))
}

/// Smallest number of frontier orbitals whose pair excitations can fill `remaining` slots
fn frontier_width(nocc: usize, nvir: usize, remaining: usize) -> usize {
    (2..=nocc)
        .find(|&i| {
            let combinations = (i * (i - 1) / 2) as u128;
            combinations * combinations >= remaining as u128
        })
        .unwrap_or(nocc.max(nvir) + 1)
}

/// Projection space of the APIG wavefunction with `npairs * norbs + 1` determinants
///
/// Starting from the ground state, pair excitations of increasing rank are drawn from
/// the HOMO side of the occupied orbitals to the LUMO side of the virtual orbitals. For
/// `npairs <= 2` there are not enough pair excitations, so beta to alpha single
/// excitations are appended.
///
/// # Errors
/// Fails if the same determinant is produced twice, or if pair and single excitations
/// cannot supply enough determinants for this `(npairs, norbs)` combination.
pub fn generate_apig(npairs: usize, norbs: usize) -> Result<Vec<SlaterDeterminant>> {
    ensure!(npairs > 0, "At least one electron pair is required");
    ensure!(
        npairs <= norbs,
        "{} electron pairs do not fit into {} spatial orbitals",
        npairs,
        norbs
    );

    let ground = SlaterDeterminant::ground(npairs);
    let occupied: Vec<usize> = (0..npairs).rev().collect();
    let virtuals: Vec<usize> = (npairs..norbs).collect();
    let needed = npairs * norbs + 1;

    let mut determinants = vec![ground.clone()];
    let mut rank = 1;
    while determinants.len() < needed && rank <= occupied.len() {
        let width = frontier_width(occupied.len(), virtuals.len(), needed - determinants.len());
        debug!("Pair excitations of rank {} over {} frontier orbitals", rank, width);
        let occ_frontier = &occupied[..width.min(occupied.len())];
        let vir_frontier = &virtuals[..width.min(virtuals.len())];
        for occs in occ_frontier.iter().copied().combinations(rank) {
            for virs in vir_frontier.iter().copied().combinations(rank) {
                determinants.push(pair_excitation(&ground, &occs, &virs)?);
            }
        }
        rank += 1;
    }

    if npairs <= 2 {
        for &i in &occupied {
            for &j in &virtuals {
                let single = ground
                    .excite(2 * i + 1, 2 * j)
                    .ok_or_else(|| eyre!("Single excitation {} -> {} of {} is invalid", i, j, ground))?;
                determinants.push(single);
            }
        }
    }

    let unique: HashSet<&SlaterDeterminant> = determinants.iter().collect();
    if unique.len() != determinants.len() {
        bail!("The same Slater determinant was generated more than once");
    }
    ensure!(
        determinants.len() >= needed,
        "Could not generate enough Slater determinants for {} pairs in {} orbitals: needed {}, generated {}",
        npairs,
        norbs,
        needed,
        determinants.len()
    );
    determinants.truncate(needed);

    info!(
        "Generated APIG projection space with {} determinants",
        determinants.len()
    );
    Ok(determinants)
}

/// Projection space of the AP1roG wavefunction: the reference and all single pair
/// excitations out of it
pub fn generate_ap1rog(npairs: usize, norbs: usize) -> Result<Vec<SlaterDeterminant>> {
    ensure!(npairs > 0, "At least one electron pair is required");
    ensure!(
        npairs <= norbs,
        "{} electron pairs do not fit into {} spatial orbitals",
        npairs,
        norbs
    );

    let ground = SlaterDeterminant::ground(npairs);
    let mut determinants = vec![ground.clone()];
    for a in npairs..norbs {
        for i in 0..npairs {
            determinants.push(pair_excitation(&ground, &[i], &[a])?);
        }
    }
    let determinants: Vec<SlaterDeterminant> = determinants.into_iter().unique().collect();

    info!(
        "Generated AP1roG projection space with {} determinants",
        determinants.len()
    );
    Ok(determinants)
}

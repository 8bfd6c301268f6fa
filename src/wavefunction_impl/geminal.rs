//! Geminal wavefunction state and model selection

extern crate nalgebra as na;

use super::overlap::{ap1rog_overlap, apig_overlap};
use crate::hamiltonian_impl::{HamiltonianTerms, IntegralSet};
use crate::permanent_impl::PermanentMethod;
use crate::pspace_impl::{generate_ap1rog, generate_apig, ProjectionSpace};
use crate::slater_impl::SlaterDeterminant;
use color_eyre::eyre::{bail, ensure, eyre, Result};
use na::{DMatrix, DVector};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Evaluation mode threaded through overlaps and Hamiltonian integrals
///
/// `Derivative(i, j)` differentiates with respect to entry `(i, j)` of the full
/// `npairs x norbs` coefficient matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Value,
    Derivative(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeminalKind {
    Apig,
    Ap1rog,
}

impl FromStr for GeminalKind {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "apig" => Ok(Self::Apig),
            "ap1rog" => Ok(Self::Ap1rog),
            _ => Err(eyre!("Unknown wavefunction model: {}", s)),
        }
    }
}

impl fmt::Display for GeminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeminalKind::Apig => write!(f, "APIG"),
            GeminalKind::Ap1rog => write!(f, "AP1roG"),
        }
    }
}

/// Overlap of a closed-shell determinant given its doubly occupied orbitals
///
/// Arguments are the occupied spatial orbitals, the full coefficient matrix, the mode,
/// `npairs` and the permanent method. Each model ignores the arguments it does not need.
pub type OverlapFn = fn(&[usize], &DMatrix<f64>, Mode, usize, PermanentMethod) -> Result<f64>;

/// Projection space generator for `(npairs, norbs)`
pub type PspaceFn = fn(usize, usize) -> Result<Vec<SlaterDeterminant>>;

/// Behaviour of a geminal model, fixed at construction
#[derive(Clone, Copy)]
pub struct WavefunctionModel {
    pub kind: GeminalKind,
    /// Add `<ref|Psi> - 1` as the first equation
    pub normalize: bool,
    /// Index of the first projected equation
    pub eqn_offset: usize,
    pub overlap_fn: OverlapFn,
    pub pspace_fn: PspaceFn,
}

impl WavefunctionModel {
    pub fn apig() -> Self {
        Self {
            kind: GeminalKind::Apig,
            normalize: true,
            eqn_offset: 1,
            overlap_fn: apig_overlap,
            pspace_fn: generate_apig,
        }
    }

    pub fn ap1rog() -> Self {
        Self {
            kind: GeminalKind::Ap1rog,
            normalize: false,
            eqn_offset: 0,
            overlap_fn: ap1rog_overlap,
            pspace_fn: generate_ap1rog,
        }
    }

    pub fn from_kind(kind: GeminalKind) -> Self {
        match kind {
            GeminalKind::Apig => Self::apig(),
            GeminalKind::Ap1rog => Self::ap1rog(),
        }
    }
}

impl fmt::Debug for WavefunctionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WavefunctionModel")
            .field("kind", &self.kind)
            .field("normalize", &self.normalize)
            .field("eqn_offset", &self.eqn_offset)
            .finish()
    }
}

/// Stored geminal coefficients
#[derive(Debug, Clone, PartialEq)]
pub enum Coefficients {
    /// Complete `npairs x norbs` matrix
    Full(DMatrix<f64>),
    /// Free `npairs x (norbs - npairs)` block next to an implicit identity
    PairRestricted { free_block: DMatrix<f64> },
}

impl Coefficients {
    /// The full `npairs x norbs` coefficient matrix
    pub fn materialize(&self, npairs: usize, norbs: usize) -> DMatrix<f64> {
        match self {
            Coefficients::Full(matrix) => matrix.clone(),
            Coefficients::PairRestricted { free_block } => {
                let mut matrix = DMatrix::identity(npairs, norbs);
                for i in 0..free_block.nrows() {
                    for j in 0..free_block.ncols() {
                        matrix[(i, npairs + j)] += free_block[(i, j)];
                    }
                }
                matrix
            }
        }
    }

    /// Free parameters flattened in row-major order
    pub fn to_params(&self) -> DVector<f64> {
        let block = match self {
            Coefficients::Full(matrix) => matrix,
            Coefficients::PairRestricted { free_block } => free_block,
        };
        DVector::from_iterator(block.len(), block.transpose().iter().copied())
    }
}

/// Geminal wavefunction bound to a Hamiltonian and a projection space
#[derive(Debug, Clone)]
pub struct Geminal {
    npairs: usize,
    norbs: usize,
    model: WavefunctionModel,
    permanent_method: PermanentMethod,
    integrals: Arc<IntegralSet>,
    pspace: ProjectionSpace,
    coefficients: Coefficients,
}

impl Geminal {
    /// Create a wavefunction with the model's generated projection space
    ///
    /// Coefficients start at the reference guess: the identity for APIG and a zero
    /// free block for AP1roG.
    pub fn new(
        model: WavefunctionModel,
        npairs: usize,
        norbs: usize,
        integrals: Arc<IntegralSet>,
    ) -> Result<Self> {
        ensure!(npairs > 0, "At least one electron pair is required");
        ensure!(
            npairs <= norbs,
            "{} electron pairs do not fit into {} spatial orbitals",
            npairs,
            norbs
        );
        if model.kind == GeminalKind::Ap1rog {
            ensure!(npairs < norbs, "AP1roG needs at least one virtual orbital");
        }
        ensure!(
            integrals.norbs() == norbs,
            "Integrals cover {} orbitals but the wavefunction uses {}",
            integrals.norbs(),
            norbs
        );

        let determinants = (model.pspace_fn)(npairs, norbs)?;
        let pspace = ProjectionSpace::from_determinants(determinants, npairs, norbs)?;
        let coefficients = Self::reference_coefficients(model.kind, npairs, norbs);

        info!("===========================================");
        info!("        {} Initialization", model.kind);
        info!("===========================================");
        info!("Number of electron pairs: {}", npairs);
        info!("Number of spatial orbitals: {}", norbs);
        info!("Projection space size: {}", pspace.len());
        info!("Nuclear repulsion: {:.10} Eh", integrals.nuclear_repulsion());
        info!("===========================================");

        Ok(Self {
            npairs,
            norbs,
            model,
            permanent_method: PermanentMethod::default(),
            integrals,
            pspace,
            coefficients,
        })
    }

    /// Replace the generated projection space with a validated user space
    ///
    /// AP1roG equations couple each projected determinant to its pair excitations, whose
    /// overlaps are only available up to two excited reference pairs. Its projection
    /// space is therefore limited to at most one excited reference pair.
    pub fn with_pspace(mut self, determinants: Vec<SlaterDeterminant>) -> Result<Self> {
        if self.model.kind == GeminalKind::Ap1rog {
            for sd in determinants.iter().filter(|sd| sd.is_closed_shell()) {
                let excited = (0..self.npairs).filter(|&i| !sd.is_pair_occupied(i)).count();
                ensure!(
                    excited <= 1,
                    "Slater determinant {} excites {} reference pairs; AP1roG allows at most one",
                    sd,
                    excited
                );
            }
        }
        self.pspace = ProjectionSpace::from_determinants(determinants, self.npairs, self.norbs)?;
        info!("Using projection space with {} determinants", self.pspace.len());
        Ok(self)
    }

    pub fn with_permanent_method(mut self, method: PermanentMethod) -> Self {
        self.permanent_method = method;
        self
    }

    fn reference_coefficients(kind: GeminalKind, npairs: usize, norbs: usize) -> Coefficients {
        match kind {
            GeminalKind::Apig => Coefficients::Full(DMatrix::identity(npairs, norbs)),
            GeminalKind::Ap1rog => Coefficients::PairRestricted {
                free_block: DMatrix::zeros(npairs, norbs - npairs),
            },
        }
    }

    pub fn npairs(&self) -> usize {
        self.npairs
    }

    pub fn norbs(&self) -> usize {
        self.norbs
    }

    pub fn nelec(&self) -> usize {
        2 * self.npairs
    }

    pub fn model(&self) -> &WavefunctionModel {
        &self.model
    }

    pub fn permanent_method(&self) -> PermanentMethod {
        self.permanent_method
    }

    pub fn integrals(&self) -> &IntegralSet {
        &self.integrals
    }

    pub fn shared_integrals(&self) -> Arc<IntegralSet> {
        Arc::clone(&self.integrals)
    }

    pub fn pspace(&self) -> &ProjectionSpace {
        &self.pspace
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// Current coefficients as a full `npairs x norbs` matrix
    pub fn coefficient_matrix(&self) -> DMatrix<f64> {
        self.coefficients.materialize(self.npairs, self.norbs)
    }

    /// Replace the stored coefficients, checking the variant and shape
    pub fn set_coefficients(&mut self, coefficients: Coefficients) -> Result<()> {
        match (&coefficients, self.model.kind) {
            (Coefficients::Full(matrix), GeminalKind::Apig) => ensure!(
                matrix.shape() == (self.npairs, self.norbs),
                "Expected a {}x{} coefficient matrix, got {:?}",
                self.npairs,
                self.norbs,
                matrix.shape()
            ),
            (Coefficients::PairRestricted { free_block }, GeminalKind::Ap1rog) => ensure!(
                free_block.shape() == (self.npairs, self.norbs - self.npairs),
                "Expected a {}x{} free block, got {:?}",
                self.npairs,
                self.norbs - self.npairs,
                free_block.shape()
            ),
            _ => bail!("Coefficient layout does not match the {} model", self.model.kind),
        }
        self.coefficients = coefficients;
        Ok(())
    }

    pub fn num_params(&self) -> usize {
        match self.model.kind {
            GeminalKind::Apig => self.npairs * self.norbs,
            GeminalKind::Ap1rog => self.npairs * (self.norbs - self.npairs),
        }
    }

    /// Full-matrix coordinates `(i, j)` of each free parameter, in parameter order
    pub fn parameter_coordinates(&self) -> Vec<(usize, usize)> {
        let first_col = match self.model.kind {
            GeminalKind::Apig => 0,
            GeminalKind::Ap1rog => self.npairs,
        };
        (0..self.npairs)
            .flat_map(|i| (first_col..self.norbs).map(move |j| (i, j)))
            .collect()
    }

    pub fn params(&self) -> DVector<f64> {
        self.coefficients.to_params()
    }

    pub fn coefficients_from_params(&self, params: &DVector<f64>) -> Result<Coefficients> {
        ensure!(
            params.len() == self.num_params(),
            "Expected {} parameters, got {}",
            self.num_params(),
            params.len()
        );
        let coefficients = match self.model.kind {
            GeminalKind::Apig => {
                Coefficients::Full(DMatrix::from_row_slice(self.npairs, self.norbs, params.as_slice()))
            }
            GeminalKind::Ap1rog => Coefficients::PairRestricted {
                free_block: DMatrix::from_row_slice(
                    self.npairs,
                    self.norbs - self.npairs,
                    params.as_slice(),
                ),
            },
        };
        Ok(coefficients)
    }

    pub fn matrix_from_params(&self, params: &DVector<f64>) -> Result<DMatrix<f64>> {
        Ok(self
            .coefficients_from_params(params)?
            .materialize(self.npairs, self.norbs))
    }

    /// Parameters of the reference wavefunction
    pub fn initial_guess(&self) -> DVector<f64> {
        Self::reference_coefficients(self.model.kind, self.npairs, self.norbs).to_params()
    }

    /// Reference parameters with a small uniform perturbation
    pub fn perturbed_guess<R: Rng>(&self, rng: &mut R) -> DVector<f64> {
        let size = self.num_params() as f64;
        match self.model.kind {
            GeminalKind::Apig => {
                let mut guess = self.initial_guess();
                guess
                    .iter_mut()
                    .for_each(|c| *c += 0.2 / size * (rng.gen::<f64>() - 0.5));
                let max = guess.max();
                if max > 0.0 {
                    guess /= max;
                }
                guess
            }
            GeminalKind::Ap1rog => DVector::from_fn(self.num_params(), |_, _| {
                2.0 / (10.0 * size) * (rng.gen::<f64>() - 0.5)
            }),
        }
    }

    /// Overlap `<sd|Psi>` for the coefficient matrix `coeffs`, or its derivative
    ///
    /// Determinants with the wrong electron count, broken pairing or orbitals outside
    /// the basis have zero overlap.
    pub fn overlap(&self, sd: &SlaterDeterminant, coeffs: &DMatrix<f64>, mode: Mode) -> Result<f64> {
        if sd.count_electrons() != self.nelec() || !sd.is_closed_shell() || !self.in_basis(sd) {
            return Ok(0.0);
        }
        let occupied = sd.occupied_pairs();
        (self.model.overlap_fn)(&occupied, coeffs, mode, self.npairs, self.permanent_method)
    }

    /// Whether every occupied spin orbital of `sd` belongs to one of the `norbs` spatial orbitals
    pub fn in_basis(&self, sd: &SlaterDeterminant) -> bool {
        sd.highest_set_bit().map_or(true, |bit| bit / 2 < self.norbs)
    }

    /// Overlap of the outcome of an excitation, zero when the excitation was invalid
    pub fn excited_overlap(
        &self,
        sd: Option<&SlaterDeterminant>,
        coeffs: &DMatrix<f64>,
        mode: Mode,
    ) -> Result<f64> {
        match sd {
            Some(sd) => self.overlap(sd, coeffs, mode),
            None => Ok(0.0),
        }
    }

    /// Components of the electronic energy `<ref|H|Psi> / <ref|Psi>`
    pub fn energy_terms(&self) -> Result<HamiltonianTerms> {
        let coeffs = self.coefficient_matrix();
        let reference = self.pspace.reference();
        let olp = self.overlap(reference, &coeffs, Mode::Value)?;
        ensure!(
            olp.abs() > 1e-12,
            "The wavefunction has no overlap with the reference determinant"
        );
        Ok(self.integrate(reference, &coeffs, Mode::Value)? / olp)
    }

    /// Total energy including nuclear repulsion
    pub fn energy(&self) -> Result<f64> {
        Ok(self.energy_terms()?.total() + self.integrals.nuclear_repulsion())
    }
}

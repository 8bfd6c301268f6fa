//! Configuration management for geminal calculations
//!
//! This module handles the YAML input: the wavefunction model and its size, solver
//! parameters, and the molecular integrals in an orthonormal orbital basis.

mod args;

pub use args::Args;

extern crate nalgebra as na;

use crate::hamiltonian_impl::IntegralSet;
use crate::permanent_impl::PermanentMethod;
use crate::slater_impl::SlaterDeterminant;
use crate::solver_impl::{NonlinearSolver, SolverSettings};
use crate::wavefunction_impl::{Geminal, GeminalKind, WavefunctionModel};
use color_eyre::eyre::{ensure, eyre, Result};
use na::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Main configuration structure for geminal calculations
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub wavefunction: WavefunctionParams,
    pub solver: Option<SolverParams>,
    pub integrals: IntegralParams,
}

/// Wavefunction parameters
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WavefunctionParams {
    pub model: Option<GeminalKind>,
    pub npairs: usize,
    pub norbs: usize,
    pub permanent: Option<PermanentMethod>,
    /// Seed for a perturbed initial guess; the reference guess is used when absent
    pub guess_seed: Option<u64>,
    /// Start APIG from the converged AP1roG coefficients
    pub ap1rog_guess: Option<bool>,
    /// Occupied spin orbitals of each determinant, replacing the generated space
    pub projection_space: Option<Vec<Vec<usize>>>,
}

impl WavefunctionParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        if self.model.is_none() {
            self.model = Some(GeminalKind::Apig);
        }
        if self.permanent.is_none() {
            self.permanent = Some(PermanentMethod::default());
        }
        if self.ap1rog_guess.is_none() {
            self.ap1rog_guess = Some(false);
        }
        self
    }
}

/// Nonlinear solver parameters
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SolverParams {
    pub algorithm: Option<String>, // "newton" or "lm"
    pub max_iterations: Option<usize>,
    pub tolerance: Option<f64>,
    pub analytic_jacobian: Option<bool>,
    pub finite_difference_step: Option<f64>,
}

impl Default for SolverParams {
    fn default() -> Self {
        let settings = SolverSettings::default();
        SolverParams {
            algorithm: Some("newton".to_string()),
            max_iterations: Some(settings.max_iterations),
            tolerance: Some(settings.tolerance),
            analytic_jacobian: Some(settings.analytic_jacobian),
            finite_difference_step: Some(settings.finite_difference_step),
        }
    }
}

impl SolverParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.algorithm.is_none() {
            self.algorithm = defaults.algorithm;
        }
        if self.max_iterations.is_none() {
            self.max_iterations = defaults.max_iterations;
        }
        if self.tolerance.is_none() {
            self.tolerance = defaults.tolerance;
        }
        if self.analytic_jacobian.is_none() {
            self.analytic_jacobian = defaults.analytic_jacobian;
        }
        if self.finite_difference_step.is_none() {
            self.finite_difference_step = defaults.finite_difference_step;
        }
        self
    }
}

/// Integrals in the orthonormal spatial orbital basis
///
/// `two_electron` is the flattened `norbs^4` array of `<ij|kl>` in row-major order.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IntegralParams {
    pub nuclear_repulsion: f64,
    pub one_electron: Vec<Vec<f64>>,
    pub two_electron: Vec<f64>,
}

impl IntegralParams {
    /// Validate and assemble the integral set
    pub fn build(&self) -> Result<IntegralSet> {
        let n = self.one_electron.len();
        ensure!(
            self.one_electron.iter().all(|row| row.len() == n),
            "The one-electron integrals must form a square matrix"
        );
        let flat: Vec<f64> = self.one_electron.iter().flatten().copied().collect();
        let h = DMatrix::from_row_slice(n, n, &flat);
        IntegralSet::new(h, self.two_electron.clone(), self.nuclear_repulsion)
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.wavefunction = self.wavefunction.with_defaults();
        self.solver = Some(self.solver.take().unwrap_or_default().with_defaults());
        self
    }

    /// Get the wavefunction model
    pub fn model(&self) -> GeminalKind {
        self.wavefunction.model.unwrap_or(GeminalKind::Apig)
    }

    /// Get the permanent evaluation method
    pub fn permanent_method(&self) -> PermanentMethod {
        self.wavefunction.permanent.unwrap_or_default()
    }

    /// Get the solver algorithm name
    pub fn solver_algorithm(&self) -> String {
        self.solver
            .as_ref()
            .and_then(|s| s.algorithm.clone())
            .unwrap_or_else(|| "newton".to_string())
    }

    /// Get the solver settings, falling back to defaults for missing values
    pub fn solver_settings(&self) -> SolverSettings {
        let defaults = SolverSettings::default();
        match self.solver.as_ref() {
            Some(s) => SolverSettings {
                max_iterations: s.max_iterations.unwrap_or(defaults.max_iterations),
                tolerance: s.tolerance.unwrap_or(defaults.tolerance),
                analytic_jacobian: s.analytic_jacobian.unwrap_or(defaults.analytic_jacobian),
                finite_difference_step: s
                    .finite_difference_step
                    .unwrap_or(defaults.finite_difference_step),
            },
            None => defaults,
        }
    }

    /// Check if APIG should start from an AP1roG solution
    pub fn use_ap1rog_guess(&self) -> bool {
        self.model() == GeminalKind::Apig && self.wavefunction.ap1rog_guess.unwrap_or(false)
    }

    /// Starting parameters for the solver, `None` meaning the current coefficients
    ///
    /// The AP1roG guess takes precedence over a perturbed reference.
    pub fn initial_params(
        &self,
        geminal: &Geminal,
        solver: &dyn NonlinearSolver,
    ) -> Result<Option<DVector<f64>>> {
        if self.use_ap1rog_guess() {
            return Ok(Some(geminal.ap1rog_guess(solver)?));
        }
        Ok(self.wavefunction.guess_seed.map(|seed| {
            info!("Perturbing the initial guess with seed {}", seed);
            geminal.perturbed_guess(&mut StdRng::seed_from_u64(seed))
        }))
    }

    /// User supplied projection space, if any
    pub fn projection_space(&self) -> Result<Option<Vec<SlaterDeterminant>>> {
        let Some(space) = self.wavefunction.projection_space.as_ref() else {
            return Ok(None);
        };
        let determinants = space
            .iter()
            .map(|orbitals| {
                SlaterDeterminant::from_spin_orbitals(orbitals).ok_or_else(|| {
                    eyre!("Projection space entry {:?} repeats a spin orbital", orbitals)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(determinants))
    }

    /// Build the wavefunction described by this configuration
    pub fn build_geminal(&self) -> Result<Geminal> {
        let integrals = Arc::new(self.integrals.build()?);
        let model = WavefunctionModel::from_kind(self.model());
        let mut geminal = Geminal::new(
            model,
            self.wavefunction.npairs,
            self.wavefunction.norbs,
            integrals,
        )?
        .with_permanent_method(self.permanent_method());
        if let Some(determinants) = self.projection_space()? {
            geminal = geminal.with_pspace(determinants)?;
        }
        Ok(geminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H2_YAML: &str = r#"
wavefunction:
  model: ap1rog
  npairs: 1
  norbs: 2
integrals:
  nuclear_repulsion: 0.7142857142857143
  one_electron:
    - [-1.2528, 0.0]
    - [0.0, -0.4756]
  two_electron: [0.6746, 0.0, 0.0, 0.1813,
                 0.0, 0.6636, 0.1813, 0.0,
                 0.0, 0.1813, 0.6636, 0.0,
                 0.1813, 0.0, 0.0, 0.6975]
"#;

    #[test]
    fn test_defaults_applied() {
        let config = serde_yml::from_str::<Config>(H2_YAML).unwrap().with_defaults();
        assert_eq!(config.model(), GeminalKind::Ap1rog);
        assert_eq!(config.permanent_method(), PermanentMethod::Ryser);
        assert_eq!(config.solver_algorithm(), "newton");
        let settings = config.solver_settings();
        assert_eq!(settings.max_iterations, 100);
        assert!(settings.analytic_jacobian);
        assert!(config.projection_space().unwrap().is_none());
        assert!(!config.use_ap1rog_guess());
    }

    #[test]
    fn test_initial_params() {
        let mut config = serde_yml::from_str::<Config>(H2_YAML).unwrap().with_defaults();
        let solver = crate::solver_impl::create_solver("newton", config.solver_settings()).unwrap();
        let geminal = config.build_geminal().unwrap();
        assert!(config.initial_params(&geminal, solver.as_ref()).unwrap().is_none());

        config.wavefunction.guess_seed = Some(3);
        let guess = config.initial_params(&geminal, solver.as_ref()).unwrap().unwrap();
        assert_eq!(guess.len(), 1);

        // The AP1roG guess only applies to APIG
        config.wavefunction.ap1rog_guess = Some(true);
        assert!(!config.use_ap1rog_guess());
        config.wavefunction.model = Some(GeminalKind::Apig);
        assert!(config.use_ap1rog_guess());
        let geminal = config.build_geminal().unwrap();
        let guess = config.initial_params(&geminal, solver.as_ref()).unwrap().unwrap();
        assert_eq!(guess.len(), 2);
        assert_eq!(guess[0], 1.0);
    }

    #[test]
    fn test_build_geminal() {
        let config = serde_yml::from_str::<Config>(H2_YAML).unwrap().with_defaults();
        let geminal = config.build_geminal().unwrap();
        assert_eq!(geminal.npairs(), 1);
        assert_eq!(geminal.norbs(), 2);
        assert_eq!(geminal.num_params(), 1);
        assert_eq!(geminal.integrals().g(0, 0, 1, 1), 0.1813);
    }

    #[test]
    fn test_projection_space_entries() {
        let mut config = serde_yml::from_str::<Config>(H2_YAML).unwrap().with_defaults();
        config.wavefunction.projection_space = Some(vec![vec![2, 3], vec![0, 1]]);
        let geminal = config.build_geminal().unwrap();
        assert_eq!(geminal.pspace().len(), 2);
        assert_eq!(*geminal.pspace().reference(), SlaterDeterminant::ground(1));

        config.wavefunction.projection_space = Some(vec![vec![0, 0]]);
        assert!(config.projection_space().is_err());
    }

    #[test]
    fn test_non_square_one_electron() {
        let mut config = serde_yml::from_str::<Config>(H2_YAML).unwrap();
        config.integrals.one_electron[1].pop();
        assert!(config.integrals.build().is_err());
    }
}

//! Residual and analytic Jacobian of the projected equations

extern crate nalgebra as na;

use crate::solver_impl::{NonlinearProblem, NonlinearSolver, SolverOutcome};
use crate::wavefunction_impl::{Coefficients, Geminal, GeminalKind, Mode, WavefunctionModel};
use color_eyre::eyre::{bail, ensure, Result};
use na::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::{info, warn};

/// Nonlinear system of a geminal wavefunction
///
/// Borrows the wavefunction read-only; candidate coefficients only ever live in the
/// parameter vectors passed to `residual` and `jacobian`.
pub struct NonlinearSystem<'a> {
    geminal: &'a Geminal,
}

impl<'a> NonlinearSystem<'a> {
    pub fn new(geminal: &'a Geminal) -> Result<Self> {
        let system = Self { geminal };
        ensure!(
            system.num_equations() >= system.num_params(),
            "The system is underdetermined: {} equations for {} parameters",
            system.num_equations(),
            system.num_params()
        );
        Ok(system)
    }

    fn eqn_offset(&self) -> usize {
        self.geminal.model().eqn_offset
    }

    pub fn num_params(&self) -> usize {
        self.geminal.num_params()
    }

    pub fn num_equations(&self) -> usize {
        self.eqn_offset() + self.geminal.pspace().projected().len()
    }

    /// Residual `[<ref|Psi> - 1, E <d|Psi> - <d|H|Psi>, ...]`
    pub fn residual(&self, params: &DVector<f64>) -> Result<DVector<f64>> {
        let geminal = self.geminal;
        let coeffs = geminal.matrix_from_params(params)?;
        let reference = geminal.pspace().reference();
        let energy = geminal.integrate(reference, &coeffs, Mode::Value)?.total();

        let mut residual = DVector::zeros(self.num_equations());
        if geminal.model().normalize {
            residual[0] = geminal.overlap(reference, &coeffs, Mode::Value)? - 1.0;
        }
        let offset = self.eqn_offset();
        for (d, sd) in geminal.pspace().projected().iter().enumerate() {
            let olp = geminal.overlap(sd, &coeffs, Mode::Value)?;
            let hamiltonian = geminal.integrate(sd, &coeffs, Mode::Value)?.total();
            residual[offset + d] = energy * olp - hamiltonian;
        }
        Ok(residual)
    }

    /// Analytic Jacobian, one column per free coefficient
    ///
    /// Each column differentiates every equation with respect to a single coefficient,
    /// `dE <d|Psi> + E d<d|Psi> - d<d|H|Psi>`. Columns are independent and evaluated in
    /// parallel.
    pub fn jacobian(&self, params: &DVector<f64>) -> Result<DMatrix<f64>> {
        let geminal = self.geminal;
        let coeffs = geminal.matrix_from_params(params)?;
        let reference = geminal.pspace().reference();
        let projected = geminal.pspace().projected();
        let energy = geminal.integrate(reference, &coeffs, Mode::Value)?.total();
        let overlaps = projected
            .iter()
            .map(|sd| geminal.overlap(sd, &coeffs, Mode::Value))
            .collect::<Result<Vec<f64>>>()?;

        let offset = self.eqn_offset();
        let num_equations = self.num_equations();
        let columns = geminal
            .parameter_coordinates()
            .into_par_iter()
            .map(|(i, j)| -> Result<DVector<f64>> {
                let mode = Mode::Derivative(i, j);
                let d_energy = geminal.integrate(reference, &coeffs, mode)?.total();
                let mut column = DVector::zeros(num_equations);
                if geminal.model().normalize {
                    column[0] = geminal.overlap(reference, &coeffs, mode)?;
                }
                for (d, sd) in projected.iter().enumerate() {
                    let d_olp = geminal.overlap(sd, &coeffs, mode)?;
                    let d_hamiltonian = geminal.integrate(sd, &coeffs, mode)?.total();
                    column[offset + d] = d_energy * overlaps[d] + energy * d_olp - d_hamiltonian;
                }
                Ok(column)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DMatrix::from_columns(&columns))
    }
}

impl NonlinearProblem for NonlinearSystem<'_> {
    fn num_params(&self) -> usize {
        NonlinearSystem::num_params(self)
    }

    fn num_equations(&self) -> usize {
        NonlinearSystem::num_equations(self)
    }

    fn residual(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        NonlinearSystem::residual(self, x)
    }

    fn jacobian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>> {
        NonlinearSystem::jacobian(self, x)
    }
}

impl Geminal {
    /// Solve the projected equations and keep the coefficients on success
    ///
    /// Starts from `x0`, or from the current coefficients when `None`. If the solver
    /// does not converge the stored coefficients are left untouched.
    pub fn solve(
        &mut self,
        solver: &dyn NonlinearSolver,
        x0: Option<DVector<f64>>,
    ) -> Result<SolverOutcome> {
        let x0 = x0.unwrap_or_else(|| self.params());
        let outcome = {
            let system = NonlinearSystem::new(self)?;
            solver.solve(&system, x0)?
        };

        if outcome.success {
            let coefficients = self.coefficients_from_params(&outcome.params)?;
            self.set_coefficients(coefficients)?;
            info!(
                "{} solver converged in {} iterations, residual norm {:.3e}",
                solver.name(),
                outcome.iterations,
                outcome.residual_norm
            );
        } else {
            warn!(
                "solution did not converge; coefficients were not updated ({})",
                outcome.message
            );
        }
        Ok(outcome)
    }

    /// APIG parameters taken from a converged AP1roG wavefunction
    ///
    /// Solves AP1roG with the same pairs, orbitals, integrals and solver, and returns
    /// its `[I | X]` coefficients in APIG parameter order.
    pub fn ap1rog_guess(&self, solver: &dyn NonlinearSolver) -> Result<DVector<f64>> {
        ensure!(
            self.model().kind == GeminalKind::Apig,
            "An AP1roG guess is only defined for APIG wavefunctions"
        );
        info!("Generating APIG initial guess from AP1roG");
        let mut ap1rog = Geminal::new(
            WavefunctionModel::ap1rog(),
            self.npairs(),
            self.norbs(),
            self.shared_integrals(),
        )?
        .with_permanent_method(self.permanent_method());
        let outcome = ap1rog.solve(solver, None)?;
        if !outcome.success {
            bail!("AP1roG guess did not converge: {}", outcome.message);
        }
        Ok(Coefficients::Full(ap1rog.coefficient_matrix()).to_params())
    }
}

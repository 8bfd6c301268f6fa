//! Nonlinear least-squares solvers
//!
//! The projected Schrödinger equation gives a square or overdetermined system of
//! nonlinear equations `F(x) = 0` in the geminal coefficients. This module provides
//! root finders that minimize `|F(x)|` and report whether a root was reached.
//!
//! # Available Algorithms
//!
//! - **newton**: Gauss-Newton steps from an SVD least-squares solve with backtracking
//! - **lm**: Levenberg-Marquardt with adaptive damping

mod levenberg_marquardt;
mod newton;

pub use levenberg_marquardt::LevenbergMarquardtSolver;
pub use newton::NewtonSolver;

extern crate nalgebra as na;

use color_eyre::eyre::{eyre, Result};
use na::{DMatrix, DVector};
use std::str::FromStr;

/// A system of equations `F(x) = 0` with an optional analytic Jacobian
pub trait NonlinearProblem: Sync {
    fn num_params(&self) -> usize;
    fn num_equations(&self) -> usize;
    fn residual(&self, x: &DVector<f64>) -> Result<DVector<f64>>;
    fn jacobian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>>;
}

/// Result of a solver run
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    pub success: bool,
    pub params: DVector<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
    pub message: String,
}

/// Settings shared by all solvers
#[derive(Debug, Clone, Copy)]
pub struct SolverSettings {
    pub max_iterations: usize,
    /// Convergence threshold on the Euclidean norm of the residual
    pub tolerance: f64,
    pub analytic_jacobian: bool,
    pub finite_difference_step: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            max_iterations: 100,
            tolerance: 1e-10,
            analytic_jacobian: true,
            finite_difference_step: 1e-6,
        }
    }
}

impl SolverSettings {
    /// Jacobian at `x`, analytic or by central differences
    pub fn jacobian(&self, problem: &dyn NonlinearProblem, x: &DVector<f64>) -> Result<DMatrix<f64>> {
        if self.analytic_jacobian {
            problem.jacobian(x)
        } else {
            finite_difference_jacobian(problem, x, self.finite_difference_step)
        }
    }
}

/// Trait for nonlinear solvers
pub trait NonlinearSolver {
    fn name(&self) -> &'static str;

    fn settings(&self) -> &SolverSettings;

    /// Iterate from `x0` until the residual norm falls below the tolerance
    ///
    /// Non-convergence is not an error; it is reported through `SolverOutcome::success`.
    fn solve(&self, problem: &dyn NonlinearProblem, x0: DVector<f64>) -> Result<SolverOutcome>;
}

enum SolverAlgorithm {
    Newton,
    LevenbergMarquardt,
}

impl FromStr for SolverAlgorithm {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newton" | "gauss-newton" => Ok(Self::Newton),
            "lm" | "levenberg-marquardt" => Ok(Self::LevenbergMarquardt),
            _ => Err(eyre!("Unknown algorithm: {}", s)),
        }
    }
}

/// Create a solver based on algorithm choice
pub fn create_solver(algorithm: &str, settings: SolverSettings) -> Result<Box<dyn NonlinearSolver>> {
    let algo = SolverAlgorithm::from_str(algorithm)?;

    match algo {
        SolverAlgorithm::Newton => Ok(Box::new(NewtonSolver::new(settings))),
        SolverAlgorithm::LevenbergMarquardt => Ok(Box::new(LevenbergMarquardtSolver::new(settings))),
    }
}

/// Jacobian by central differences
pub fn finite_difference_jacobian(
    problem: &dyn NonlinearProblem,
    x: &DVector<f64>,
    step: f64,
) -> Result<DMatrix<f64>> {
    let mut jacobian = DMatrix::zeros(problem.num_equations(), x.len());
    for col in 0..x.len() {
        let mut plus = x.clone();
        plus[col] += step;
        let mut minus = x.clone();
        minus[col] -= step;
        let derivative = (problem.residual(&plus)? - problem.residual(&minus)?) / (2.0 * step);
        jacobian.set_column(col, &derivative);
    }
    Ok(jacobian)
}

//! Damped Gauss-Newton solver

extern crate nalgebra as na;

use super::{NonlinearProblem, NonlinearSolver, SolverOutcome, SolverSettings};
use color_eyre::eyre::Result;
use na::DVector;
use tracing::info;

const SVD_EPS: f64 = 1e-12;
const MIN_STEP_FRACTION: f64 = 1.0 / 1024.0;
const SUFFICIENT_DECREASE: f64 = 1e-4;

pub struct NewtonSolver {
    settings: SolverSettings,
}

impl NewtonSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    fn log_progress(&self, iteration: usize, residual_norm: f64, step_norm: f64, damping: f64) {
        info!("  Iteration {}:", iteration);
        info!("    Residual norm: {:.6e}", residual_norm);
        info!("    Step norm: {:.6e} (fraction {:.4})", step_norm, damping);
    }
}

impl NonlinearSolver for NewtonSolver {
    fn name(&self) -> &'static str {
        "newton"
    }

    fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    fn solve(&self, problem: &dyn NonlinearProblem, x0: DVector<f64>) -> Result<SolverOutcome> {
        info!("#####################################################");
        info!("------------ Starting Gauss-Newton Solve ------------");
        info!("#####################################################");
        info!(
            "{} equations in {} parameters",
            problem.num_equations(),
            problem.num_params()
        );

        let mut x = x0;
        let mut residual = problem.residual(&x)?;
        let mut norm = residual.norm();

        for iteration in 0..self.settings.max_iterations {
            if norm < self.settings.tolerance {
                return Ok(converged(x, norm, iteration));
            }

            let jacobian = self.settings.jacobian(problem, &x)?;
            let step = match jacobian.svd(true, true).solve(&(-&residual), SVD_EPS) {
                Ok(step) => step,
                Err(msg) => {
                    return Ok(SolverOutcome {
                        success: false,
                        params: x,
                        residual_norm: norm,
                        iterations: iteration,
                        message: format!("least-squares step failed: {}", msg),
                    })
                }
            };

            // Backtrack until the residual decreases sufficiently
            let mut fraction = 1.0;
            let mut accepted = None;
            while fraction >= MIN_STEP_FRACTION {
                let trial = &x + &step * fraction;
                let trial_residual = problem.residual(&trial)?;
                let trial_norm = trial_residual.norm();
                if trial_norm.is_finite() && trial_norm <= (1.0 - SUFFICIENT_DECREASE * fraction) * norm {
                    accepted = Some((trial, trial_residual, trial_norm));
                    break;
                }
                fraction *= 0.5;
            }

            let Some((trial, trial_residual, trial_norm)) = accepted else {
                return Ok(SolverOutcome {
                    success: false,
                    params: x,
                    residual_norm: norm,
                    iterations: iteration,
                    message: "line search could not reduce the residual".to_string(),
                });
            };

            self.log_progress(iteration + 1, trial_norm, step.norm() * fraction, fraction);
            x = trial;
            residual = trial_residual;
            norm = trial_norm;
        }

        if norm < self.settings.tolerance {
            return Ok(converged(x, norm, self.settings.max_iterations));
        }
        info!(
            "Solver reached maximum number of iterations ({}) without converging",
            self.settings.max_iterations
        );
        Ok(SolverOutcome {
            success: false,
            params: x,
            residual_norm: norm,
            iterations: self.settings.max_iterations,
            message: format!(
                "maximum number of iterations ({}) reached",
                self.settings.max_iterations
            ),
        })
    }
}

pub(super) fn converged(params: DVector<f64>, residual_norm: f64, iterations: usize) -> SolverOutcome {
    info!("Solver converged after {} iterations", iterations);
    info!("-----------------------------------------------------\n");
    SolverOutcome {
        success: true,
        params,
        residual_norm,
        iterations,
        message: "converged".to_string(),
    }
}

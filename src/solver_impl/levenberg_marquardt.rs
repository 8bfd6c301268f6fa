//! Levenberg-Marquardt solver

extern crate nalgebra as na;

use super::newton::converged;
use super::{NonlinearProblem, NonlinearSolver, SolverOutcome, SolverSettings};
use color_eyre::eyre::Result;
use na::DVector;
use tracing::info;

const INITIAL_DAMPING: f64 = 1e-3;
const MIN_DAMPING: f64 = 1e-12;
const MAX_DAMPING: f64 = 1e12;
const MIN_DIAGONAL: f64 = 1e-12;

pub struct LevenbergMarquardtSolver {
    settings: SolverSettings,
}

impl LevenbergMarquardtSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }
}

impl NonlinearSolver for LevenbergMarquardtSolver {
    fn name(&self) -> &'static str {
        "lm"
    }

    fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    fn solve(&self, problem: &dyn NonlinearProblem, x0: DVector<f64>) -> Result<SolverOutcome> {
        info!("#####################################################");
        info!("--------- Starting Levenberg-Marquardt Solve --------");
        info!("#####################################################");

        let mut x = x0;
        let mut residual = problem.residual(&x)?;
        let mut norm = residual.norm();
        let mut damping = INITIAL_DAMPING;

        for iteration in 0..self.settings.max_iterations {
            if norm < self.settings.tolerance {
                return Ok(converged(x, norm, iteration));
            }

            let jacobian = self.settings.jacobian(problem, &x)?;
            let jtj = jacobian.transpose() * &jacobian;
            let gradient = jacobian.transpose() * &residual;

            // Raise the damping until a step reduces the residual
            let mut improved = false;
            while damping <= MAX_DAMPING {
                let mut system = jtj.clone();
                for i in 0..system.nrows() {
                    system[(i, i)] += damping * jtj[(i, i)].max(MIN_DIAGONAL);
                }
                let Some(step) = system.cholesky().map(|c| c.solve(&(-&gradient))) else {
                    damping *= 10.0;
                    continue;
                };
                let trial = &x + &step;
                let trial_residual = problem.residual(&trial)?;
                let trial_norm = trial_residual.norm();
                if trial_norm.is_finite() && trial_norm < norm {
                    info!("  Iteration {}:", iteration + 1);
                    info!("    Residual norm: {:.6e}", trial_norm);
                    info!("    Damping: {:.3e}", damping);
                    x = trial;
                    residual = trial_residual;
                    norm = trial_norm;
                    damping = (damping / 10.0).max(MIN_DAMPING);
                    improved = true;
                    break;
                }
                damping *= 10.0;
            }

            if !improved {
                return Ok(SolverOutcome {
                    success: norm < self.settings.tolerance,
                    params: x,
                    residual_norm: norm,
                    iterations: iteration,
                    message: "damping exceeded its upper bound without reducing the residual"
                        .to_string(),
                });
            }
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

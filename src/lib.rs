// Geminal wavefunction library: APIG and AP1roG by projected Schrödinger equations

pub mod config;
pub mod hamiltonian_impl;
pub mod io;
pub mod permanent_impl;
pub mod pspace_impl;
pub mod slater_impl;
pub mod solver_impl;
pub mod system_impl;
pub mod wavefunction_impl;

#[cfg(test)]
mod test_utils;

pub use hamiltonian_impl::{HamiltonianTerms, IntegralSet};
pub use permanent_impl::PermanentMethod;
pub use pspace_impl::ProjectionSpace;
pub use slater_impl::SlaterDeterminant;
pub use solver_impl::{create_solver, NonlinearSolver, SolverOutcome, SolverSettings};
pub use system_impl::NonlinearSystem;
pub use wavefunction_impl::{Coefficients, Geminal, GeminalKind, Mode, WavefunctionModel};

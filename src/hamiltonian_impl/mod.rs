//! Projected Hamiltonian
//!
//! Evaluates `<sd|H|Psi>` for a geminal wavefunction, split into one-electron, Coulomb
//! and exchange contributions. Closed-shell determinants use a fast path that only
//! visits pair-preserving terms; other determinants go through a full Slater-Condon
//! enumeration over single and double spin-orbital excitations.

mod hamiltonian;
mod integrals;
#[cfg(test)]
mod tests;

pub use hamiltonian::{integrate_closed_shell, integrate_general, HamiltonianTerms};
pub use integrals::IntegralSet;

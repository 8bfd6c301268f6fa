//! Matrix permanents
//!
//! The permanent is the sign-free analogue of the determinant. It is the central
//! quantity of geminal wavefunctions: the overlap of an APIG wavefunction with a
//! closed-shell determinant is the permanent of the coefficient columns of its
//! occupied orbitals.
//!
//! # Available Evaluators
//!
//! - **Combinatoric**: direct sum over injective column maps, `O(n!)`
//! - **Ryser**: inclusion-exclusion with Gray code ordering, `O(2^n n)`
//! - **Borchardt**: closed form for Cauchy-like matrices via `det(C∘C) / det(C)`
//!
//! Rectangular matrices are supported by all evaluators; the permanent of an
//! `m x n` matrix with `m <= n` sums over all injective maps from rows to columns.

mod borchardt;
mod permanent;

pub use borchardt::permanent_borchardt;
pub use permanent::{
    adjugate, permanent_combinatoric, permanent_derivative, permanent_ryser, PermanentMethod,
};

//! Geminal wavefunctions
//!
//! A geminal wavefunction is a product of electron-pair functions. For a closed-shell
//! Slater determinant its overlap is the permanent of the coefficient columns of the
//! occupied spatial orbitals.
//!
//! # Available Models
//!
//! - **APIG** (antisymmetrized product of interacting geminals): full `P x K`
//!   coefficient matrix, with an explicit normalization equation
//! - **AP1roG** (antisymmetrized product of rank-one geminals): identity on the
//!   occupied block and a free `P x (K - P)` virtual block, intermediately normalized
//!
//! # Usage
//!
//! ```rust,ignore
//! use geminals::{Geminal, IntegralSet, WavefunctionModel};
//!
//! let integrals = Arc::new(IntegralSet::new(h, g, nuc_nuc)?);
//! let geminal = Geminal::new(WavefunctionModel::apig(), 1, 2, integrals)?;
//! let olp = geminal.overlap(geminal.pspace().reference(), &geminal.coefficient_matrix(), Mode::Value)?;
//! ```

mod geminal;
mod overlap;

pub use geminal::{Coefficients, Geminal, GeminalKind, Mode, OverlapFn, PspaceFn, WavefunctionModel};
pub use overlap::{ap1rog_overlap, apig_overlap};

//! Projection spaces
//!
//! The projected Schrödinger equation is solved on a finite set of determinants.
//! A projection space is ordered, free of duplicates and always starts with the
//! closed-shell reference determinant.

mod pspace;
#[cfg(test)]
mod tests;

pub use pspace::{generate_ap1rog, generate_apig, ProjectionSpace};

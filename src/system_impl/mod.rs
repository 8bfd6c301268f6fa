//! Projected Schrödinger equations
//!
//! Projecting `(H - E)|Psi> = 0` onto each determinant of the projection space, with
//! `E = <ref|H|Psi>`, gives a nonlinear system in the geminal coefficients. APIG adds
//! the normalization `<ref|Psi> = 1` as its first equation.

mod system;

pub use system::NonlinearSystem;

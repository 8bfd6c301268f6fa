//! Slater determinant bitmasks
//!
//! A Slater determinant is stored as an arbitrary precision bitmask over spin-orbitals.
//! Bit `2i` is the alpha spin-orbital of spatial orbital `i` and bit `2i + 1` is its beta
//! partner. Excitation operations return `None` when the requested operation is
//! impossible (removing an empty orbital, filling an occupied one), so an invalid
//! configuration can never be confused with the empty determinant.

mod slater;

pub use slater::SlaterDeterminant;

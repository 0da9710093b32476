//! Numerical core for SU(N) lattice gauge theory: pseudo-heatbath updates of
//! a gauge field on a periodic hypercubic lattice, a nearest-neighbour
//! fermion hopping operator, and a conjugate-gradient inverter for the
//! resulting fermion matrix.

pub mod algorithms;
pub mod fermions;
pub mod gauge;
pub mod lattice;
pub mod utils;

pub use crate::lattice::field::Lattice;
pub use crate::lattice::layout::{Layout, LexicoLayout};

pub type Real = f64;
pub type Complex = nalgebra::Complex<Real>;

pub type SU2Matrix = nalgebra::SMatrix<Complex, 2, 2>;
pub type ColourMatrix<const NC: usize> = nalgebra::SMatrix<Complex, NC, NC>;
pub type ColourVector<const NC: usize> = nalgebra::SVector<Complex, NC>;
/// Spin-space matrices are dynamically sized: their dimension depends on the
/// lattice rank (2^(Nd/2) spins).
pub type SpinMatrix = nalgebra::DMatrix<Complex>;

pub type LatticeColourMatrix<const NC: usize, L = LexicoLayout> = Lattice<ColourMatrix<NC>, L>;
pub type LatticeColourVector<const NC: usize, L = LexicoLayout> = Lattice<ColourVector<NC>, L>;

pub(crate) const I: Complex = Complex::new(0.0, 1.0);

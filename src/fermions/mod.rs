use crate::lattice::layout::Layout;
use crate::LatticeColourVector;

pub mod hopping;
pub mod wilson;

pub use hopping::HoppingMatrix;
pub use wilson::WilsonFermionAction;

/// A fermion matrix, exposed through its action on spinor fields.
///
/// `apply_hermiticity` multiplies by the matrix (gamma5 for Wilson-type
/// actions) that pairs the operator with its adjoint:
/// M^dag = h M h. The conjugate-gradient solver builds M^dag M from these
/// three calls alone.
pub trait FermionAction<const NC: usize, L: Layout> {
    /// out = M * in.
    fn apply_full(
        &self,
        fermion_out: &mut LatticeColourVector<NC, L>,
        fermion_in: &LatticeColourVector<NC, L>,
    );

    fn apply_hermiticity(&self, fermion: &mut LatticeColourVector<NC, L>);

    /// Inverse of [`apply_hermiticity`](FermionAction::apply_hermiticity).
    fn remove_hermiticity(&self, fermion: &mut LatticeColourVector<NC, L>);
}

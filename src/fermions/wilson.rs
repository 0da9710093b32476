use crate::fermions::hopping::HoppingMatrix;
use crate::fermions::FermionAction;
use crate::lattice::layout::{Layout, LexicoLayout};
use crate::utils::matrices::generate_gamma_matrices;
use crate::{
    ColourVector, Complex, LatticeColourMatrix, LatticeColourVector, SpinMatrix,
};
use std::f64::consts::PI;

/// Wilson fermion matrix M = (Nd + m) - hop / 2, with hopping projectors
/// (1 - gamma_d) on backward-scattered contributions and (1 + gamma_d) on
/// forward-scattered ones.
pub struct WilsonFermionAction<const NC: usize, L: Layout + Clone = LexicoLayout> {
    mass: f64,
    num_dims: usize,
    hopping_matrix: HoppingMatrix<NC, L>,
    gamma5: SpinMatrix,
}

impl<const NC: usize, L: Layout + Clone> WilsonFermionAction<NC, L> {
    /// `twist_fractions` holds per-direction boundary twists in units of pi,
    /// turned into phases exp(2 pi i f); an empty slice means periodic
    /// boundaries in every direction.
    pub fn new(
        mass: f64,
        gauge_field: &LatticeColourMatrix<NC, L>,
        twist_fractions: &[f64],
    ) -> Self {
        let num_dims = gauge_field.num_dims();
        assert!(
            num_dims as f64 + mass != 0.0,
            "Wilson mass term must not vanish"
        );

        let twist_fractions = if twist_fractions.is_empty() {
            vec![0.0; num_dims]
        } else {
            assert_eq!(
                twist_fractions.len(),
                num_dims,
                "one twist fraction per lattice direction"
            );
            twist_fractions.to_vec()
        };
        let phases: Vec<Complex> = twist_fractions
            .iter()
            .map(|fraction| Complex::from_polar(1.0, 2.0 * PI * fraction))
            .collect();

        let mut gammas = generate_gamma_matrices(num_dims);
        let gamma5 = gammas.pop().expect("gamma matrices are never empty");
        let num_spins = gamma5.nrows();
        let identity = SpinMatrix::identity(num_spins, num_spins);

        let mut spin_structures = Vec::with_capacity(2 * num_dims);
        for gamma in &gammas {
            spin_structures.push(&identity - gamma);
            spin_structures.push(&identity + gamma);
        }

        let hopping_matrix =
            HoppingMatrix::with_spin_structures(gauge_field, &phases, 1, spin_structures);

        Self {
            mass,
            num_dims,
            hopping_matrix,
            gamma5,
        }
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    fn apply_gamma5(&self, fermion: &mut LatticeColourVector<NC, L>) {
        let num_spins = self.hopping_matrix.num_spins();
        let volume = fermion.volume();
        assert_eq!(fermion.site_size(), num_spins, "spinor field shape mismatch");

        let mut site_spinors = vec![ColourVector::<NC>::zeros(); num_spins];
        for array_index in 0..volume {
            let base = num_spins * array_index;
            site_spinors.copy_from_slice(&fermion.as_slice()[base..base + num_spins]);
            for alpha in 0..num_spins {
                let mut accumulator = ColourVector::<NC>::zeros();
                for beta in 0..num_spins {
                    accumulator += site_spinors[beta] * self.gamma5[(alpha, beta)];
                }
                fermion[base + alpha] = accumulator;
            }
        }
    }
}

impl<const NC: usize, L: Layout + Clone> FermionAction<NC, L> for WilsonFermionAction<NC, L> {
    fn apply_full(
        &self,
        fermion_out: &mut LatticeColourVector<NC, L>,
        fermion_in: &LatticeColourVector<NC, L>,
    ) {
        self.hopping_matrix.apply_full(fermion_out, fermion_in);
        let diagonal = Complex::new(self.num_dims as f64 + self.mass, 0.0);
        let half = Complex::new(0.5, 0.0);
        for (out, input) in fermion_out.iter_mut().zip(fermion_in.iter()) {
            *out = input * diagonal - *out * half;
        }
    }

    fn apply_hermiticity(&self, fermion: &mut LatticeColourVector<NC, L>) {
        self.apply_gamma5(fermion);
    }

    // gamma5 is its own inverse.
    fn remove_hermiticity(&self, fermion: &mut LatticeColourVector<NC, L>) {
        self.apply_gamma5(fermion);
    }
}

#[cfg(test)]
mod wilson_tests {
    use super::*;
    use crate::lattice::layout::LexicoLayout;
    use crate::{ColourMatrix, Lattice};

    fn identity_gauge(shape: &[usize]) -> LatticeColourMatrix<3> {
        let layout = LexicoLayout::new(shape);
        let num_dims = layout.num_dims();
        Lattice::new(layout, ColourMatrix::<3>::identity(), num_dims)
    }

    fn zero_spinor(gauge_field: &LatticeColourMatrix<3>) -> LatticeColourVector<3> {
        Lattice::new(gauge_field.layout().clone(), ColourVector::<3>::zeros(), 4)
    }

    #[test]
    fn constant_spinor_is_scaled_by_the_mass() {
        // The (1 -+ gamma) pairs sum to twice the identity per direction, so
        // on an identity gauge background a constant spinor picks up
        // (Nd + m) - Nd = m.
        let gauge_field = identity_gauge(&[4, 4, 4, 4]);
        let action = WilsonFermionAction::new(0.1, &gauge_field, &[]);

        let mut fermion_in = zero_spinor(&gauge_field);
        fermion_in.fill(ColourVector::<3>::from_element(Complex::new(1.0, 0.25)));
        let mut fermion_out = zero_spinor(&gauge_field);

        action.apply_full(&mut fermion_out, &fermion_in);

        for (out, input) in fermion_out.iter().zip(fermion_in.iter()) {
            assert!((out - input * Complex::new(0.1, 0.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn hermiticity_round_trips() {
        let gauge_field = identity_gauge(&[2, 2, 2, 2]);
        let action = WilsonFermionAction::new(0.3, &gauge_field, &[]);

        let mut fermion = zero_spinor(&gauge_field);
        for (i, value) in fermion.iter_mut().enumerate() {
            value[0] = Complex::new(i as f64, -0.5);
            value[1] = Complex::new(0.25, i as f64);
        }
        let original = fermion.clone();

        action.apply_hermiticity(&mut fermion);
        action.remove_hermiticity(&mut fermion);

        for (value, expected) in fermion.iter().zip(original.iter()) {
            assert!((value - expected).norm() < 1e-13);
        }
    }

    #[test]
    fn operator_is_gamma5_hermitian() {
        // <x, M y> == <gamma5 M gamma5 x, y> for arbitrary spinors.
        let gauge_field = identity_gauge(&[2, 2, 2, 2]);
        let action = WilsonFermionAction::new(0.2, &gauge_field, &[]);

        let mut x = zero_spinor(&gauge_field);
        let mut y = zero_spinor(&gauge_field);
        for (i, value) in x.iter_mut().enumerate() {
            value[0] = Complex::new(0.5 + i as f64, -1.0);
            value[2] = Complex::new(-0.125, 0.25 * i as f64);
        }
        for (i, value) in y.iter_mut().enumerate() {
            value[1] = Complex::new(1.0, 0.5 - 0.125 * i as f64);
        }

        let inner = |a: &LatticeColourVector<3>, b: &LatticeColourVector<3>| -> Complex {
            a.iter().zip(b.iter()).map(|(u, v)| u.dotc(v)).sum()
        };

        let mut m_y = zero_spinor(&gauge_field);
        action.apply_full(&mut m_y, &y);
        let lhs = inner(&x, &m_y);

        let mut adjoint_x = x.clone();
        action.apply_hermiticity(&mut adjoint_x);
        let mut m_adjoint_x = zero_spinor(&gauge_field);
        action.apply_full(&mut m_adjoint_x, &adjoint_x);
        action.remove_hermiticity(&mut m_adjoint_x);
        let rhs = inner(&m_adjoint_x, &y);

        assert!((lhs - rhs).norm() < 1e-10);
    }

    #[test]
    #[should_panic(expected = "must not vanish")]
    fn degenerate_mass_is_rejected() {
        let gauge_field = identity_gauge(&[2, 2, 2, 2]);
        WilsonFermionAction::new(-4.0, &gauge_field, &[]);
    }
}

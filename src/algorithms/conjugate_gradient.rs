use crate::fermions::FermionAction;
use crate::lattice::layout::Layout;
use crate::{ColourVector, Complex, Lattice, LatticeColourVector};
use log::{debug, trace};

/// Solve M^dag M x = M^dag b for the fermion matrix behind `action`,
/// returning (solution, final residual norm, iterations used).
///
/// The adjoint is applied through the action's hermiticity pairing, so the
/// solver never needs the operator in matrix form. Convergence is declared
/// when the squared residual drops below tol^2 * |b|^2; running out of
/// iterations is not an error and is left to the caller to detect from the
/// returned residual.
pub fn conjugate_gradient<const NC: usize, L, A>(
    action: &A,
    rhs: &LatticeColourVector<NC, L>,
    max_iterations: usize,
    tolerance: f64,
) -> (LatticeColourVector<NC, L>, f64, usize)
where
    L: Layout + Clone,
    A: FermionAction<NC, L>,
{
    assert!(tolerance > 0.0, "tolerance must be positive");

    let zero = Lattice::new(
        rhs.layout().clone(),
        ColourVector::<NC>::zeros(),
        rhs.site_size(),
    );
    let mut solution = zero.clone();

    let rhs_norm_squared = norm_squared(rhs);

    // r0 = M^dag b, the residual of the normal equations at x0 = 0.
    let mut temp = rhs.clone();
    action.apply_hermiticity(&mut temp);
    let mut residual = zero.clone();
    action.apply_full(&mut residual, &temp);
    action.remove_hermiticity(&mut residual);

    let mut residual_norm_squared = norm_squared(&residual);
    if residual_norm_squared == 0.0 {
        return (solution, 0.0, 1);
    }

    let mut direction = residual.clone();
    let mut normal_direction = zero;

    for iteration in 0..max_iterations {
        // normal_direction = M^dag M p, via the hermiticity pairing.
        action.apply_full(&mut temp, &direction);
        action.apply_hermiticity(&mut temp);
        action.apply_full(&mut normal_direction, &temp);
        action.remove_hermiticity(&mut normal_direction);

        let alpha = residual_norm_squared / inner_product(&direction, &normal_direction).re;
        let alpha = Complex::new(alpha, 0.0);
        for (x, p) in solution.iter_mut().zip(direction.iter()) {
            *x += p * alpha;
        }
        for (r, q) in residual.iter_mut().zip(normal_direction.iter()) {
            *r -= q * alpha;
        }

        let new_residual_norm_squared = norm_squared(&residual);
        trace!(
            "conjugate gradient iteration {}: |r|^2 = {:e}",
            iteration + 1,
            new_residual_norm_squared
        );
        if new_residual_norm_squared <= tolerance * tolerance * rhs_norm_squared {
            debug!(
                "conjugate gradient converged after {} iterations",
                iteration + 1
            );
            return (solution, new_residual_norm_squared.sqrt(), iteration + 1);
        }

        let beta = Complex::new(new_residual_norm_squared / residual_norm_squared, 0.0);
        for (p, r) in direction.iter_mut().zip(residual.iter()) {
            *p = r + *p * beta;
        }
        residual_norm_squared = new_residual_norm_squared;
    }

    debug!(
        "conjugate gradient exhausted {} iterations, |r|^2 = {:e}",
        max_iterations, residual_norm_squared
    );
    (solution, residual_norm_squared.sqrt(), max_iterations)
}

fn inner_product<const NC: usize, L: Layout>(
    a: &LatticeColourVector<NC, L>,
    b: &LatticeColourVector<NC, L>,
) -> Complex {
    a.iter().zip(b.iter()).map(|(x, y)| x.dotc(y)).sum()
}

fn norm_squared<const NC: usize, L: Layout>(a: &LatticeColourVector<NC, L>) -> f64 {
    a.iter().map(|x| x.norm_squared()).sum()
}

#[cfg(test)]
mod conjugate_gradient_tests {
    use super::*;
    use crate::fermions::WilsonFermionAction;
    use crate::lattice::layout::LexicoLayout;
    use crate::{ColourMatrix, LatticeColourMatrix};

    // Action proportional to the identity, with trivial hermiticity.
    struct ProportionalAction {
        factor: f64,
    }

    impl FermionAction<3, LexicoLayout> for ProportionalAction {
        fn apply_full(
            &self,
            fermion_out: &mut LatticeColourVector<3>,
            fermion_in: &LatticeColourVector<3>,
        ) {
            let factor = Complex::new(self.factor, 0.0);
            for (out, input) in fermion_out.iter_mut().zip(fermion_in.iter()) {
                *out = input * factor;
            }
        }

        fn apply_hermiticity(&self, _fermion: &mut LatticeColourVector<3>) {}

        fn remove_hermiticity(&self, _fermion: &mut LatticeColourVector<3>) {}
    }

    fn point_source(layout: LexicoLayout) -> LatticeColourVector<3> {
        let mut source = Lattice::new(layout, ColourVector::<3>::zeros(), 4);
        source[0][0] = Complex::new(1.0, 0.0);
        source
    }

    #[test]
    fn proportional_action_converges_immediately() {
        let layout = LexicoLayout::new(&[8, 4, 4, 4]);
        let source = point_source(layout);
        let action = ProportionalAction { factor: 2.0 };

        let (solution, residual, iterations) = conjugate_gradient(&action, &source, 1000, 1e-10);

        for colour in 0..3 {
            let expected = if colour == 0 { 0.5 } else { 0.0 };
            assert_eq!(solution[0][colour].re, expected);
            assert_eq!(solution[0][colour].im, 0.0);
        }
        for value in solution.iter().skip(1) {
            assert!(value.norm() == 0.0);
        }
        assert_eq!(residual, 0.0);
        assert_eq!(iterations, 1);
    }

    #[test]
    fn zero_source_returns_after_a_single_check() {
        let layout = LexicoLayout::new(&[4, 4, 4, 4]);
        let source = Lattice::new(layout, ColourVector::<3>::zeros(), 4);
        let action = ProportionalAction { factor: 3.0 };

        let (solution, residual, iterations) = conjugate_gradient(&action, &source, 100, 1e-10);

        assert!(solution.iter().all(|v| v.norm() == 0.0));
        assert_eq!(residual, 0.0);
        assert_eq!(iterations, 1);
    }

    #[test]
    fn wilson_action_on_identity_gauge_reproduces_the_free_propagator() {
        let layout = LexicoLayout::new(&[8, 4, 4, 4]);
        let gauge_field: LatticeColourMatrix<3> =
            Lattice::new(layout.clone(), ColourMatrix::<3>::identity(), 4);
        let action = WilsonFermionAction::new(0.1, &gauge_field, &[]);
        let source = point_source(layout);

        let (solution, residual, iterations) = conjugate_gradient(&action, &source, 1000, 1e-8);

        assert!(iterations < 1000, "solver failed to converge");
        assert!(residual > 0.0 && residual < 1e-8);

        // Free Wilson propagator at the source, spin 0, colour 0.
        let expected = 0.2522536470229704;
        assert!((solution[0][0].re - expected).abs() < 1e-8);
        assert!(solution[0][0].im.abs() < 1e-10);
        for colour in 1..3 {
            assert!(solution[0][colour].norm() < 1e-8);
        }
    }

    #[test]
    #[should_panic(expected = "tolerance")]
    fn non_positive_tolerance_is_rejected() {
        let layout = LexicoLayout::new(&[2, 2, 2, 2]);
        let source = point_source(layout);
        let action = ProportionalAction { factor: 1.0 };
        conjugate_gradient(&action, &source, 10, 0.0);
    }
}

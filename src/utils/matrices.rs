use crate::{ColourMatrix, Complex, SpinMatrix, SU2Matrix, I};
use once_cell::sync::Lazy;
use rand::distr::Uniform;
use rand::Rng;
use std::f64::consts::PI;

/// Pauli basis: `PAULI[0]` is the identity, `PAULI[1..4]` are σ₁, σ₂, σ₃.
pub static PAULI: Lazy<[SU2Matrix; 4]> = Lazy::new(|| {
    let one = Complex::new(1.0, 0.0);
    let zero = Complex::new(0.0, 0.0);
    [
        SU2Matrix::identity(),
        SU2Matrix::new(zero, one, one, zero),
        SU2Matrix::new(zero, -I, I, zero),
        SU2Matrix::new(one, zero, zero, -one),
    ]
});

/// Build a₀σ₀ + i(a₁σ₁ + a₂σ₂ + a₃σ₃). With Σaₖ² = 1 the result is in SU(2).
pub fn construct_su2(coefficients: [f64; 4]) -> SU2Matrix {
    let [a0, a1, a2, a3] = coefficients;
    PAULI[0] * Complex::new(a0, 0.0)
        + (PAULI[1] * Complex::new(a1, 0.0)
            + PAULI[2] * Complex::new(a2, 0.0)
            + PAULI[3] * Complex::new(a3, 0.0))
            * I
}

/// Determinant of a 2×2 matrix; for the Pauli-basis combinations used here
/// it is real and equal to the squared coefficient norm.
pub fn su2_determinant(matrix: &SU2Matrix) -> Complex {
    matrix[(0, 0)] * matrix[(1, 1)] - matrix[(0, 1)] * matrix[(1, 0)]
}

// Completes a Pauli 4-vector whose first component is already set, drawing
// the remaining three-vector uniformly from the sphere of the matching
// radius.
fn complete_coefficients<R: Rng + ?Sized>(coefficients: &mut [f64; 4], rng: &mut R) {
    let radius = (1.0 - coefficients[0] * coefficients[0]).sqrt();
    let cos_theta: f64 = rng.sample(Uniform::new(-1.0, 1.0).unwrap());
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi = rng.sample(Uniform::new(0.0, 2.0 * PI).unwrap());

    coefficients[1] = radius * sin_theta * phi.cos();
    coefficients[2] = radius * sin_theta * phi.sin();
    coefficients[3] = radius * cos_theta;
}

/// Random SU(2) matrix.
///
/// The first Pauli coefficient is drawn from [0, 1), so the distribution
/// covers only the half-sphere with non-negative trace; this matches the
/// behaviour callers rely on for subgroup resets, not the Haar measure.
pub fn random_su2<R: Rng + ?Sized>(rng: &mut R) -> SU2Matrix {
    let mut coefficients = [0.0; 4];
    coefficients[0] = rng.sample(Uniform::new(0.0, 1.0).unwrap());
    complete_coefficients(&mut coefficients, rng);
    construct_su2(coefficients)
}

/// Random SU(2) matrix with first coefficient distributed according to
/// √(1 − x²)·exp(weight·x) on [−1, 1], via the Kennedy-Pendleton
/// acceptance loop (Phys. Lett. 156B (1985)).
pub fn heatbath_su2<R: Rng + ?Sized>(weight: f64, rng: &mut R) -> SU2Matrix {
    debug_assert!(weight > 0.0, "heatbath weight must be positive");
    let unit = Uniform::new(0.0, 1.0).unwrap();

    let lambda_squared = loop {
        // 1 - U keeps the logarithms finite.
        let r0: f64 = 1.0 - rng.sample(unit);
        let r1: f64 = 1.0 - rng.sample(unit);
        let r2: f64 = 1.0 - rng.sample(unit);
        let lambda_squared =
            -1.0 / (2.0 * weight) * (r0.ln() + (2.0 * PI * r1).cos().powi(2) * r2.ln());
        let acceptance: f64 = rng.sample(unit);
        if acceptance * acceptance <= 1.0 - lambda_squared {
            break lambda_squared;
        }
    };

    let mut coefficients = [0.0; 4];
    coefficients[0] = 1.0 - 2.0 * lambda_squared;
    complete_coefficients(&mut coefficients, rng);
    construct_su2(coefficients)
}

/// Row/column pair addressed by an SU(2) subgroup index: unordered pairs
/// (i, j) with i < j < Nc, enumerated lexicographically.
pub fn su2_subgroup_pos(num_colours: usize, index: usize) -> (usize, usize) {
    assert!(
        index < num_colours * (num_colours - 1) / 2,
        "SU(2) subgroup index out of range"
    );
    let mut remainder = index;
    let mut i = 0;
    while remainder >= num_colours - 1 - i {
        remainder -= num_colours - 1 - i;
        i += 1;
    }
    (i, i + 1 + remainder)
}

/// Project the (i, j) subblock of a colour matrix onto the Pauli basis.
///
/// The result is a real linear combination of σ₀ and iσₖ but not yet
/// unitary; callers normalise by dividing by the square root of its
/// determinant.
pub fn extract_su2<const NC: usize>(
    colour_matrix: &ColourMatrix<NC>,
    subgroup: usize,
) -> SU2Matrix {
    let (i, j) = su2_subgroup_pos(NC, subgroup);
    let submatrix = SU2Matrix::new(
        colour_matrix[(i, i)],
        colour_matrix[(i, j)],
        colour_matrix[(j, i)],
        colour_matrix[(j, j)],
    );
    submatrix - submatrix.adjoint() + SU2Matrix::identity() * submatrix.trace().conj()
}

/// Embed an SU(2) matrix into SU(Nc) at the given subgroup position,
/// identity elsewhere.
pub fn insert_su2<const NC: usize>(su2_matrix: &SU2Matrix, subgroup: usize) -> ColourMatrix<NC> {
    let (i, j) = su2_subgroup_pos(NC, subgroup);
    let mut ret = ColourMatrix::<NC>::identity();
    ret[(i, i)] = su2_matrix[(0, 0)];
    ret[(i, j)] = su2_matrix[(0, 1)];
    ret[(j, i)] = su2_matrix[(1, 0)];
    ret[(j, j)] = su2_matrix[(1, 1)];
    ret
}

/// Random SU(Nc) matrix: product of random SU(2) embeddings over all
/// subgroups.
pub fn random_sun<const NC: usize, R: Rng + ?Sized>(rng: &mut R) -> ColourMatrix<NC> {
    let num_subgroups = NC * (NC - 1) / 2;
    let mut ret = ColourMatrix::<NC>::identity();
    for subgroup in 0..num_subgroups {
        ret *= insert_su2::<NC>(&random_su2(rng), subgroup);
    }
    ret
}

/// Euclidean gamma matrices in the chiral representation: hermitian,
/// squaring to the identity and pairwise anticommuting. The final entry is
/// their ordered product (γ₅).
pub fn generate_gamma_matrices(num_dims: usize) -> Vec<SpinMatrix> {
    assert_eq!(
        num_dims, 4,
        "gamma matrices are implemented for four dimensions"
    );
    let num_spins = 1 << (num_dims / 2);

    // Off-diagonal block form [[0, B], [B†, 0]] with B = σ₀ for the first
    // direction and B = -iσₖ for the rest.
    let block = |upper: SU2Matrix| -> SpinMatrix {
        let lower = upper.adjoint();
        let mut gamma = SpinMatrix::zeros(num_spins, num_spins);
        for row in 0..2 {
            for col in 0..2 {
                gamma[(row, col + 2)] = upper[(row, col)];
                gamma[(row + 2, col)] = lower[(row, col)];
            }
        }
        gamma
    };

    let mut gammas: Vec<SpinMatrix> = Vec::with_capacity(num_dims + 1);
    gammas.push(block(PAULI[0]));
    for k in 1..num_dims {
        gammas.push(block(PAULI[k] * -I));
    }

    let gamma5 = gammas
        .iter()
        .fold(SpinMatrix::identity(num_spins, num_spins), |product, gamma| {
            &product * gamma
        });
    gammas.push(gamma5);
    gammas
}

use crate::gauge::GaugeAction;
use crate::lattice::layout::Layout;
use crate::utils::matrices::{extract_su2, heatbath_su2, insert_su2, random_su2, su2_determinant};
use crate::{ColourMatrix, LatticeColourMatrix};
use log::debug;
use rand::Rng;

// Pseudo-heatbath update of one SU(2) subgroup of a link, following
// Cabibbo-Marinari: extract the subgroup component of link * staples,
// draw the new SU(2) element from the Kennedy-Pendleton distribution at the
// staple-dependent weight, and rotate the link by its embedding.
fn su2_subgroup_update<const NC: usize, R: Rng + ?Sized>(
    link: &mut ColourMatrix<NC>,
    staples: &ColourMatrix<NC>,
    weight: f64,
    subgroup: usize,
    rng: &mut R,
) {
    let w = *link * staples;
    let extracted = extract_su2(&w, subgroup);
    let sqrt_det = su2_determinant(&extracted).sqrt();
    let staple_norm = sqrt_det.re;

    // A vanishing staple projection leaves the conditional distribution
    // flat; fall back to an unconstrained SU(2) draw rather than divide by
    // zero.
    let rotation = if staple_norm < 6.0 * f64::EPSILON {
        random_su2(rng)
    } else {
        let normalised = extracted / sqrt_det;
        heatbath_su2(staple_norm * weight, rng) * normalised.adjoint()
    };

    *link = insert_su2::<NC>(&rotation, subgroup) * *link;
}

/// Heatbath update of the single link addressed by
/// `link_index = site_index * num_dims + direction`.
pub fn heatbath_link_update<const NC: usize, L, A, R>(
    gauge_field: &mut LatticeColourMatrix<NC, L>,
    action: &A,
    link_index: usize,
    rng: &mut R,
) where
    L: Layout,
    A: GaugeAction<NC, L>,
    R: Rng + ?Sized,
{
    let staples = action.compute_staples(gauge_field, link_index);
    let beta_prime = action.beta() / NC as f64;
    let num_dims = gauge_field.site_size();
    let site_index = link_index / num_dims;
    let direction = link_index % num_dims;

    let mut link = *gauge_field.site(site_index, direction);
    let num_subgroups = NC * (NC - 1) / 2;
    for subgroup in 0..num_subgroups {
        su2_subgroup_update(&mut link, &staples, beta_prime, subgroup, rng);
    }
    *gauge_field.site_mut(site_index, direction) = link;
}

/// Sweep the whole field `num_sweeps` times, updating every link once per
/// sweep in site-major, direction-minor order.
pub fn heatbath_update<const NC: usize, L, A, R>(
    gauge_field: &mut LatticeColourMatrix<NC, L>,
    action: &A,
    num_sweeps: usize,
    rng: &mut R,
) where
    L: Layout,
    A: GaugeAction<NC, L>,
    R: Rng + ?Sized,
{
    let num_links = gauge_field.size();
    for sweep in 0..num_sweeps {
        for link_index in 0..num_links {
            heatbath_link_update(gauge_field, action, link_index, rng);
        }
        debug!("completed heatbath sweep {}/{}", sweep + 1, num_sweeps);
    }
}

#[cfg(test)]
mod heatbath_tests {
    use super::*;
    use crate::gauge::observables::average_plaquette;
    use crate::gauge::WilsonGaugeAction;
    use crate::lattice::layout::LexicoLayout;
    use crate::utils::random::RandomSource;
    use crate::Lattice;

    fn identity_field(shape: &[usize]) -> LatticeColourMatrix<3> {
        let layout = LexicoLayout::new(shape);
        let num_dims = layout.num_dims();
        Lattice::new(layout, ColourMatrix::<3>::identity(), num_dims)
    }

    fn max_unitarity_defect(field: &LatticeColourMatrix<3>) -> f64 {
        field
            .iter()
            .flat_map(|link| {
                let defect = link.adjoint() * link - ColourMatrix::<3>::identity();
                defect.iter().map(|entry| entry.norm()).collect::<Vec<_>>()
            })
            .fold(0.0, f64::max)
    }

    fn max_determinant_defect(field: &LatticeColourMatrix<3>) -> f64 {
        field
            .iter()
            .map(|link| (link.determinant() - crate::Complex::new(1.0, 0.0)).norm())
            .fold(0.0, f64::max)
    }

    #[test]
    fn sweeps_preserve_group_membership() {
        let mut field = identity_field(&[4, 4, 4, 4]);
        let action = WilsonGaugeAction::new(5.5);
        let mut rng = RandomSource::from_seed(101);

        heatbath_update(&mut field, &action, 10, &mut rng);

        assert!(max_unitarity_defect(&field) < 1e-10);
        assert!(max_determinant_defect(&field) < 1e-10);
    }

    #[test]
    fn identical_seeds_give_identical_fields() {
        let action = WilsonGaugeAction::new(5.5);

        let mut first = identity_field(&[4, 4, 4, 4]);
        let mut rng = RandomSource::from_seed(2024);
        heatbath_update(&mut first, &action, 2, &mut rng);

        let mut second = identity_field(&[4, 4, 4, 4]);
        let mut rng = RandomSource::from_seed(2024);
        heatbath_update(&mut second, &action, 2, &mut rng);

        assert_eq!(first, second);
    }

    #[test]
    fn weak_coupling_stays_ordered() {
        // At very large beta the conditional distribution concentrates on
        // the staple direction, so a cold start barely moves.
        let mut field = identity_field(&[4, 4, 4, 4]);
        let action = WilsonGaugeAction::new(100.0);
        let mut rng = RandomSource::from_seed(55);

        heatbath_update(&mut field, &action, 2, &mut rng);

        assert!(average_plaquette(&field) > 0.9);
    }

    #[test]
    fn intermediate_coupling_disorders_the_field() {
        // Quenched SU(3) at beta = 5.5 equilibrates to an average plaquette
        // near one half; ten sweeps from a cold start land well inside a
        // generous band around it.
        let mut field = identity_field(&[4, 4, 4, 4]);
        let action = WilsonGaugeAction::new(5.5);
        let mut rng = RandomSource::from_seed(77);

        heatbath_update(&mut field, &action, 10, &mut rng);

        let plaquette = average_plaquette(&field);
        assert!(
            (0.3..0.8).contains(&plaquette),
            "average plaquette {plaquette} outside expected band"
        );
    }
}

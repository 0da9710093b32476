use crate::gauge::wilson::compute_wilson_staples;
use crate::gauge::{link_at, GaugeAction};
use crate::lattice::layout::Layout;
use crate::{ColourMatrix, Complex, LatticeColourMatrix};

/// Rectangle-improved gauge action: Wilson staples weighted by c0 = 5/3 plus
/// 2x1 rectangle staples weighted by c1 = -1/12, the latter divided by the
/// squared tadpole factor u0.
#[derive(Clone, Debug)]
pub struct RectangleGaugeAction {
    beta: f64,
    u0: f64,
}

impl RectangleGaugeAction {
    pub fn new(beta: f64, u0: f64) -> Self {
        assert!(beta > 0.0, "inverse coupling beta must be positive");
        assert!(u0 > 0.0, "tadpole factor u0 must be positive");
        Self { beta, u0 }
    }
}

impl<const NC: usize, L: Layout> GaugeAction<NC, L> for RectangleGaugeAction {
    fn beta(&self) -> f64 {
        self.beta
    }

    fn compute_staples(
        &self,
        gauge_field: &LatticeColourMatrix<NC, L>,
        link_index: usize,
    ) -> ColourMatrix<NC> {
        let wilson = compute_wilson_staples(gauge_field, link_index);
        let rectangles = compute_rectangle_staples(gauge_field, link_index);
        wilson * Complex::new(5.0 / 3.0, 0.0)
            - rectangles * Complex::new(1.0 / (12.0 * self.u0 * self.u0), 0.0)
    }
}

/// Sum of the six 2x1 rectangle staples in every plane containing the link.
fn compute_rectangle_staples<const NC: usize, L: Layout>(
    gauge_field: &LatticeColourMatrix<NC, L>,
    link_index: usize,
) -> ColourMatrix<NC> {
    let num_dims = gauge_field.site_size();
    let site_index = link_index / num_dims;
    let mu = link_index % num_dims;
    let origin = gauge_field.layout().compute_site_coords(site_index);

    let mut staples = ColourMatrix::<NC>::zeros();
    for nu in 0..num_dims {
        if nu == mu {
            continue;
        }
        // Link at x + dmu*mu + dnu*nu in the given direction.
        let link = |dmu: isize, dnu: isize, direction: usize| -> ColourMatrix<NC> {
            let mut coords = origin.clone();
            coords[mu] += dmu;
            coords[nu] += dnu;
            link_at(gauge_field, &coords, direction)
        };

        // Rectangles lying along mu, above and below the link.
        staples += link(1, 0, mu)
            * link(2, 0, nu)
            * link(1, 1, mu).adjoint()
            * link(0, 1, mu).adjoint()
            * link(0, 0, nu).adjoint();
        staples += link(1, 0, mu)
            * link(2, -1, nu).adjoint()
            * link(1, -1, mu).adjoint()
            * link(0, -1, mu).adjoint()
            * link(0, -1, nu);

        // The same two shapes translated one site backward along mu.
        staples += link(1, 0, nu)
            * link(0, 1, mu).adjoint()
            * link(-1, 1, mu).adjoint()
            * link(-1, 0, nu).adjoint()
            * link(-1, 0, mu);
        staples += link(1, -1, nu).adjoint()
            * link(0, -1, mu).adjoint()
            * link(-1, -1, mu).adjoint()
            * link(-1, -1, nu)
            * link(-1, 0, mu);

        // Rectangles standing two sites into the perpendicular direction.
        staples += link(1, 0, nu)
            * link(1, 1, nu)
            * link(0, 2, mu).adjoint()
            * link(0, 1, nu).adjoint()
            * link(0, 0, nu).adjoint();
        staples += link(1, -1, nu).adjoint()
            * link(1, -2, nu).adjoint()
            * link(0, -2, mu).adjoint()
            * link(0, -2, nu)
            * link(0, -1, nu);
    }
    staples
}

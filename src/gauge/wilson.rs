use crate::gauge::{link_at, GaugeAction};
use crate::lattice::layout::Layout;
use crate::{ColourMatrix, LatticeColourMatrix};

/// Wilson plaquette action.
#[derive(Clone, Debug)]
pub struct WilsonGaugeAction {
    beta: f64,
}

impl WilsonGaugeAction {
    pub fn new(beta: f64) -> Self {
        assert!(beta > 0.0, "inverse coupling beta must be positive");
        Self { beta }
    }
}

impl<const NC: usize, L: Layout> GaugeAction<NC, L> for WilsonGaugeAction {
    fn beta(&self) -> f64 {
        self.beta
    }

    fn compute_staples(
        &self,
        gauge_field: &LatticeColourMatrix<NC, L>,
        link_index: usize,
    ) -> ColourMatrix<NC> {
        compute_wilson_staples(gauge_field, link_index)
    }
}

/// Sum of the two plaquette staples in every plane containing the link.
pub(crate) fn compute_wilson_staples<const NC: usize, L: Layout>(
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
        let mut coords = origin.clone();

        // Upper staple: U_nu(x + mu) U_mu(x + nu)^dag U_nu(x)^dag.
        coords[mu] += 1;
        let mut staple = link_at(gauge_field, &coords, nu);
        coords[mu] -= 1;
        coords[nu] += 1;
        staple *= link_at(gauge_field, &coords, mu).adjoint();
        coords[nu] -= 1;
        staple *= link_at(gauge_field, &coords, nu).adjoint();
        staples += staple;

        // Lower staple: U_nu(x + mu - nu)^dag U_mu(x - nu)^dag U_nu(x - nu).
        coords[mu] += 1;
        coords[nu] -= 1;
        let mut staple = link_at(gauge_field, &coords, nu).adjoint();
        coords[mu] -= 1;
        staple *= link_at(gauge_field, &coords, mu).adjoint();
        staple *= link_at(gauge_field, &coords, nu);
        staples += staple;
    }
    staples
}

use crate::gauge::link_at;
use crate::lattice::layout::Layout;
use crate::LatticeColourMatrix;

/// Normalised trace of the plaquette at `site` in the (mu, nu) plane:
/// Re tr[U_mu(x) U_nu(x+mu) U_mu(x+nu)^dag U_nu(x)^dag] / Nc.
pub fn plaquette<const NC: usize, L: Layout>(
    gauge_field: &LatticeColourMatrix<NC, L>,
    site: &[isize],
    mu: usize,
    nu: usize,
) -> f64 {
    let mut coords = site.to_vec();
    let mut product = link_at(gauge_field, &coords, mu);
    coords[mu] += 1;
    product *= link_at(gauge_field, &coords, nu);
    coords[mu] -= 1;
    coords[nu] += 1;
    product *= link_at(gauge_field, &coords, mu).adjoint();
    coords[nu] -= 1;
    product *= link_at(gauge_field, &coords, nu).adjoint();
    product.trace().re / NC as f64
}

/// Normalised trace of the 2x1 rectangle at `site`, two links along mu and
/// one along nu.
pub fn rectangle<const NC: usize, L: Layout>(
    gauge_field: &LatticeColourMatrix<NC, L>,
    site: &[isize],
    mu: usize,
    nu: usize,
) -> f64 {
    let mut coords = site.to_vec();
    let mut product = link_at(gauge_field, &coords, mu);
    coords[mu] += 1;
    product *= link_at(gauge_field, &coords, mu);
    coords[mu] += 1;
    product *= link_at(gauge_field, &coords, nu);
    coords[mu] -= 1;
    coords[nu] += 1;
    product *= link_at(gauge_field, &coords, mu).adjoint();
    coords[mu] -= 1;
    product *= link_at(gauge_field, &coords, mu).adjoint();
    coords[nu] -= 1;
    product *= link_at(gauge_field, &coords, nu).adjoint();
    product.trace().re / NC as f64
}

/// Plaquette averaged over every site and plane.
pub fn average_plaquette<const NC: usize, L: Layout>(
    gauge_field: &LatticeColourMatrix<NC, L>,
) -> f64 {
    average_over_planes(gauge_field, plaquette)
}

/// Rectangle averaged over every site and ordered plane.
pub fn average_rectangle<const NC: usize, L: Layout>(
    gauge_field: &LatticeColourMatrix<NC, L>,
) -> f64 {
    average_over_planes(gauge_field, rectangle)
}

fn average_over_planes<const NC: usize, L: Layout>(
    gauge_field: &LatticeColourMatrix<NC, L>,
    loop_value: fn(&LatticeColourMatrix<NC, L>, &[isize], usize, usize) -> f64,
) -> f64 {
    let layout = gauge_field.layout();
    let num_dims = layout.num_dims();
    let num_planes = num_dims * (num_dims - 1) / 2;
    let mut total = 0.0;
    for site_index in 0..layout.volume() {
        let coords = layout.compute_site_coords(site_index);
        for mu in 1..num_dims {
            for nu in 0..mu {
                total += loop_value(gauge_field, &coords, mu, nu);
            }
        }
    }
    total / (layout.volume() * num_planes) as f64
}

use crate::lattice::layout::Layout;
use crate::{ColourMatrix, LatticeColourMatrix};

pub mod observables;
pub mod rectangle;
pub mod wilson;

pub use rectangle::RectangleGaugeAction;
pub use wilson::WilsonGaugeAction;

/// Local weight of a gauge action: the staple sum multiplying a given link,
/// plus the inverse coupling. `link_index` packs site and direction as
/// `site_index * num_dims + direction`.
pub trait GaugeAction<const NC: usize, L: Layout> {
    fn beta(&self) -> f64;

    fn compute_staples(
        &self,
        gauge_field: &LatticeColourMatrix<NC, L>,
        link_index: usize,
    ) -> ColourMatrix<NC>;
}

/// Link lookup by unsanitised signed coordinates.
pub(crate) fn link_at<const NC: usize, L: Layout>(
    gauge_field: &LatticeColourMatrix<NC, L>,
    coords: &[isize],
    direction: usize,
) -> ColourMatrix<NC> {
    let mut coords = coords.to_vec();
    gauge_field.layout().sanitise_site_coords(&mut coords);
    *gauge_field.at(&coords, direction)
}

use crate::lattice::layout::{Layout, LexicoLayout};
use crate::{
    ColourMatrix, ColourVector, Complex, Lattice, LatticeColourMatrix, LatticeColourVector,
    SpinMatrix,
};
use num_traits::One;

/// Nearest-neighbour hopping stencil over a fixed gauge background.
///
/// Construction scatters the gauge field into per-site straight-line link
/// products for both signed directions and records the neighbour array
/// indices, so that applying the stencil touches only contiguous per-site
/// data in its heavy multiplication phase. The gauge field is only borrowed
/// during construction.
///
/// Spin structures are injected separately: they belong to the fermion
/// formulation, not to the gauge background. Entry `2d` multiplies the
/// contribution scattered to the site `num_hops` steps backward along axis
/// `d`, entry `2d + 1` the (adjointed) contribution scattered forward.
pub struct HoppingMatrix<const NC: usize, L: Layout + Clone = LexicoLayout> {
    scattered_gauge_field: LatticeColourMatrix<NC, L>,
    spin_structures: Vec<SpinMatrix>,
    // Flat per-site neighbour table: [array_index * 2 * num_dims + slot].
    neighbour_array_indices: Vec<usize>,
    num_spins: usize,
    num_hops: usize,
}

impl<const NC: usize, L: Layout + Clone> HoppingMatrix<NC, L> {
    /// Precompute the scattered gauge field and neighbour tables.
    ///
    /// `phases` holds one boundary phase per direction, multiplied into
    /// link products that wrap around the lattice edge.
    pub fn new(
        gauge_field: &LatticeColourMatrix<NC, L>,
        phases: &[Complex],
        num_hops: usize,
    ) -> Self {
        let layout = gauge_field.layout().clone();
        let num_dims = layout.num_dims();
        assert!(num_hops >= 1, "hopping requires at least one hop");
        assert_eq!(
            phases.len(),
            num_dims,
            "one boundary phase per lattice direction"
        );
        assert_eq!(
            gauge_field.site_size(),
            num_dims,
            "link field must carry one matrix per direction"
        );

        let volume = layout.volume();
        let hops = num_hops as isize;
        let num_spins = 1 << (num_dims / 2);

        let mut scattered_gauge_field = Lattice::new(
            layout.clone(),
            ColourMatrix::<NC>::identity(),
            2 * num_dims,
        );
        let mut neighbour_array_indices = vec![0usize; volume * 2 * num_dims];

        for site_index in 0..volume {
            let array_index = layout.get_array_index(site_index);
            for d in 0..num_dims {
                let mut coords = layout.compute_site_coords(site_index);
                let extent = layout.shape()[d] as isize;

                let phase_fwd = if coords[d] + hops >= extent {
                    phases[d]
                } else {
                    Complex::one()
                };
                let phase_bck = if coords[d] < hops {
                    phases[d]
                } else {
                    Complex::one()
                };

                // Straight-line products of num_hops links: backward starts
                // at x - num_hops * e_d, forward at x.
                let mut backward = ColourMatrix::<NC>::identity() * phase_bck;
                let mut forward = ColourMatrix::<NC>::identity() * phase_fwd;
                for h in 0..hops {
                    coords[d] += h - hops;
                    layout.sanitise_site_coords(&mut coords);
                    backward *= *gauge_field.at(&coords, d);

                    coords[d] += hops;
                    layout.sanitise_site_coords(&mut coords);
                    forward *= *gauge_field.at(&coords, d);

                    coords[d] -= h;
                }
                *scattered_gauge_field.site_mut(site_index, 2 * d) = backward;
                *scattered_gauge_field.site_mut(site_index, 2 * d + 1) = forward;

                coords[d] -= hops;
                layout.sanitise_site_coords(&mut coords);
                let backward_neighbour =
                    layout.get_array_index(layout.compute_site_index(&coords));
                coords[d] += 2 * hops;
                layout.sanitise_site_coords(&mut coords);
                let forward_neighbour =
                    layout.get_array_index(layout.compute_site_index(&coords));

                neighbour_array_indices[array_index * 2 * num_dims + 2 * d] = backward_neighbour;
                neighbour_array_indices[array_index * 2 * num_dims + 2 * d + 1] =
                    forward_neighbour;
            }
        }

        Self {
            scattered_gauge_field,
            spin_structures: Vec::new(),
            neighbour_array_indices,
            num_spins,
            num_hops,
        }
    }

    pub fn with_spin_structures(
        gauge_field: &LatticeColourMatrix<NC, L>,
        phases: &[Complex],
        num_hops: usize,
        spin_structures: Vec<SpinMatrix>,
    ) -> Self {
        let mut hopping = Self::new(gauge_field, phases, num_hops);
        hopping.set_spin_structures(spin_structures);
        hopping
    }

    pub fn set_spin_structures(&mut self, spin_structures: Vec<SpinMatrix>) {
        assert_eq!(
            spin_structures.len(),
            2 * self.scattered_gauge_field.num_dims(),
            "two spin structures per direction"
        );
        for structure in &spin_structures {
            assert_eq!(
                (structure.nrows(), structure.ncols()),
                (self.num_spins, self.num_spins),
                "spin structure dimension must match the spinor rank"
            );
        }
        self.spin_structures = spin_structures;
    }

    pub fn num_spins(&self) -> usize {
        self.num_spins
    }

    pub fn num_hops(&self) -> usize {
        self.num_hops
    }

    /// out = H * in.
    ///
    /// Phase one accumulates, per source site, the spin-projected and
    /// gauge-transported partial spinors; phase two scatters them to the
    /// neighbouring sites. Keeping the phases separate confines the
    /// neighbour-dependent memory traffic to the cheap scatter loop.
    pub fn apply_full(
        &self,
        fermion_out: &mut LatticeColourVector<NC, L>,
        fermion_in: &LatticeColourVector<NC, L>,
    ) {
        assert!(
            !self.spin_structures.is_empty(),
            "spin structures must be set before applying the hopping matrix"
        );
        let num_dims = self.scattered_gauge_field.num_dims();
        let volume = self.scattered_gauge_field.volume();
        let num_spins = self.num_spins;
        assert_eq!(
            fermion_in.site_size(),
            num_spins,
            "spinor field must carry one component per spin"
        );
        assert_eq!(fermion_in.volume(), volume, "spinor field shape mismatch");
        assert_eq!(
            fermion_out.size(),
            fermion_in.size(),
            "output field shape mismatch"
        );

        let mut partials =
            vec![ColourVector::<NC>::zeros(); volume * num_dims * 2 * num_spins];

        for array_index in 0..volume {
            for mu in 0..num_dims {
                let local_index = 2 * (num_dims * array_index + mu);
                let backward = &self.scattered_gauge_field[local_index];
                let forward_adjoint = self.scattered_gauge_field[local_index + 1].adjoint();
                for alpha in 0..num_spins {
                    for beta in 0..num_spins {
                        let spinor_in = &fermion_in[num_spins * array_index + beta];
                        partials[num_spins * local_index + 2 * alpha] += backward * spinor_in
                            * self.spin_structures[2 * mu][(alpha, beta)];
                        partials[num_spins * local_index + 2 * alpha + 1] += &forward_adjoint
                            * spinor_in
                            * self.spin_structures[2 * mu + 1][(alpha, beta)];
                    }
                }
            }
        }

        fermion_out.fill(ColourVector::<NC>::zeros());
        for array_index in 0..volume {
            for mu in 0..num_dims {
                let table_index = array_index * 2 * num_dims + 2 * mu;
                let backward_neighbour = self.neighbour_array_indices[table_index];
                let forward_neighbour = self.neighbour_array_indices[table_index + 1];
                for alpha in 0..num_spins {
                    let gather_index = 2 * (num_spins * (num_dims * array_index + mu) + alpha);
                    fermion_out[num_spins * backward_neighbour + alpha] +=
                        partials[gather_index];
                    fermion_out[num_spins * forward_neighbour + alpha] +=
                        partials[gather_index + 1];
                }
            }
        }
    }
}

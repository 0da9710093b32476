pub mod conjugate_gradient;
pub mod heatbath;

pub use conjugate_gradient::conjugate_gradient;
pub use heatbath::{heatbath_link_update, heatbath_update};

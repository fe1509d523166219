pub mod matrix;
pub mod numeric;

pub use matrix::Matrix;
pub use numeric::{Numerics, SATURATION};

mod macros;
mod matrix;

pub use crate::matrix::Matrix;

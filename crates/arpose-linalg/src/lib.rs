#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the matrix layer.
pub mod error;

/// Owned dense matrix and its allocate/multiply/invert primitives.
pub mod matrix;

/// 3x4 transform composition and rotation helpers.
pub mod transform;

pub use crate::error::LinalgError;
pub use crate::matrix::{alloc_mul, alloc_transpose, mul, transpose, Matrix};
pub use crate::transform::{mat34_from_rt, mat34_mul, rodrigues, Mat34, MAT34_IDENTITY};

#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the camera model.
pub mod error;

/// Versioned distortion coefficient layouts.
pub mod distortion;

/// Camera parameter container and diagnostic dump.
pub mod param;

pub use crate::distortion::{DistortionFactors, DistortionVersion};
pub use crate::error::CameraError;
pub use crate::param::{format_transform, log_transform, CameraParam};

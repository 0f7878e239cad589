/// An error type for the camera model.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CameraError {
    /// The distortion function version tag is not one of the supported layouts.
    #[error("Unsupported distortion function version {0}, expected 1, 2, 3 or 4")]
    InvalidParameter(i32),

    /// The coefficient count does not match the layout of the version.
    #[error("Distortion version {version} expects {expected} coefficients, got {actual}")]
    CoefficientCount {
        /// The requested distortion version.
        version: i32,
        /// Coefficients required by the version.
        expected: usize,
        /// Coefficients supplied.
        actual: usize,
    },
}

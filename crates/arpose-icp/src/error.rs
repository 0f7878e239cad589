use arpose_linalg::LinalgError;
use thiserror::Error;

/// Error types for the pose solver.
#[derive(Debug, Error, PartialEq)]
pub enum IcpError {
    /// Fewer correspondences than the six pose parameters can be recovered from.
    #[error("Pose solver requires at least {required} 2D-3D correspondences, got {actual}")]
    InsufficientCorrespondences {
        /// Minimum number of correspondences required by the solver.
        required: usize,
        /// Actual number of correspondences provided.
        actual: usize,
    },

    /// Mismatched array lengths with descriptive labels.
    #[error("Mismatched array lengths: {left_name} ({left_len}) != {right_name} ({right_len})")]
    MismatchedArrayLengths {
        /// Label for the left-hand slice.
        left_name: &'static str,
        /// Length of the left-hand slice.
        left_len: usize,
        /// Label for the right-hand slice.
        right_name: &'static str,
        /// Length of the right-hand slice.
        right_len: usize,
    },

    /// A scratch buffer could not be allocated.
    #[error("Failed to allocate solver buffers")]
    AllocationFailure,

    /// A point projected behind the camera or onto a degenerate denominator.
    #[error("Point {index} cannot be projected into the image")]
    ProjectionFailure {
        /// Position of the point in the stacked left-then-right order.
        index: usize,
    },

    /// The normal equations for the pose increment are singular.
    #[error("Normal equations are singular")]
    SingularSystem,

    /// Any other failure of the matrix layer.
    #[error("Linear algebra error: {0}")]
    Linalg(LinalgError),
}

impl From<LinalgError> for IcpError {
    fn from(e: LinalgError) -> Self {
        match e {
            LinalgError::Singular => Self::SingularSystem,
            LinalgError::AllocationFailure(..) => Self::AllocationFailure,
            other => Self::Linalg(other),
        }
    }
}

/// Legacy status code of a solver call: `0` on success, `-1` on any failure.
pub fn status_code<T>(result: &Result<T, IcpError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => -1,
    }
}
